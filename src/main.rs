// src/main.rs
//
// Maintenance CLI around the core services, wired against the in-memory
// stores: inspect the calendar grid, the public holidays of a year, the
// year progress and the sick-day CSV export.

use anyhow::Result;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use teamcal_core::calendar::{self, MonthGrid};
use teamcal_core::models::CreateUser;
use teamcal_core::store::{
    CacheMarkerStore, EventStore, HolidaySource, NotificationSink, RefreshMarkerStore,
    RequestStore, TokenStore, UserStore,
};
use teamcal_core::{
    Config, EventWorkflow, HolidayApi, HolidayReconciler, MemStore, Notifier, SickDayExport,
    VacationLedger,
};

#[derive(Parser)]
#[command(name = "teamcal", about = "Team absence calendar maintenance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the calendar grid for one month, including public holidays
    Calendar {
        year: i32,
        month: u32,
        /// Only show events of this user
        #[arg(long)]
        user: Option<String>,
        /// Only show events whose name contains this string
        #[arg(long)]
        filter: Option<String>,
    },
    /// List the public holidays of a year
    Holidays { year: i32 },
    /// Show year progress statistics
    Progress { year: Option<i32> },
    /// Export sick days of a year as CSV
    Export { year: i32 },
}

struct App {
    users: Arc<dyn UserStore>,
    events: Arc<dyn EventStore>,
    workflow: EventWorkflow,
    reconciler: HolidayReconciler,
    export: SickDayExport,
}

fn build_app(config: &Config) -> App {
    let store = Arc::new(MemStore::new());

    let events: Arc<dyn EventStore> = store.clone();
    let requests: Arc<dyn RequestStore> = store.clone();
    let tokens: Arc<dyn TokenStore> = store.clone();
    let markers: Arc<dyn RefreshMarkerStore> = store.clone();
    let users: Arc<dyn UserStore> = store.clone();
    let sink: Arc<dyn NotificationSink> = store.clone();
    let cache: Arc<dyn CacheMarkerStore> = store.clone();

    let ledger = VacationLedger::new(tokens, markers);
    let notifier = Notifier::new(sink);
    let workflow = EventWorkflow::new(
        events.clone(),
        requests,
        users.clone(),
        ledger,
        notifier,
        config.bot_name.clone(),
    );

    let source: Arc<dyn HolidaySource> = Arc::new(HolidayApi::new(
        config.holiday_api_url.clone(),
        config.holiday_region.clone(),
    ));
    let reconciler = HolidayReconciler::new(
        source,
        cache,
        users.clone(),
        workflow.clone(),
        config.bot_name.clone(),
        config.excluded_holiday_list(),
    );

    let export = SickDayExport::new(events.clone(), users.clone());

    App {
        users,
        events,
        workflow,
        reconciler,
        export,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let cli = Cli::parse();
    let app = build_app(&config);

    // The bot account that owns materialized holiday events.
    app.users
        .create(CreateUser {
            username: config.bot_name.clone(),
            email: format!("{}@localhost", config.bot_name),
            vacation_days: 0,
            is_superuser: true,
        })
        .await?;

    match cli.command {
        Command::Calendar {
            year,
            month,
            user,
            filter,
        } => {
            app.reconciler.ensure_year(year).await?;
            let grid = app
                .workflow
                .month_view(year, month, user.as_deref(), filter.as_deref())
                .await?;
            print_month(&grid);
        }
        Command::Holidays { year } => {
            app.reconciler.ensure_year(year).await?;
            let bot = app.users.get_by_name(&config.bot_name).await?;
            for event in app.events.get_for_year(year).await? {
                if event.user_id == bot.id {
                    println!("{}  {}", event.scheduled_at, event.name);
                }
            }
        }
        Command::Progress { year } => {
            let today = Local::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let progress = calendar::year_progress(year, today);
            println!("year:          {}", year);
            println!("total days:    {}", progress.total_days);
            println!("weekend days:  {}", progress.weekend_days);
            println!("days passed:   {}", progress.days_passed);
            println!("percent:       {:.1}%", progress.percent_passed);
        }
        Command::Export { year } => {
            app.reconciler.ensure_year(year).await?;
            print!("{}", app.export.export_year(year).await?);
        }
    }

    Ok(())
}

fn print_month(grid: &MonthGrid) {
    println!("{} {}", grid.name, grid.year);
    println!("Mo Tu We Th Fr Sa Su");

    let mut col = grid.offset;
    print!("{}", "   ".repeat(col as usize));
    for day in &grid.days {
        let marker = if day.events.is_empty() { ' ' } else { '*' };
        print!("{:>2}{}", day.number, marker);
        col += 1;
        if col % 7 == 0 {
            println!();
        }
    }
    if col % 7 != 0 {
        println!();
    }

    for day in &grid.days {
        for entry in &day.events {
            println!(
                "{}  {} ({}, {})",
                day.date, entry.event.name, entry.user.username, entry.event.state
            );
        }
    }
}
