// src/export.rs
//
// CSV export of sick days: one row per user with the total count
// followed by the individual dates, so rows have varying widths.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::error::CoreError;
use crate::models::{Event, SICK_DAY};
use crate::store::{EventStore, UserStore};

const EXPORT_HEADER: [&str; 3] = ["employee", "total_sick_days", "dates"];

#[derive(Clone)]
pub struct SickDayExport {
    events: Arc<dyn EventStore>,
    users: Arc<dyn UserStore>,
}

impl SickDayExport {
    pub fn new(events: Arc<dyn EventStore>, users: Arc<dyn UserStore>) -> Self {
        Self { events, users }
    }

    /// CSV for every user with events in `year`.
    pub async fn export_year(&self, year: i32) -> Result<String, CoreError> {
        let events = self.events.get_for_year(year).await?;

        // username -> that user's events, ordered by name for stable output.
        let mut per_user: BTreeMap<String, Vec<Event>> = BTreeMap::new();
        for event in events {
            let user = match self.users.get_by_id(event.user_id).await {
                Ok(user) => user,
                Err(CoreError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            per_user.entry(user.username).or_default().push(event);
        }

        let rows = per_user
            .into_iter()
            .map(|(username, events)| sick_day_row(&username, &events))
            .collect();

        info!(year, "exported sick days");
        write_csv(rows)
    }

    /// CSV for a single user, across all of their events.
    pub async fn export_user(&self, user_id: i64) -> Result<String, CoreError> {
        let user = self.users.get_by_id(user_id).await?;
        let events = self.events.get_for_user(user_id).await?;
        write_csv(vec![sick_day_row(&user.username, &events)])
    }
}

fn sick_day_row(username: &str, events: &[Event]) -> Vec<String> {
    let mut dates: Vec<String> = events
        .iter()
        .filter(|e| e.name == SICK_DAY)
        .map(|e| e.scheduled_at.format("%Y-%m-%d").to_string())
        .collect();
    dates.sort();

    let mut row = vec![username.to_string(), dates.len().to_string()];
    row.extend(dates);
    row
}

fn write_csv(rows: Vec<Vec<String>>) -> Result<String, CoreError> {
    // Rows carry a varying number of date columns.
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER)?;
    for row in rows {
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Storage(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Storage(e.to_string()))
}
