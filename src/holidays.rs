// src/holidays.rs
//
// Public-holiday materialization. Holidays come from an external JSON
// API (name -> {datum, ...}) filtered by region; each one becomes a
// regular calendar event owned by the bot user. A per-year cache marker
// makes the whole reconciliation idempotent, and it is written last so
// any earlier failure leaves the year safely retryable.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CoreError;
use crate::store::{CacheMarkerStore, HolidaySource, UserStore};
use crate::workflow::EventWorkflow;

// One entry of the holiday API response. Extra fields (`hinweis` etc.)
// are ignored.
#[derive(Debug, Deserialize)]
struct HolidayEntry {
    datum: String,
}

/// `HolidaySource` over HTTP, e.g. https://feiertage-api.de/api/
/// with `?jahr=<year>&nur_land=<region>`.
pub struct HolidayApi {
    client: Client,
    base_url: String,
    region: String,
}

impl HolidayApi {
    pub fn new(base_url: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            region: region.into(),
        }
    }
}

#[async_trait]
impl HolidaySource for HolidayApi {
    async fn fetch(&self, year: i32) -> Result<HashMap<String, NaiveDate>, CoreError> {
        let url = Url::parse_with_params(
            &self.base_url,
            &[("jahr", year.to_string()), ("nur_land", self.region.clone())],
        )?;

        debug!(year, %url, "fetching holidays");
        let raw: HashMap<String, HolidayEntry> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut holidays = HashMap::with_capacity(raw.len());
        for (name, entry) in raw {
            match NaiveDate::parse_from_str(&entry.datum, "%Y-%m-%d") {
                Ok(date) => {
                    holidays.insert(name, date);
                }
                Err(e) => {
                    warn!(holiday = %name, datum = %entry.datum, "unparseable holiday date: {}", e);
                }
            }
        }
        Ok(holidays)
    }
}

#[derive(Clone)]
pub struct HolidayReconciler {
    source: Arc<dyn HolidaySource>,
    cache: Arc<dyn CacheMarkerStore>,
    users: Arc<dyn UserStore>,
    workflow: EventWorkflow,
    bot_username: String,
    excluded: Vec<String>,
}

impl HolidayReconciler {
    pub fn new(
        source: Arc<dyn HolidaySource>,
        cache: Arc<dyn CacheMarkerStore>,
        users: Arc<dyn UserStore>,
        workflow: EventWorkflow,
        bot_username: impl Into<String>,
        excluded: Vec<String>,
    ) -> Self {
        Self {
            source,
            cache,
            users,
            workflow,
            bot_username: bot_username.into(),
            excluded,
        }
    }

    /// Materialize the year's public holidays as bot-owned events.
    /// No-op when the year was already processed.
    pub async fn ensure_year(&self, year: i32) -> Result<(), CoreError> {
        if self.cache.exists(year).await? {
            debug!(year, "holidays already materialized");
            return Ok(());
        }

        let bot = self.users.get_by_name(&self.bot_username).await?;
        let holidays = self.source.fetch(year).await?;

        // Deterministic order keeps retries and logs comparable.
        let mut holidays: Vec<(String, NaiveDate)> = holidays.into_iter().collect();
        holidays.sort_by(|a, b| a.1.cmp(&b.1));

        let mut created = 0;
        for (name, date) in holidays {
            if self.excluded.iter().any(|ex| ex == &name) {
                debug!(holiday = %name, "excluded by configuration");
                continue;
            }
            // Holiday names are not vacation types, so these events are
            // auto-accepted and never touch the ledger.
            self.workflow.create(date, &name, &bot).await?;
            created += 1;
        }

        // The marker goes in last: a failure above leaves the year
        // unmarked and the next call retries the whole fetch.
        self.cache.create(year).await?;

        info!(year, created, "materialized public holidays");
        Ok(())
    }

    /// Years that have already been reconciled.
    pub async fn processed_years(&self) -> Result<Vec<i32>, CoreError> {
        self.cache.years().await
    }
}
