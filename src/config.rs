// src/config.rs

use serde::Deserialize;
use tracing::info;

use crate::error::CoreError;

// Configuration loaded from the environment (optionally via a .env file).
// All fields have defaults so a bare environment still boots.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_holiday_api_url")]
    pub holiday_api_url: String,

    /// Region filter passed to the holiday API (`nur_land`).
    #[serde(default = "default_holiday_region")]
    pub holiday_region: String,

    /// Comma-separated holiday names that should never be materialized,
    /// e.g. school-only regional holidays.
    #[serde(default = "default_excluded_holidays")]
    pub excluded_holidays: String,

    /// Username of the system account that owns holiday events.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_holiday_api_url() -> String {
    "https://feiertage-api.de/api/".to_string()
}

fn default_holiday_region() -> String {
    "BW".to_string()
}

fn default_excluded_holidays() -> String {
    // Gruendonnerstag is school-only in BW and not observed by the company.
    "Gründonnerstag".to_string()
}

fn default_bot_name() -> String {
    "calendar-bot".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, CoreError> {
        dotenv::dotenv().ok();
        let config: Config =
            envy::from_env().map_err(|e| CoreError::Config(e.to_string()))?;
        info!("Config loaded");
        Ok(config)
    }

    pub fn excluded_holiday_list(&self) -> Vec<String> {
        self.excluded_holidays
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            holiday_api_url: default_holiday_api_url(),
            holiday_region: default_holiday_region(),
            excluded_holidays: default_excluded_holidays(),
            bot_name: default_bot_name(),
            log_filter: default_log_filter(),
        }
    }
}
