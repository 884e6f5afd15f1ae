// src/error.rs

use thiserror::Error;

// Error type shared by all core services. Storage adapters map their own
// failures into `Storage` / `Conflict`; everything else is produced here.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Holiday source request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    pub fn not_found(what: &str, id: i64) -> Self {
        CoreError::NotFound(format!("{} {}", what, id))
    }
}
