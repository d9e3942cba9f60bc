use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod app_config;
mod config;

pub use app_config::AppConfig;
pub use config::load_app_config;

/// One normalized classified listing, assembled from a search-payload item
/// and its detail page. Immutable once appended to a run's result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub location_name: String,
    pub category_name: String,
    /// Decimal rendering of `minPostingId + idDelta`. Unique within one
    /// decoded search page.
    pub posting_id: String,
    pub posted_at: DateTime<Utc>,
    /// Canonical detail-page URL, derived from the payload's location table.
    pub service_url: String,
    pub title: String,
    pub phone: Option<String>,
    pub image_urls: Vec<String>,
    pub description: Option<String>,
}

/// Per-run counters surfaced to the CLI so a partial-success run is
/// distinguishable from a total failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub locations_attempted: usize,
    pub locations_succeeded: usize,
    pub items_decoded: usize,
    pub items_skipped: usize,
}

impl ScrapeSummary {
    /// True when every attempted location failed outright.
    #[must_use]
    pub fn is_total_failure(&self) -> bool {
        self.locations_attempted > 0 && self.locations_succeeded == 0
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
