use std::path::PathBuf;

/// Runtime configuration for a scrape run, sourced from environment
/// variables. An explicit value handed to the client and catalog; there is
/// no process-wide singleton.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Per-request timeout for every HTTP call.
    pub request_timeout_secs: u64,
    /// Total attempts per HTTP call, including the first. The reference
    /// behavior is 5 attempts with a fixed 5-second delay.
    pub retry_attempts: u32,
    /// Fixed delay between attempts. No jitter, no backoff growth.
    pub retry_delay_secs: u64,
    /// How many detail pages may be in flight at once per search page.
    /// `1` reproduces the strictly sequential reference behavior.
    pub detail_concurrency: usize,
    /// Optional wall-clock budget for the whole run, enforced by the caller.
    pub deadline_secs: Option<u64>,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// ISO region code for the all-locations directory page.
    pub region: String,
    /// Directory that export files are written into.
    pub output_dir: PathBuf,
}
