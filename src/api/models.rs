use std::time::Duration;

/// Browser user agent sent with every request; some listing servers
/// reject library default agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

pub const DEFAULT_SUFFIX: &str = "tsv.zip";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub user_agent: String,
    /// Links are kept when their resolved path ends with this string.
    pub suffix_filter: String,
    pub connect_timeout: Duration,
    /// Longest wait for the next read on any response body. A stalled
    /// transfer fails after this instead of hanging the run.
    pub read_timeout: Duration,
    /// Whole-request timeout for the listing page only. File transfers are
    /// not bounded since archives can be gigabytes.
    pub listing_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            suffix_filter: DEFAULT_SUFFIX.to_string(),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            listing_timeout: Duration::from_secs(60),
        }
    }
}
