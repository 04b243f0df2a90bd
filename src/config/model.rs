use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SNAPSHOT_PATH: &str = "scraped_events.json";
pub const DEFAULT_USER_AGENT: &str =
    "KingstonHappenings/1.0 (Event Discovery Bot; contact@kingstonhappenings.ca)";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub http: HttpSettings,
    /// Upper bound for one whole adapter invocation, retries included.
    pub adapter_timeout: Duration,
    /// JSON list of sources; the demo sources are used when unset.
    pub sources_file: Option<PathBuf>,
    pub category_keywords_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub user_agent: String,
    /// Per request, not per adapter.
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            http: HttpSettings::default(),
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            sources_file: None,
            category_keywords_file: None,
        }
    }
}
