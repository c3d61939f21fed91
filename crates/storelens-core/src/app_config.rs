use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Default Chrome-like user agent; some storefronts serve reduced markup to
/// unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct AppConfig {
    /// Optional so that the CLI can analyze a store without persisting it.
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_page_timeout_secs: u64,
    pub scraper_user_agent: String,
    /// Concurrent nested fetches (product pages, policy candidates) per unit.
    pub scraper_item_concurrency: usize,
    pub unit_timeout_secs: u64,
    pub analysis_timeout_secs: u64,
    pub cache_max_age_hours: u64,
    /// Enables the model-backed enhancement hook when present.
    pub google_api_key: Option<String>,
    pub llm_model: String,
    pub llm_base_url: String,
}

impl AppConfig {
    /// Whether the model-backed enhancement hook can be built.
    #[must_use]
    pub fn llm_enabled(&self) -> bool {
        self.google_api_key.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_page_timeout_secs", &self.scraper_page_timeout_secs)
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_item_concurrency", &self.scraper_item_concurrency)
            .field("unit_timeout_secs", &self.unit_timeout_secs)
            .field("analysis_timeout_secs", &self.analysis_timeout_secs)
            .field("cache_max_age_hours", &self.cache_max_age_hours)
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("llm_base_url", &self.llm_base_url)
            .finish()
    }
}
