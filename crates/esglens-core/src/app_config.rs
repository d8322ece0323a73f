use std::path::PathBuf;

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

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub organizations_path: PathBuf,
    /// Base URL of the news-search RSS endpoint.
    pub search_base_url: String,
    /// Base URL of the classification inference service.
    pub inference_url: String,
    pub cycle_interval_secs: u64,
    /// Maximum number of concurrent fetch workers (`T` in the partitioning).
    pub max_fetch_threads: usize,
    pub use_accelerator: bool,
    pub accelerator_memory_gb_per_worker: u64,
    /// Articles below this relevancy score are excluded from every read.
    pub relevancy_threshold: f64,
    /// Minimum membership probability for a topic join to count.
    pub indicator_membership_threshold: f64,
    pub scrape_full_articles: bool,
    pub fetch_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("organizations_path", &self.organizations_path)
            .field("database_url", &"[redacted]")
            .field("search_base_url", &self.search_base_url)
            .field("inference_url", &self.inference_url)
            .field("cycle_interval_secs", &self.cycle_interval_secs)
            .field("max_fetch_threads", &self.max_fetch_threads)
            .field("use_accelerator", &self.use_accelerator)
            .field(
                "accelerator_memory_gb_per_worker",
                &self.accelerator_memory_gb_per_worker,
            )
            .field("relevancy_threshold", &self.relevancy_threshold)
            .field(
                "indicator_membership_threshold",
                &self.indicator_membership_threshold,
            )
            .field("scrape_full_articles", &self.scrape_full_articles)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
