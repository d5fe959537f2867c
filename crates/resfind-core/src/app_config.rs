use std::net::SocketAddr;
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
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub taxonomy_path: PathBuf,
    pub zip_table_path: PathBuf,
    pub upstream_base_url: String,
    pub upstream_api_key: String,
    /// Header carrying the API key on every upstream request.
    pub upstream_api_key_header: String,
    pub upstream_timeout_secs: u64,
    pub upstream_user_agent: String,
    /// Radius sent to the upstream as `distance` when a location is given.
    pub search_radius_miles: u32,
    /// Upstream `locationMode`, e.g. `"Within"` or `"Serving"`.
    pub location_mode: String,
    /// Searches per minute the server admits before answering 429.
    pub search_rate_limit_per_min: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("taxonomy_path", &self.taxonomy_path)
            .field("zip_table_path", &self.zip_table_path)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_api_key", &"[redacted]")
            .field("upstream_api_key_header", &self.upstream_api_key_header)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("upstream_user_agent", &self.upstream_user_agent)
            .field("search_radius_miles", &self.search_radius_miles)
            .field("location_mode", &self.location_mode)
            .field("search_rate_limit_per_min", &self.search_rate_limit_per_min)
            .finish()
    }
}
