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

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Base URL of the complaint backend, e.g. `http://127.0.0.1:8000`.
    pub api_url: String,
    pub log_level: String,
    /// File holding the persisted staff credential between runs.
    pub session_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}
