pub mod app_config;
pub mod complaints;
pub mod config;
pub mod credential;

pub use app_config::{AppConfig, Environment};
pub use complaints::{ComplaintRecord, ComplaintStatus, Complaints, Prediction};
pub use config::{load_app_config, load_app_config_from_env};
pub use credential::{Credential, Identity};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
