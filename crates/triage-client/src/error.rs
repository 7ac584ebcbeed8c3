use std::path::PathBuf;

use thiserror::Error;

/// Message used when a failed response carries no usable `detail`.
pub const GENERIC_API_ERROR: &str = "An API error occurred.";

/// Errors surfaced by the console's data-access layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No credential is stored. The session has already been logged out.
    #[error("Authentication token not found.")]
    Unauthenticated,

    /// The backend answered 401. The session has already been logged out.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// Any other non-2xx response. Holds the server's `detail` message.
    #[error("{0}")]
    Api(String),

    /// Transport failure: unreachable server, timeout, TLS.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid value for header {name}")]
    InvalidHeader { name: String },

    #[error("complaint '{0}' is not in the loaded list; reload and try again")]
    UnknownComplaint(String),

    #[error("no complaint is open for editing")]
    NothingSelected,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Returns `true` for the two errors that end the session.
    #[must_use]
    pub fn ends_session(&self) -> bool {
        matches!(self, ClientError::Unauthenticated | ClientError::SessionExpired)
    }
}

/// Failures reading or writing the persisted credential.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credential file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
