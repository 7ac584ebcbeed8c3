use serde::{Deserialize, Serialize};

/// The logged-in staff member, as returned in the `user` field of
/// `POST /admin/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Bearer token plus identity. Always complete: there is no way to build a
/// credential with only one half.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub identity: Identity,
}

impl Credential {
    #[must_use]
    pub fn new(token: impl Into<String>, identity: Identity) -> Self {
        Self {
            token: token.into(),
            identity,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[redacted]")
            .field("identity", &self.identity)
            .finish()
    }
}
