//! Session Store: the staff credential and the logout action.
//!
//! The credential survives between runs in a [`CredentialStore`]. The file
//! store keeps two keys, `token` and `user` (the identity as a JSON blob),
//! mirroring what the web console kept in browser storage. A file holding
//! only one of the two is treated as no credential at all and removed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use triage_core::{Credential, Identity};

use crate::error::{ClientError, StorageError};

/// Persistence backend for the credential.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, or `None` when nothing complete is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing storage cannot be read.
    fn load(&self) -> Result<Option<Credential>, StorageError>;

    /// Replaces the stored credential.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the credential cannot be written.
    fn save(&self, credential: &Credential) -> Result<(), StorageError>;

    /// Removes both halves of the credential in one step.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the stored data cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredEntries {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<String>,
}

/// Credential kept in a small JSON file, written via temp-file + rename so a
/// crash never leaves half a credential behind.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn discard_partial(&self, reason: &str) -> Result<Option<Credential>, StorageError> {
        tracing::warn!(path = %self.path.display(), reason, "discarding incomplete stored credential");
        self.clear()?;
        Ok(None)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let Ok(entries) = serde_json::from_str::<StoredEntries>(&raw) else {
            return self.discard_partial("file is not valid JSON");
        };

        match (entries.token, entries.user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                match serde_json::from_str::<Identity>(&user) {
                    Ok(identity) => Ok(Some(Credential::new(token, identity))),
                    Err(_) => self.discard_partial("user entry is not a valid identity"),
                }
            }
            (None, None) => Ok(None),
            _ => self.discard_partial("token and user must both be present"),
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        let entries = StoredEntries {
            token: Some(credential.token.clone()),
            user: Some(serde_json::to_string(&credential.identity)?),
        };
        let encoded = serde_json::to_vec_pretty(&entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, encoded).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StorageError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// An authenticated call was attempted with nothing stored.
    MissingCredential,
    /// The backend rejected the token with 401.
    SessionExpired,
    /// The operator asked to log out.
    Requested,
}

type LogoutHook = Box<dyn Fn(LogoutReason) + Send + Sync>;

/// Explicit session context handed to every component that makes
/// authenticated calls.
pub struct Session {
    store: Box<dyn CredentialStore>,
    epoch: AtomicU64,
    on_logout: Option<LogoutHook>,
}

impl Session {
    pub fn new(store: impl CredentialStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            epoch: AtomicU64::new(0),
            on_logout: None,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryCredentialStore::new())
    }

    /// Registers the "return to the entry point" step of a logout.
    #[must_use]
    pub fn with_logout_hook(mut self, hook: impl Fn(LogoutReason) + Send + Sync + 'static) -> Self {
        self.on_logout = Some(Box::new(hook));
        self
    }

    /// # Errors
    ///
    /// Returns [`StorageError`] if the credential store cannot be read.
    pub fn get_credential(&self) -> Result<Option<Credential>, StorageError> {
        self.store.load()
    }

    /// Returns the credential, or [`ClientError::Unauthenticated`] when none
    /// is stored. The caller is responsible for logging out in that case.
    ///
    /// # Errors
    ///
    /// [`ClientError::Unauthenticated`] when nothing is stored,
    /// [`ClientError::Storage`] when the store cannot be read.
    pub fn require_credential(&self) -> Result<Credential, ClientError> {
        self.store.load()?.ok_or(ClientError::Unauthenticated)
    }

    /// Written only by the login flow.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the credential cannot be persisted.
    pub fn store_credential(&self, credential: &Credential) -> Result<(), StorageError> {
        self.store.save(credential)?;
        tracing::info!(username = %credential.identity.username, "credential stored");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`StorageError`] if the stored credential cannot be removed.
    pub fn clear_credential(&self) -> Result<(), StorageError> {
        self.store.clear()
    }

    /// Clears the credential and returns to the entry point as one action.
    ///
    /// Always advances the logout epoch and runs the hook, even when the
    /// store fails to clear; that failure is logged.
    pub fn logout(&self, reason: LogoutReason) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "failed to clear stored credential during logout");
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        tracing::info!(?reason, "session logged out");
        if let Some(hook) = &self.on_logout {
            hook(reason);
        }
    }

    /// Number of logouts so far. Work started under one epoch must not apply
    /// its result under another.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("epoch", &self.epoch())
            .field("has_logout_hook", &self.on_logout.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
