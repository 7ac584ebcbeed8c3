//! Complaint Cache and its refresh cycle.
//!
//! The cache is always replaced wholesale. Readers take an `Arc` snapshot, so
//! a reload swapping in a new map never exposes a half-built one.
//!
//! Overlapping reloads are ordered by a generation ticket taken when each
//! reload starts: a response is installed only if its ticket is newer than
//! the last installed one. A response whose session was logged out while it
//! was in flight is dropped.

use std::sync::Arc;

use tokio::sync::RwLock;
use triage_core::Complaints;

use crate::client::ApiClient;
use crate::error::ClientError;

/// Result of a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The fetched list replaced the cache.
    Applied { count: usize },
    /// A newer reload or a logout overtook this one; the cache was left alone.
    Stale,
}

/// Issued by [`ComplaintCache::begin_load`]; presented back to
/// [`ComplaintCache::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    snapshot: Arc<Complaints>,
    issued: u64,
    installed: u64,
}

#[derive(Debug, Default)]
pub struct ComplaintCache {
    state: RwLock<CacheState>,
}

impl ComplaintCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current contents. Unaffected by later reloads.
    pub async fn snapshot(&self) -> Arc<Complaints> {
        Arc::clone(&self.state.read().await.snapshot)
    }

    pub async fn begin_load(&self) -> LoadTicket {
        let mut state = self.state.write().await;
        state.issued += 1;
        LoadTicket {
            generation: state.issued,
        }
    }

    /// Replaces the contents if `ticket` is newer than whatever was installed
    /// last. Returns `false` when the data was stale and dropped.
    pub async fn install(&self, ticket: LoadTicket, complaints: Complaints) -> bool {
        let mut state = self.state.write().await;
        if ticket.generation <= state.installed {
            tracing::debug!(
                generation = ticket.generation,
                installed = state.installed,
                "dropping stale complaint list"
            );
            return false;
        }
        state.snapshot = Arc::new(complaints);
        state.installed = ticket.generation;
        true
    }

    /// Empties the cache and invalidates every reload still in flight.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.snapshot = Arc::new(Complaints::new());
        state.installed = state.issued;
    }

    /// Fetches the full complaint list and replaces the cache with it.
    ///
    /// On failure the cache is unchanged. There is no retry.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::fetch_complaints`].
    pub async fn reload(&self, client: &ApiClient) -> Result<ReloadOutcome, ClientError> {
        let epoch = client.session().epoch();
        let ticket = self.begin_load().await;

        let complaints = client.fetch_complaints().await.inspect_err(|e| {
            tracing::warn!(error = %e, "complaint reload failed; keeping previous list");
        })?;

        if client.session().epoch() != epoch {
            tracing::debug!("session ended during reload; discarding response");
            return Ok(ReloadOutcome::Stale);
        }

        let count = complaints.len();
        if self.install(ticket, complaints).await {
            tracing::info!(count, "complaint list reloaded");
            Ok(ReloadOutcome::Applied { count })
        } else {
            Ok(ReloadOutcome::Stale)
        }
    }
}
