//! The admin console as one object: session, client, cache, table filter
//! and detail view wired together.

use std::sync::Arc;

use triage_core::Credential;

use crate::cache::{ComplaintCache, ReloadOutcome};
use crate::client::ApiClient;
use crate::detail::{DetailController, DetailView, UpdateForm};
use crate::error::{ClientError, StorageError};
use crate::session::{LogoutReason, Session};
use crate::views::{DashboardView, FilterState};

#[derive(Debug)]
pub struct Console {
    client: ApiClient,
    cache: ComplaintCache,
    filter: FilterState,
    detail: DetailController,
}

impl Console {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cache: ComplaintCache::new(),
            filter: FilterState::default(),
            detail: DetailController::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        self.client.session()
    }

    /// # Errors
    ///
    /// Returns [`StorageError`] if the credential store cannot be read.
    pub fn current_user(&self) -> Result<Option<Credential>, StorageError> {
        self.session().get_credential()
    }

    #[must_use]
    pub fn cache(&self) -> &ComplaintCache {
        &self.cache
    }

    /// Replaces the cached complaint list with a fresh fetch.
    ///
    /// # Errors
    ///
    /// Any error from [`ComplaintCache::reload`]. The cache is unchanged on
    /// error, except that a session-ending error empties it.
    pub async fn reload(&mut self) -> Result<ReloadOutcome, ClientError> {
        let result = self.cache.reload(&self.client).await;
        self.settle(result).await
    }

    /// Stats, department options and table rows for the current filter.
    pub async fn view(&self) -> DashboardView {
        let snapshot = self.cache.snapshot().await;
        DashboardView::build(&snapshot, &self.filter)
    }

    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    /// # Errors
    ///
    /// [`ClientError::UnknownComplaint`] if `id` is not cached.
    pub async fn open_detail(&mut self, id: &str) -> Result<DetailView, ClientError> {
        let snapshot = self.cache.snapshot().await;
        self.detail.open(id, &snapshot)
    }

    pub async fn detail_view(&self) -> Option<DetailView> {
        let snapshot = self.cache.snapshot().await;
        self.detail.view(&snapshot)
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.detail.selected_id()
    }

    pub fn dismiss_detail(&mut self) {
        self.detail.dismiss();
    }

    /// Submits the open detail form, then reloads.
    ///
    /// # Errors
    ///
    /// Any error from [`DetailController::submit`].
    pub async fn submit_update(&mut self, form: UpdateForm) -> Result<ReloadOutcome, ClientError> {
        let result = self.detail.submit(form, &self.client, &self.cache).await;
        self.settle(result).await
    }

    /// Operator-requested logout.
    pub async fn logout(&mut self) {
        self.session().logout(LogoutReason::Requested);
        self.reset().await;
    }

    async fn reset(&mut self) {
        self.cache.clear().await;
        self.detail.dismiss();
    }

    /// Drops local state when `result` ended the session; the logout itself
    /// already happened in the client.
    async fn settle<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(e) = &result {
            if e.ends_session() {
                self.reset().await;
            }
        }
        result
    }
}
