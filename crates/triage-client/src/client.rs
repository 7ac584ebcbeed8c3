//! Authenticated request client for the admin API.
//!
//! Every authenticated call goes through [`ApiClient::send`], which attaches
//! the bearer token, forces a logout when no credential is stored or the
//! backend answers 401, and turns every other failure into a
//! [`ClientError`]. Callers never special-case auth errors themselves.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use triage_core::{AppConfig, Credential};

use crate::error::ClientError;
use crate::http;
use crate::session::{LogoutReason, Session};

/// One authenticated request: method, path, optional query, JSON body and
/// header overrides.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    /// `endpoint` is a path relative to the API base, e.g. `/admin/complaints`.
    #[must_use]
    pub fn new(method: Method, endpoint: &str) -> Self {
        Self {
            method,
            segments: http::endpoint_segments(endpoint),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Appends one path segment, percent-encoded as a single segment.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replaces a default header (`Content-Type`, `Authorization`) or adds one.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Client for the bearer-authenticated admin endpoints.
///
/// Use [`ApiClient::new`] with loaded config, or [`ApiClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `config.api_url` does not
    /// parse, or [`ClientError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig, session: Arc<Session>) -> Result<Self, ClientError> {
        Self::with_base_url(
            &config.api_url,
            config.request_timeout_secs,
            &config.user_agent,
            session,
        )
    }

    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`ClientError::Network`] if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        session: Arc<Session>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_http_client(timeout_secs, user_agent)?,
            base_url: http::parse_base_url(base_url)?,
            session,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Convenience form of [`ApiClient::send`].
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let mut request = ApiRequest::new(method, endpoint);
        request.body = body;
        self.send(request).await
    }

    /// Sends `request` with the stored bearer token and returns the parsed
    /// JSON body (`Null` for `204` or an empty body). No schema validation.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Unauthenticated`]: no credential; logout already
    ///   happened and nothing was sent.
    /// - [`ClientError::SessionExpired`]: HTTP 401; logout already happened.
    /// - [`ClientError::Api`]: any other non-2xx status.
    /// - [`ClientError::Network`]: transport failure.
    /// - [`ClientError::Deserialize`]: a 2xx body that is not JSON.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let credential = match self.session.require_credential() {
            Ok(credential) => credential,
            Err(ClientError::Unauthenticated) => {
                tracing::warn!("no stored credential; logging out before request");
                self.session.logout(LogoutReason::MissingCredential);
                return Err(ClientError::Unauthenticated);
            }
            Err(e) => return Err(e),
        };

        let ApiRequest {
            method,
            segments,
            query,
            body,
            headers,
        } = request;

        let url = http::join_url(&self.base_url, &segments, &query)?;
        let context = format!("{method} {}", url.path());
        let headers = Self::request_headers(&credential, headers)?;

        tracing::debug!(%method, url = %url, "sending authenticated request");
        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = &body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%context, "backend rejected credential; logging out");
            self.session.logout(LogoutReason::SessionExpired);
            return Err(ClientError::SessionExpired);
        }

        if !status.is_success() {
            return Err(http::api_error(response).await);
        }

        http::decode_body(response, &context).await
    }

    /// Default headers first, then caller overrides on top.
    fn request_headers(
        credential: &Credential,
        overrides: HeaderMap,
    ) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credential.token)).map_err(
            |_| ClientError::InvalidHeader {
                name: AUTHORIZATION.to_string(),
            },
        )?;
        headers.insert(AUTHORIZATION, bearer);
        headers.extend(overrides);
        Ok(headers)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
