//! Unauthenticated endpoints: complaint submission, public status lookup and
//! staff login. One-shot request/response; no session handling beyond
//! handing the login result to the caller.

use reqwest::{Client, Method, Url};
use serde::{Deserialize, Serialize};
use triage_core::{AppConfig, ComplaintRecord, Credential, Identity, Prediction};

use crate::error::ClientError;
use crate::http;

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    pnr: &'a str,
    complaint: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Response to `POST /submit`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReceipt {
    pub complaint_id: String,
    #[serde(default)]
    pub predicted: Vec<Prediction>,
}

impl SubmitReceipt {
    /// The first predicted department, if the model returned any.
    #[must_use]
    pub fn primary_department(&self) -> Option<&str> {
        self.predicted.first().map(|p| p.department.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user: Identity,
}

/// Client for the public endpoints.
#[derive(Debug, Clone)]
pub struct PublicClient {
    client: Client,
    base_url: Url,
}

impl PublicClient {
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `config.api_url` does not
    /// parse, or [`ClientError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(&config.api_url, config.request_timeout_secs, &config.user_agent)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`ClientError::Network`] if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: http::build_http_client(timeout_secs, user_agent)?,
            base_url: http::parse_base_url(base_url)?,
        })
    }

    /// Files a new complaint. The backend assigns the id and predicts a
    /// department.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with the server's message on rejection,
    /// [`ClientError::Network`] on transport failure,
    /// [`ClientError::Deserialize`] on an unexpected response shape.
    pub async fn submit_complaint(
        &self,
        pnr: &str,
        complaint: &str,
    ) -> Result<SubmitReceipt, ClientError> {
        let body = serde_json::to_value(SubmitRequest { pnr, complaint })
            .map_err(|e| deserialize_error("POST /submit", e))?;
        let value = self.request(Method::POST, &["submit"], Some(&body)).await?;
        let receipt: SubmitReceipt =
            serde_json::from_value(value).map_err(|e| deserialize_error("POST /submit", e))?;
        tracing::info!(complaint_id = %receipt.complaint_id, "complaint submitted");
        Ok(receipt)
    }

    /// Looks up one complaint by id without authentication.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with the server's message (e.g. "Complaint ID not
    /// found"), [`ClientError::Network`], or [`ClientError::Deserialize`].
    pub async fn complaint_status(&self, complaint_id: &str) -> Result<ComplaintRecord, ClientError> {
        let context = format!("GET /status/{complaint_id}");
        let value = self.request(Method::GET, &["status", complaint_id], None).await?;
        serde_json::from_value(value).map_err(|e| deserialize_error(&context, e))
    }

    /// Exchanges username and password for a [`Credential`].
    ///
    /// The caller stores the result with
    /// [`Session::store_credential`](crate::session::Session::store_credential).
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] with the server's message (e.g. "Invalid username
    /// or password"), [`ClientError::Network`], or [`ClientError::Deserialize`].
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ClientError> {
        let body = serde_json::to_value(LoginRequest { username, password })
            .map_err(|e| deserialize_error("POST /admin/login", e))?;
        let value = self
            .request(Method::POST, &["admin", "login"], Some(&body))
            .await?;
        let response: LoginResponse =
            serde_json::from_value(value).map_err(|e| deserialize_error("POST /admin/login", e))?;
        Ok(Credential::new(response.access_token, response.user))
    }

    async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let segments: Vec<String> = segments.iter().map(|s| (*s).to_owned()).collect();
        let url = http::join_url(&self.base_url, &segments, &[])?;
        let context = format!("{method} {}", url.path());

        tracing::debug!(%method, url = %url, "sending public request");
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(http::api_error(response).await);
        }
        http::decode_body(response, &context).await
    }
}

fn deserialize_error(context: &str, source: serde_json::Error) -> ClientError {
    ClientError::Deserialize {
        context: context.to_owned(),
        source,
    }
}
