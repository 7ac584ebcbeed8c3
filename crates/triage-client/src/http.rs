//! Plumbing shared by the authenticated and public clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;

use crate::error::{ClientError, GENERIC_API_ERROR};

pub(crate) fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ClientError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses the backend base URL, normalised to end with exactly one slash so
/// path segments are appended instead of replacing the last one.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: "URL cannot carry a path".to_string(),
        });
    }
    Ok(url)
}

/// Appends `segments` (each percent-encoded) and `query` to `base`.
pub(crate) fn join_url(
    base: &Url,
    segments: &[String],
    query: &[(String, String)],
) -> Result<Url, ClientError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: base.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in query {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Splits an endpoint like `/admin/complaints` into path segments.
pub(crate) fn endpoint_segments(endpoint: &str) -> Vec<String> {
    endpoint
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Extracts a human-readable message from an error body.
///
/// The backend reports errors as `{"detail": "..."}`, or for the public
/// status lookup as `{"detail": {"error": "..."}}` / `{"error": "..."}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let from_error_field = |v: &Value| v.get("error").and_then(Value::as_str).map(str::to_owned);

    match value.get("detail") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => from_error_field(&value),
        Some(other) => from_error_field(other).or_else(|| Some(other.to_string())),
    }
}

/// Turns a non-2xx response into [`ClientError::Api`].
pub(crate) async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| GENERIC_API_ERROR.to_string());
    tracing::warn!(status = status.as_u16(), %message, "backend returned an error");
    ClientError::Api(message)
}

/// Reads a 2xx body as JSON. `204 No Content` and empty bodies become `Null`.
pub(crate) async fn decode_body(response: Response, context: &str) -> Result<Value, ClientError> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(Value::Null);
    }
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
