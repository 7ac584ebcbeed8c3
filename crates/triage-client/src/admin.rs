//! Admin endpoints on top of [`ApiClient`]: the full complaint list and the
//! status/department update.

use reqwest::Method;
use serde_json::Value;
use triage_core::{ComplaintRecord, ComplaintStatus, Complaints};

use crate::client::{ApiClient, ApiRequest};
use crate::error::ClientError;

impl ApiClient {
    /// Fetches every complaint via `GET /admin/complaints`.
    ///
    /// Records that do not match the expected shape are skipped with a
    /// warning; the rest of the list is still returned.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::send`], or [`ClientError::Deserialize`]
    /// when the body is not an object keyed by complaint id.
    pub async fn fetch_complaints(&self) -> Result<Complaints, ClientError> {
        let body = self.call(Method::GET, "/admin/complaints", None).await?;
        parse_complaints(body)
    }

    /// Sets status and assigned departments of one complaint via
    /// `POST /admin/update/{id}?status=..&departments=..`.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::send`].
    pub async fn update_complaint(
        &self,
        complaint_id: &str,
        status: ComplaintStatus,
        departments: &[String],
    ) -> Result<(), ClientError> {
        let request = ApiRequest::new(Method::POST, "/admin/update")
            .segment(complaint_id)
            .query("status", status.as_str())
            .query("departments", departments.join(","));
        self.send(request).await?;
        tracing::info!(complaint_id, %status, ?departments, "complaint updated");
        Ok(())
    }
}

/// Decodes the id → record mapping. `null` (an empty data file upstream)
/// reads as no complaints. Only entries that are not objects are skipped;
/// wrongly typed fields inside a record fall back to missing.
pub(crate) fn parse_complaints(body: Value) -> Result<Complaints, ClientError> {
    let map = match body {
        Value::Object(map) => map,
        Value::Null => return Ok(Complaints::new()),
        other => {
            return Err(ClientError::Deserialize {
                context: "GET /admin/complaints".to_string(),
                source: <serde_json::Error as serde::de::Error>::custom(format!(
                    "expected an object keyed by complaint id, got {other}"
                )),
            })
        }
    };

    Ok(map
        .into_iter()
        .filter_map(|(id, v)| {
            serde_json::from_value::<ComplaintRecord>(v)
                .map_err(|e| {
                    tracing::warn!(complaint_id = %id, error = %e, "fetch_complaints: skipping malformed record");
                })
                .ok()
                .map(|record| (id, record))
        })
        .collect())
}
