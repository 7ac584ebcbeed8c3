//! Integration tests for `ApiClient` using wiremock HTTP mocks.
//!
//! Covers credential injection, the two session-ending failures (no stored
//! credential, 401), API error translation and the 204 / empty-body cases.

use std::sync::{Arc, Mutex};

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::json;
use triage_client::{
    ApiClient, ApiRequest, ClientError, LogoutReason, MemoryCredentialStore, Session,
};
use triage_core::{ComplaintStatus, Credential, Identity};
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credential() -> Credential {
    Credential::new(
        "tok-123",
        Identity {
            username: "asha".to_string(),
            role: None,
        },
    )
}

/// Session with a recording logout hook.
fn session(logged_in: bool) -> (Arc<Session>, Arc<Mutex<Vec<LogoutReason>>>) {
    let logouts = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&logouts);
    let store = if logged_in {
        MemoryCredentialStore::with_credential(credential())
    } else {
        MemoryCredentialStore::new()
    };
    let session = Session::new(store).with_logout_hook(move |reason| {
        seen.lock().unwrap().push(reason);
    });
    (Arc::new(session), logouts)
}

fn test_client(base_url: &str, session: Arc<Session>) -> ApiClient {
    ApiClient::with_base_url(base_url, 5, "triage-test/0.1", session)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn call_attaches_bearer_token_and_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/complaints"))
        .and(header("authorization", "Bearer tok-123"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"C1": {"status": "Pending"}})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, logouts) = session(true);
    let client = test_client(&server.uri(), session);
    let body = client
        .call(Method::GET, "/admin/complaints", None)
        .await
        .expect("call should succeed");

    assert_eq!(body, json!({"C1": {"status": "Pending"}}));
    assert!(logouts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_credential_logs_out_without_network_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (session, logouts) = session(false);
    let client = test_client(&server.uri(), Arc::clone(&session));

    let err = client
        .call(Method::GET, "/admin/complaints", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthenticated));
    assert_eq!(*logouts.lock().unwrap(), vec![LogoutReason::MissingCredential]);
    assert_eq!(session.epoch(), 1);
}

#[tokio::test]
async fn unauthorized_response_clears_credential_and_logs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/complaints"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .mount(&server)
        .await;

    let (session, logouts) = session(true);
    let client = test_client(&server.uri(), Arc::clone(&session));

    let err = client.fetch_complaints().await.unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
    assert!(session.get_credential().unwrap().is_none());
    assert_eq!(*logouts.lock().unwrap(), vec![LogoutReason::SessionExpired]);
}

#[tokio::test]
async fn unauthorized_update_also_logs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/update/C1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (session, logouts) = session(true);
    let client = test_client(&server.uri(), Arc::clone(&session));

    let err = client
        .update_complaint("C1", ComplaintStatus::Resolved, &["HR".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
    assert!(session.get_credential().unwrap().is_none());
    assert_eq!(logouts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn error_status_uses_detail_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/update/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Complaint not found"})),
        )
        .mount(&server)
        .await;

    let (session, logouts) = session(true);
    let client = test_client(&server.uri(), Arc::clone(&session));

    let err = client
        .update_complaint("missing", ComplaintStatus::Pending, &["IT".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api(ref msg) if msg == "Complaint not found"));
    assert_eq!(err.to_string(), "Complaint not found");
    assert!(session.get_credential().unwrap().is_some());
    assert!(logouts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn error_status_without_detail_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/complaints"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let (session, _) = session(true);
    let client = test_client(&server.uri(), session);

    let err = client.fetch_complaints().await.unwrap_err();
    assert!(matches!(err, ClientError::Api(ref msg) if msg == "An API error occurred."));
}

#[tokio::test]
async fn no_content_resolves_to_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/update/C1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (session, _) = session(true);
    let client = test_client(&server.uri(), session);

    let body = client
        .call(Method::POST, "/admin/update/C1", None)
        .await
        .expect("204 is not an error");
    assert!(body.is_null());
}

#[tokio::test]
async fn invalid_json_success_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/complaints"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let (session, _) = session(true);
    let client = test_client(&server.uri(), session);

    let err = client.fetch_complaints().await.unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { .. }));
}

#[tokio::test]
async fn update_sends_status_and_departments_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/update/C1"))
        .and(query_param("status", "In Progress"))
        .and(query_param("departments", "HR,IT"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Updated successfully"})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = session(true);
    let client = test_client(&server.uri(), session);

    client
        .update_complaint(
            "C1",
            ComplaintStatus::InProgress,
            &["HR".to_string(), "IT".to_string()],
        )
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn header_override_replaces_default_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/complaints"))
        .and(header("content-type", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = session(true);
    let client = test_client(&server.uri(), session);

    let request = ApiRequest::new(Method::GET, "/admin/complaints")
        .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    client.send(request).await.expect("override should be sent");
}

#[tokio::test]
async fn unreachable_server_is_network_error_and_keeps_session() {
    let (session, logouts) = session(true);
    let client = test_client("http://127.0.0.1:1", Arc::clone(&session));

    let err = client.fetch_complaints().await.unwrap_err();

    assert!(matches!(err, ClientError::Network(_)), "got: {err:?}");
    assert!(session.get_credential().unwrap().is_some());
    assert!(logouts.lock().unwrap().is_empty());
}
