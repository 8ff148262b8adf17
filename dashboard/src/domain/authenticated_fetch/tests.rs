//! Regression coverage for the authenticated fetch wrapper.

use super::*;
use crate::domain::ports::{AuthHeaders, MockAuthProvider};
use crate::domain::{ErrorCode, HttpMethod, SessionToken};
use crate::outbound::session::InMemorySessionStore;
use crate::test_support::ScriptedTransport;
use serde_json::json;

fn bearer_provider(raw: &'static str) -> MockAuthProvider {
    let mut auth = MockAuthProvider::new();
    auth.expect_auth_headers()
        .returning(move || Ok(AuthHeaders::new(SessionToken::new(raw).expect("token"))));
    auth
}

fn wrapper(
    transport: ScriptedTransport,
    auth: MockAuthProvider,
) -> (AuthenticatedFetch, Arc<ScriptedTransport>, Arc<InMemorySessionStore>) {
    let transport = Arc::new(transport);
    let store = Arc::new(InMemorySessionStore::with_token(
        SessionToken::new("current").expect("token"),
    ));
    let fetch = AuthenticatedFetch::new(
        transport.clone(),
        Arc::new(auth),
        store.clone(),
        LoginRoute::default(),
    );
    (fetch, transport, store)
}

#[tokio::test]
async fn applies_auth_and_trace_headers() {
    let (fetch, transport, _) = wrapper(
        ScriptedTransport::new().reply_json(200, &json!([])),
        bearer_provider("current"),
    );
    let trace_id = TraceId::generate();
    TraceId::scope(trace_id, fetch.fetch(ApiRequest::get("/api/employees")))
        .await
        .expect("response");

    let sent = transport.requests();
    assert_eq!(sent[0].header("authorization"), Some("Bearer current"));
    assert_eq!(sent[0].header("content-type"), Some("application/json"));
    assert_eq!(
        sent[0].header(TRACE_ID_HEADER),
        Some(trace_id.to_string().as_str())
    );
}

#[tokio::test]
async fn auth_failure_stops_before_sending() {
    let mut auth = MockAuthProvider::new();
    auth.expect_auth_headers()
        .returning(|| Err(Error::unauthenticated("sign in")));
    let (fetch, transport, _) = wrapper(ScriptedTransport::new(), auth);

    let err = fetch
        .fetch(ApiRequest::get("/api/employees"))
        .await
        .expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::Unauthenticated);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn upstream_401_clears_session_and_redirects() {
    let (fetch, transport, store) = wrapper(
        ScriptedTransport::new().reply_json(401, &json!({ "message": "jwt expired" })),
        bearer_provider("current"),
    );

    let err = fetch
        .fetch(ApiRequest::delete("/api/vehicles/9"))
        .await
        .expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::SessionExpired);
    assert_eq!(err.status(), Some(401));
    assert_eq!(
        err.redirect().map(|r| r.location()),
        Some("/login?expired=true")
    );
    assert_eq!(store.token().await.expect("read"), None);
    assert_eq!(transport.requests().len(), 1, "401 must not be retried");
}

#[tokio::test]
async fn transport_errors_are_normalized() {
    let (fetch, _, store) = wrapper(
        ScriptedTransport::new().fail(HttpTransportError::connect(
            "error sending request for url (http://localhost:3001/api/units)",
        )),
        bearer_provider("current"),
    );

    let err = fetch
        .fetch(ApiRequest::get("/api/units"))
        .await
        .expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::Transport);
    assert!(!err.message().contains("error sending request"));
    assert!(store.token().await.expect("read").is_some());
}

#[tokio::test]
async fn timeouts_get_a_dedicated_message() {
    let (fetch, _, _) = wrapper(
        ScriptedTransport::new().fail(HttpTransportError::timeout("operation timed out")),
        bearer_provider("current"),
    );
    let err = fetch
        .fetch(ApiRequest::get("/api/units"))
        .await
        .expect_err("must fail");
    assert_eq!(err.message(), TIMEOUT_MESSAGE);
}

#[tokio::test]
async fn fetch_json_unwraps_errors_with_context() {
    let (fetch, _, _) = wrapper(
        ScriptedTransport::new().reply_json(422, &json!({ "errors": { "plate": ["required"] } })),
        bearer_provider("current"),
    );
    let context = ErrorContext::new("fleet::create", "/api/vehicles", HttpMethod::Post);
    let err = fetch
        .fetch_json(
            ApiRequest::post("/api/vehicles").with_json(json!({})),
            &context,
            "Failed to create vehicle",
        )
        .await
        .expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::Upstream);
    assert!(err.message().starts_with("required"));
    assert!(err.message().contains("File: fleet::create"));
    assert!(err.message().contains("Status: 422"));
}
