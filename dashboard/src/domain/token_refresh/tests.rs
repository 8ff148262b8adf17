//! Regression coverage for the refresh flow.

use super::*;
use crate::domain::ports::{HttpTransportError, MockSessionStore, SessionStoreError};
use crate::domain::{ApiResponse, HttpMethod, RedirectReason};
use crate::outbound::session::InMemorySessionStore;
use crate::test_support::ScriptedTransport;
use rstest::rstest;
use serde_json::json;

fn token(raw: &str) -> SessionToken {
    SessionToken::new(raw).expect("valid token")
}

fn service(
    transport: ScriptedTransport,
    store: InMemorySessionStore,
) -> (TokenRefreshService, Arc<ScriptedTransport>, Arc<InMemorySessionStore>) {
    let transport = Arc::new(transport);
    let store = Arc::new(store);
    let service = TokenRefreshService::new(transport.clone(), store.clone(), LoginRoute::default());
    (service, transport, store)
}

#[tokio::test]
async fn missing_token_skips_the_network() {
    let (service, transport, _) = service(ScriptedTransport::new(), InMemorySessionStore::new());
    let outcome = service.refresh().await;
    assert!(matches!(outcome, RefreshOutcome::Failed { status: None, .. }));
    assert!(transport.requests().is_empty());
}

#[rstest]
#[case(json!({ "access_token": "new" }))]
#[case(json!({ "token": "new" }))]
#[case(json!({ "accessToken": "new" }))]
#[case(json!({ "access_token": "", "token": "new" }))]
#[tokio::test]
async fn stores_the_new_token(#[case] body: Value) {
    let (service, transport, store) = service(
        ScriptedTransport::new().reply_json(200, &body),
        InMemorySessionStore::with_token(token("old")),
    );

    assert_eq!(service.refresh().await, RefreshOutcome::Refreshed(token("new")));
    assert_eq!(store.token().await.expect("read"), Some(token("new")));

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method(), HttpMethod::Post);
    assert_eq!(sent[0].path(), REFRESH_ENDPOINT);
    assert_eq!(sent[0].header("authorization"), Some("Bearer old"));
    assert!(sent[0].is_no_store());
}

#[tokio::test]
async fn stores_user_returned_with_the_token() {
    let body = json!({ "access_token": "new", "user": { "email": "ops@example.com", "role": "admin" } });
    let (service, _, store) = service(
        ScriptedTransport::new().reply_json(200, &body),
        InMemorySessionStore::with_token(token("old")),
    );
    service.refresh().await;
    let user = store.user().await.expect("read").expect("user stored");
    assert!(user.has_role("ADMIN"));
}

#[rstest]
#[case(401)]
#[case(403)]
#[tokio::test]
async fn rejection_clears_session_and_redirects(#[case] status: u16) {
    let (service, _, store) = service(
        ScriptedTransport::new().reply_json(status, &json!({ "message": "nope" })),
        InMemorySessionStore::with_token(token("old")),
    );
    store
        .set_user(&UserProfile::default())
        .await
        .expect("seed user");

    let RefreshOutcome::SessionEnded(redirect) = service.refresh().await else {
        panic!("expected the session to end");
    };
    assert_eq!(redirect.reason(), RedirectReason::Expired);
    assert!(redirect.location().starts_with("/login"));
    assert!(redirect.location().contains("expired=true"));
    assert_eq!(store.token().await.expect("read"), None);
    assert_eq!(store.user().await.expect("read"), None);
}

#[rstest]
#[case(ApiResponse::json(500, &json!({ "message": "down" })), Some(500))]
#[case(ApiResponse::json(200, &json!({ "ok": true })), Some(200))]
#[tokio::test]
async fn soft_failures_keep_the_session(
    #[case] response: ApiResponse,
    #[case] expected_status: Option<u16>,
) {
    let (service, _, store) = service(
        ScriptedTransport::new().reply(response),
        InMemorySessionStore::with_token(token("old")),
    );
    let outcome = service.refresh().await;
    assert!(
        matches!(outcome, RefreshOutcome::Failed { status, .. } if status == expected_status),
        "unexpected outcome {outcome:?}"
    );
    assert_eq!(store.token().await.expect("read"), Some(token("old")));
}

#[rstest]
#[case(ScriptedTransport::new().fail(HttpTransportError::timeout("30s elapsed")))]
#[case(ScriptedTransport::new().reply(ApiResponse::new(200).with_body("<html>")))]
#[tokio::test]
async fn errors_clear_session_with_error_flag(#[case] transport: ScriptedTransport) {
    let (service, _, store) = service(transport, InMemorySessionStore::with_token(token("old")));
    let RefreshOutcome::SessionEnded(redirect) = service.refresh().await else {
        panic!("expected the session to end");
    };
    assert_eq!(redirect.reason(), RedirectReason::ExpiredWithError);
    assert!(redirect.location().contains("error=true"));
    assert_eq!(store.token().await.expect("read"), None);
}

#[tokio::test]
async fn store_write_failure_ends_session() {
    let mut store = MockSessionStore::new();
    store.expect_token().returning(|| Ok(Some(token("old"))));
    store
        .expect_set_token()
        .returning(|_| Err(SessionStoreError::write("disk full")));
    store.expect_clear_session().times(1).returning(|| Ok(()));

    let transport = Arc::new(ScriptedTransport::new().reply_json(200, &json!({ "token": "new" })));
    let service = TokenRefreshService::new(transport, Arc::new(store), LoginRoute::default());

    assert!(matches!(
        service.refresh().await,
        RefreshOutcome::SessionEnded(redirect) if redirect.reason() == RedirectReason::ExpiredWithError
    ));
}

#[rstest]
#[case(json!({ "access_token": "a", "token": "b" }), Some("a"))]
#[case(json!({ "token": "has space" }), None)]
#[case(json!({ "access_token": 42 }), None)]
#[case(json!([]), None)]
fn extracts_first_usable_token(#[case] body: Value, #[case] expected: Option<&str>) {
    assert_eq!(
        extract_token(&body).as_ref().map(SessionToken::as_str),
        expected
    );
}
