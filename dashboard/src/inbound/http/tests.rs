//! Gateway route coverage against a scripted upstream.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use super::*;
use crate::Trace;
use crate::domain::{LoginRoute, TOKEN_COOKIE, USER_COOKIE};
use crate::test_support::ScriptedTransport;

async fn call(
    transport: ScriptedTransport,
    req: test::TestRequest,
) -> (ServiceResponse, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let state = HttpState::new(
        transport.clone(),
        CookiePolicy::new(false),
        LoginRoute::default(),
    );
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(Trace)
            .configure(configure),
    )
    .await;
    let res = test::call_service(&app, req.to_request()).await;
    (res, transport)
}

fn response_cookie(res: &ServiceResponse, name: &str) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(Cookie::into_owned)
}

#[actix_web::test]
async fn list_without_token_is_unauthenticated() {
    let (res, transport) = call(
        ScriptedTransport::new(),
        test::TestRequest::get().uri("/api/v1/resources/employees"),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let trace_id = res
        .headers()
        .get(crate::domain::TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], json!("unauthenticated"));
    assert_eq!(body["traceId"], json!(trace_id));
    assert!(body.get("redirect").is_none());
    assert!(transport.requests().is_empty());
}

#[actix_web::test]
async fn list_forwards_cookie_token_and_query() {
    let (res, transport) = call(
        ScriptedTransport::new().reply_json(200, &json!({ "data": [{ "id": 1 }], "total": 1 })),
        test::TestRequest::get()
            .uri("/api/v1/resources/fleet/vehicles?page=2&limit=20&search=van")
            .cookie(Cookie::new(TOKEN_COOKIE, "a.b.c")),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(response_cookie(&res, TOKEN_COOKIE).is_none());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["total"], json!(1));

    let requests = transport.requests();
    let sent = requests.first().expect("one upstream request");
    assert_eq!(sent.path(), "/api/fleet/vehicles");
    assert_eq!(sent.header("authorization"), Some("Bearer a.b.c"));
    assert!(sent.header(crate::domain::TRACE_ID_HEADER).is_some());
    assert!(sent.query().contains(&("page".to_owned(), "2".to_owned())));
    assert!(sent.query().contains(&("search".to_owned(), "van".to_owned())));
}

#[actix_web::test]
async fn upstream_401_clears_cookies_and_redirects() {
    let (res, _) = call(
        ScriptedTransport::new().reply_json(401, &json!({ "message": "Token expired" })),
        test::TestRequest::get()
            .uri("/api/v1/records/employees/42")
            .cookie(Cookie::new(TOKEN_COOKIE, "stale"))
            .cookie(Cookie::new(USER_COOKIE, r#"{"role":"admin"}"#)),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    for name in [TOKEN_COOKIE, USER_COOKIE] {
        let removal = response_cookie(&res, name).expect("removal cookie");
        assert_eq!(removal.value(), "");
    }
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], json!("session_expired"));
    assert_eq!(body["redirect"]["location"], json!("/login?expired=true"));
}

#[actix_web::test]
async fn upstream_validation_error_passes_status_through() {
    let (res, _) = call(
        ScriptedTransport::new()
            .reply_json(422, &json!({ "errors": [{ "message": "Plate is required" }] })),
        test::TestRequest::post()
            .uri("/api/v1/resources/fleet/vehicles")
            .cookie(Cookie::new(TOKEN_COOKIE, "a.b.c"))
            .set_json(json!({ "plate": "" })),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], json!("upstream"));
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("Plate is required"))
    );
}

#[actix_web::test]
async fn create_returns_created() {
    let (res, transport) = call(
        ScriptedTransport::new().reply_json(201, &json!({ "id": 7 })),
        test::TestRequest::post()
            .uri("/api/v1/resources/employees")
            .cookie(Cookie::new(TOKEN_COOKIE, "a.b.c"))
            .set_json(json!({ "name": "Ada" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(
        transport.requests().first().and_then(|sent| sent.body().cloned()),
        Some(json!({ "name": "Ada" }))
    );
}

#[actix_web::test]
async fn invalid_resource_is_bad_request() {
    let (res, transport) = call(
        ScriptedTransport::new(),
        test::TestRequest::delete()
            .uri("/api/v1/records/Employees/42")
            .cookie(Cookie::new(TOKEN_COOKIE, "a.b.c")),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(transport.requests().is_empty());
}

#[actix_web::test]
async fn login_sets_token_and_user_cookies() {
    let (res, transport) = call(
        ScriptedTransport::new().reply_json(
            200,
            &json!({
                "token": "issued",
                "user": { "email": "ops@example.com", "role": "supervisor" }
            }),
        ),
        test::TestRequest::post()
            .uri("/api/v1/session/login")
            .set_json(json!({ "email": "ops@example.com", "password": "secret" })),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let token = response_cookie(&res, TOKEN_COOKIE).expect("token cookie");
    assert_eq!(token.value(), "issued");
    assert_eq!(token.http_only(), Some(true));
    assert_eq!(token.path(), Some("/"));
    let user = response_cookie(&res, USER_COOKIE).expect("user cookie");
    assert!(user.value().contains("supervisor"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["email"], json!("ops@example.com"));
    assert_eq!(transport.paths(), vec![crate::domain::LOGIN_ENDPOINT.to_owned()]);
}

#[actix_web::test]
async fn login_rejects_blank_email_without_upstream_call() {
    let (res, transport) = call(
        ScriptedTransport::new(),
        test::TestRequest::post()
            .uri("/api/v1/session/login")
            .set_json(json!({ "email": "  ", "password": "secret" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(transport.requests().is_empty());
}

#[actix_web::test]
async fn logout_removes_cookies() {
    let (res, _) = call(
        ScriptedTransport::new(),
        test::TestRequest::post()
            .uri("/api/v1/session/logout")
            .cookie(Cookie::new(TOKEN_COOKIE, "a.b.c")),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response_cookie(&res, TOKEN_COOKIE).map(|cookie| cookie.value().to_owned()),
        Some(String::new())
    );
}

#[actix_web::test]
async fn current_session_requires_user_cookie() {
    let (res, _) = call(
        ScriptedTransport::new(),
        test::TestRequest::get().uri("/api/v1/session"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn current_session_reads_user_cookie() {
    let (res, transport) = call(
        ScriptedTransport::new(),
        test::TestRequest::get()
            .uri("/api/v1/session")
            .cookie(Cookie::new(USER_COOKIE, r#"{"name":"Ada","role":"admin"}"#)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["role"], json!("admin"));
    assert!(transport.requests().is_empty());
}

#[actix_web::test]
async fn transport_failure_is_bad_gateway() {
    let (res, _) = call(
        ScriptedTransport::new(),
        test::TestRequest::get()
            .uri("/api/v1/records/employees/42")
            .cookie(Cookie::new(TOKEN_COOKIE, "a.b.c")),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], json!("transport"));
}
