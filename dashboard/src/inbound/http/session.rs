//! Session endpoints.
//!
//! ```text
//! POST /api/v1/session/login {"email":"ops@example.com","password":"secret"}
//! POST /api/v1/session/logout
//! GET  /api/v1/session
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, LoginCredentials, LoginValidationError, UserProfile};

use super::gateway_session::GatewaySession;

const NO_SESSION_MESSAGE: &str = "You are not logged in.";

/// Login request body for `POST /api/v1/session/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Body returned by login and the current-session probe.
#[derive(Debug, Serialize)]
pub struct SessionBody {
    /// Profile stored in the `user` cookie.
    pub user: UserProfile,
}

fn session_response(user: UserProfile) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(SessionBody { user })
}

/// Exchange credentials for `token` and `user` cookies.
#[post("/session/login")]
pub async fn login(session: GatewaySession, payload: web::Json<LoginRequest>) -> HttpResponse {
    let result = async {
        let credentials = LoginCredentials::try_from(payload.into_inner())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let user = session.auth().login(&credentials).await?;
        Ok::<_, Error>(session_response(user))
    }
    .await;
    session.respond(result)
}

/// Clear the session cookies.
#[post("/session/logout")]
pub async fn logout(session: GatewaySession) -> HttpResponse {
    let result = session
        .auth()
        .logout()
        .await
        .map(|()| HttpResponse::NoContent().finish());
    session.respond(result)
}

/// Profile of the signed-in user, or `401` without a session.
#[get("/session")]
pub async fn current_session(session: GatewaySession) -> HttpResponse {
    let result = async {
        let user = session
            .auth()
            .current_user()
            .await?
            .ok_or_else(|| Error::unauthenticated(NO_SESSION_MESSAGE))?;
        Ok::<_, Error>(session_response(user))
    }
    .await;
    session.respond(result)
}
