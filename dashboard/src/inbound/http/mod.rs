//! HTTP inbound adapter: the actix-web session gateway.
//!
//! Routes under `/api/v1` read the `token`/`user` cookies, run the server
//! context operations against the upstream API and write cookie changes back.

pub mod error;
pub mod gateway_session;
pub mod health;
pub mod request_cookies;
pub mod resources;
pub mod session;
pub mod state;

use actix_web::web;

pub use error::ApiResult;
pub use gateway_session::GatewaySession;
pub use request_cookies::{CookiePolicy, RequestCookieStore};
pub use state::HttpState;

/// Mount the `/api/v1` gateway routes.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use dashboard::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(session::login)
            .service(session::logout)
            .service(session::current_session)
            .service(resources::list_records)
            .service(resources::create_record)
            .service(resources::get_record)
            .service(resources::update_record)
            .service(resources::delete_record),
    );
}

#[cfg(test)]
mod tests;
