//! Gateway entry-point: wires the session gateway routes and health probes.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dashboard::Trace;
use dashboard::config::DashboardSettings;
use dashboard::inbound::http::health::{HealthState, live, ready};
use dashboard::inbound::http::{HttpState, configure};
use dashboard::outbound::http::ReqwestTransport;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = DashboardSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?
        .resolve()
        .map_err(std::io::Error::other)?;

    let transport = ReqwestTransport::new(settings.api_base_url.clone(), settings.request_timeout)
        .map_err(|e| std::io::Error::other(format!("failed to build HTTP client: {e}")))?;
    let http_state = web::Data::new(HttpState::new(
        Arc::new(transport),
        settings.cookies,
        settings.login.clone(),
    ));

    let health_state = web::Data::new(HealthState::new());
    // Clone for server factory so readiness probe remains accessible.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .wrap(Trace)
            .configure(configure)
            .service(ready)
            .service(live)
    })
    .bind(settings.bind_addr)?;

    info!(
        bind_addr = %settings.bind_addr,
        api_base_url = %settings.api_base_url,
        "dashboard gateway listening"
    );
    health_state.mark_ready();
    let result = server.run().await;
    health_state.mark_draining();
    result
}
