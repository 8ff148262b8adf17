//! Resource endpoints forwarding dashboard CRUD calls upstream.
//!
//! ```text
//! GET    /api/v1/resources/fleet/vehicles?page=2&limit=20&search=van
//! POST   /api/v1/resources/employees {"name":"Ada"}
//! GET    /api/v1/records/employees/42
//! PUT    /api/v1/records/employees/42 {"name":"Ada"}
//! DELETE /api/v1/records/employees/42
//! ```
//!
//! Payloads pass through as opaque JSON.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::Value;

use crate::domain::{Error, ListQuery};

use super::gateway_session::GatewaySession;

fn json_response(mut builder: actix_web::HttpResponseBuilder, payload: &Value) -> HttpResponse {
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(payload)
}

/// List records of a resource.
#[get("/resources/{resource:.*}")]
pub async fn list_records(
    session: GatewaySession,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let result = async {
        let payload = session.resource(&path)?.list(&query).await?;
        Ok::<_, Error>(json_response(HttpResponse::Ok(), &payload))
    }
    .await;
    session.respond(result)
}

/// Create a record.
#[post("/resources/{resource:.*}")]
pub async fn create_record(
    session: GatewaySession,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    let result = async {
        let payload = session.resource(&path)?.create(body.into_inner()).await?;
        Ok::<_, Error>(json_response(HttpResponse::Created(), &payload))
    }
    .await;
    session.respond(result)
}

/// Fetch one record.
#[get("/records/{resource:.*}/{id}")]
pub async fn get_record(
    session: GatewaySession,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (resource, id) = path.into_inner();
    let result = async {
        let payload = session.resource(&resource)?.get(&id).await?;
        Ok::<_, Error>(json_response(HttpResponse::Ok(), &payload))
    }
    .await;
    session.respond(result)
}

/// Replace one record.
#[put("/records/{resource:.*}/{id}")]
pub async fn update_record(
    session: GatewaySession,
    path: web::Path<(String, String)>,
    body: web::Json<Value>,
) -> HttpResponse {
    let (resource, id) = path.into_inner();
    let result = async {
        let payload = session
            .resource(&resource)?
            .update(&id, body.into_inner())
            .await?;
        Ok::<_, Error>(json_response(HttpResponse::Ok(), &payload))
    }
    .await;
    session.respond(result)
}

/// Delete one record.
#[delete("/records/{resource:.*}/{id}")]
pub async fn delete_record(
    session: GatewaySession,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (resource, id) = path.into_inner();
    let result = async {
        let payload = session.resource(&resource)?.delete(&id).await?;
        Ok::<_, Error>(json_response(HttpResponse::Ok(), &payload))
    }
    .await;
    session.respond(result)
}
