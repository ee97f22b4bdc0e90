use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "thumbnail-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn live() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Ready once the database answers
pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    match state.ledger.health_check().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ready" })),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}
