/// HTTP handlers and route table
use actix_web::{error::InternalError, web, HttpResponse};

use crate::error::{ApiError, ErrorBody};

pub mod accounts;
pub mod generate;
pub mod health;
pub mod internal;

pub type HandlerResult = std::result::Result<HttpResponse, ApiError>;

/// Malformed JSON bodies get the same error shape as validation failures
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            let body = ErrorBody {
                error: format!("Invalid request body: {}", err),
                code: "VALIDATION_ERROR",
                details: None,
            };
            tracing::warn!(error = %err, "Rejected malformed JSON body");
            InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route(
            "/generate-thumbnail",
            web::post().to(generate::generate_thumbnail),
        )
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health::health))
                .route("/health/live", web::get().to(health::live))
                .route("/health/ready", web::get().to(health::ready))
                .service(
                    web::scope("/accounts/{account_id}")
                        .route("/credits", web::get().to(accounts::get_credits))
                        .route("/generations", web::get().to(accounts::list_generations)),
                )
                .service(
                    web::scope("/internal")
                        .route("/accounts", web::post().to(internal::provision_account))
                        .route(
                            "/accounts/{account_id}/credits",
                            web::post().to(internal::grant_credits),
                        )
                        .route("/stats", web::get().to(internal::stats)),
                ),
        );
}
