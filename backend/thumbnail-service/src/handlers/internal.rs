//! Service-to-service endpoints: account provisioning, credit grants, analytics
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::HandlerResult;
use crate::error::ThumbnailError;
use crate::models::{CreditGrant, NewAccount, StatsRange};
use crate::state::AppState;

pub const INTERNAL_KEY_HEADER: &str = "X-Internal-Api-Key";

/// Reject the call unless it carries the configured internal key
pub fn require_internal_key(req: &HttpRequest, expected: Option<&str>) -> Result<(), ThumbnailError> {
    let expected = expected
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ThumbnailError::Unauthorized("internal API key not configured".into()))?;

    let provided = req
        .headers()
        .get(INTERNAL_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ThumbnailError::Unauthorized(format!("missing {}", INTERNAL_KEY_HEADER)))?;

    if provided != expected {
        return Err(ThumbnailError::Unauthorized("invalid internal API key".into()));
    }
    Ok(())
}

/// POST /api/v1/internal/accounts
pub async fn provision_account(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewAccount>,
) -> HandlerResult {
    require_internal_key(&req, state.config.internal_api_key.as_deref())
        .map_err(|e| state.reject(e))?;

    let account = body.into_inner();
    account
        .validate()
        .map_err(|e| state.reject(ThumbnailError::from(e)))?;

    let account = state
        .ledger
        .provision(account, state.config.trial_bonus_credits)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(HttpResponse::Ok().json(account))
}

/// POST /api/v1/internal/accounts/{account_id}/credits
pub async fn grant_credits(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<CreditGrant>,
) -> HandlerResult {
    require_internal_key(&req, state.config.internal_api_key.as_deref())
        .map_err(|e| state.reject(e))?;

    let account_id = path.into_inner();
    let grant = body.into_inner();

    let credits = state
        .ledger
        .add(account_id, grant.amount)
        .await
        .map_err(|e| state.reject(e))?;

    tracing::info!(
        account_id = %account_id,
        amount = grant.amount,
        reason = grant.reason.as_str(),
        credits,
        "Credit grant applied"
    );

    Ok(HttpResponse::Ok().json(json!({
        "accountId": account_id,
        "credits": credits,
        "granted": grant.amount,
        "reason": grant.reason,
    })))
}

/// GET /api/v1/internal/stats
pub async fn stats(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<StatsRange>,
) -> HandlerResult {
    require_internal_key(&req, state.config.internal_api_key.as_deref())
        .map_err(|e| state.reject(e))?;

    let range = query.into_inner();
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(state.reject(ThumbnailError::Validation(
                "from must not be after to".to_string(),
            )));
        }
    }

    let stats = state
        .generations
        .stats(range)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(HttpResponse::Ok().json(stats))
}
