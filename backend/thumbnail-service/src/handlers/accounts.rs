use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::HandlerResult;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    fn bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// GET /api/v1/accounts/{account_id}/credits
pub async fn get_credits(state: web::Data<AppState>, path: web::Path<Uuid>) -> HandlerResult {
    let account_id = path.into_inner();
    let credits = state
        .ledger
        .balance(account_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(HttpResponse::Ok().json(json!({
        "accountId": account_id,
        "credits": credits,
    })))
}

/// GET /api/v1/accounts/{account_id}/generations
pub async fn list_generations(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> HandlerResult {
    let account_id = path.into_inner();
    let (limit, offset) = query.bounds();

    let generations = state
        .generations
        .list_for_account(account_id, limit, offset)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(HttpResponse::Ok().json(json!({
        "accountId": account_id,
        "generations": generations,
        "limit": limit,
        "offset": offset,
    })))
}
