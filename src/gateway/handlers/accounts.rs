//! Account handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::Claims;
use crate::currency;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, created, error_codes, ok};
use crate::store::accounts::AccountRepository;
use crate::store::models::Account;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(min = 3, max = 8))]
    pub currency: String,
}

/// POST /accounts
///
/// The owner is always the authenticated user; new accounts start at zero.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAccountRequest>,
) -> ApiResult<Account> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    if !currency::is_supported(&req.currency) {
        return ApiError::bad_request(format!("unsupported currency: {}", req.currency)).into_err();
    }

    let account = AccountRepository::create(state.store.pool(), &claims.sub, &req.currency, 0)
        .await
        .map_err(ApiError::from_store)?;

    tracing::info!(account_id = account.id, owner = %account.owner, currency = %account.currency, "account created");
    created(account)
}

/// GET /accounts/{id}
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> ApiResult<Account> {
    let account = AccountRepository::get(state.store.pool(), id)
        .await
        .map_err(ApiError::from_store)?;

    if account.owner != claims.sub {
        return ApiError::new(
            StatusCode::UNAUTHORIZED,
            error_codes::NOT_OWNER,
            "account does not belong to the authenticated user",
        )
        .into_err();
    }

    ok(account)
}

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListAccountsQuery>,
) -> ApiResult<Vec<Account>> {
    let limit = params.limit.unwrap_or(10).clamp(1, 50);
    let offset = params.offset.unwrap_or(0).max(0);

    let accounts = AccountRepository::list_by_owner(state.store.pool(), &claims.sub, limit, offset)
        .await
        .map_err(ApiError::from_store)?;

    ok(accounts)
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchAccountsRequest {
    #[validate(length(min = 1))]
    pub owner: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /accounts/search
pub async fn search_accounts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchAccountsRequest>,
) -> ApiResult<Vec<Account>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let limit = req.limit.unwrap_or(10).clamp(1, 50);
    let offset = req.offset.unwrap_or(0).max(0);

    let accounts = AccountRepository::search_by_owner(state.store.pool(), &req.owner, limit, offset)
        .await
        .map_err(ApiError::from_store)?;

    ok(accounts)
}
