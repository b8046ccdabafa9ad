//! Transfer handlers.
//!
//! The gateway owns the checks the engine does not repeat: positive amount
//! (via validation), account existence, currency match, and source-account
//! ownership. Only then is the transactional engine invoked.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::Claims;
use crate::currency;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, error_codes, ok};
use crate::store::accounts::AccountRepository;
use crate::store::models::{Account, Transfer};
use crate::store::transfers::TransferRepository;
use crate::store::{TransferTxParams, TransferTxResult};

#[derive(Debug, Deserialize, Validate)]
pub struct TransferRequest {
    #[validate(range(min = 1))]
    pub from_account_id: i64,
    #[validate(range(min = 1))]
    pub to_account_id: i64,
    /// Amount in the smallest currency unit.
    #[validate(range(min = 1))]
    pub amount: i64,
    pub currency: String,
}

/// POST /transfers
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<TransferTxResult> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    if !currency::is_supported(&req.currency) {
        return ApiError::bad_request(format!("unsupported currency: {}", req.currency)).into_err();
    }

    let from_account = valid_account(&state, req.from_account_id, &req.currency).await?;
    if from_account.owner != claims.sub {
        return ApiError::new(
            StatusCode::UNAUTHORIZED,
            error_codes::NOT_OWNER,
            "from account does not belong to the authenticated user",
        )
        .into_err();
    }

    valid_account(&state, req.to_account_id, &req.currency).await?;

    let result = state
        .store
        .transfer_tx(TransferTxParams {
            from_account_id: req.from_account_id,
            to_account_id: req.to_account_id,
            amount: req.amount,
        })
        .await
        .map_err(ApiError::from_store)?;

    tracing::info!(
        transfer_id = result.transfer.id,
        from = req.from_account_id,
        to = req.to_account_id,
        amount = req.amount,
        "transfer committed"
    );
    ok(result)
}

/// Fetch an account and require its currency to match the request.
async fn valid_account(
    state: &AppState,
    account_id: i64,
    currency: &str,
) -> Result<Account, ApiError> {
    let account = AccountRepository::get(state.store.pool(), account_id)
        .await
        .map_err(ApiError::from_store)?;

    if account.currency != currency {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            error_codes::CURRENCY_MISMATCH,
            format!(
                "account {} currency mismatch: {} vs {}",
                account_id, account.currency, currency
            ),
        ));
    }

    Ok(account)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListTransfersRequest {
    #[validate(range(min = 1))]
    pub id: i64,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /transfers/account
///
/// Transfers sent from the given account.
pub async fn list_transfers_for_account(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListTransfersRequest>,
) -> ApiResult<Vec<Transfer>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let limit = req.limit.unwrap_or(10).clamp(1, 50);
    let offset = req.offset.unwrap_or(0).max(0);

    let transfers =
        TransferRepository::list_by_from_account(state.store.pool(), req.id, limit, offset)
            .await
            .map_err(ApiError::from_store)?;

    ok(transfers)
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchTransfersRequest {
    #[validate(length(min = 1))]
    pub search_query: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /transfers/search
pub async fn search_transfers(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchTransfersRequest>,
) -> ApiResult<Vec<Transfer>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let limit = req.limit.unwrap_or(10).clamp(1, 50);
    let offset = req.offset.unwrap_or(0).max(0);

    let transfers = TransferRepository::search_by_account_owner(
        state.store.pool(),
        &req.search_query,
        limit,
        offset,
    )
    .await
    .map_err(ApiError::from_store)?;

    ok(transfers)
}
