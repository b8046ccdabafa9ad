//! Entry handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, ok};
use crate::store::entries::{EntryRepository, EntrySearch, EntrySort, SortOrder};
use crate::store::models::Entry;

/// GET /entries/{id}
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Entry> {
    let entry = EntryRepository::get(state.store.pool(), id)
        .await
        .map_err(ApiError::from_store)?;
    ok(entry)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListEntriesRequest {
    #[validate(range(min = 1))]
    pub id: i64,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /entries/account
pub async fn list_entries_for_account(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListEntriesRequest>,
) -> ApiResult<Vec<Entry>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let limit = req.limit.unwrap_or(10).clamp(1, 50);
    let offset = req.offset.unwrap_or(0).max(0);

    let entries = EntryRepository::list_by_account(state.store.pool(), req.id, limit, offset)
        .await
        .map_err(ApiError::from_store)?;

    ok(entries)
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchEntriesRequest {
    #[validate(length(min = 1))]
    pub search_query: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort_column: Option<String>,
    pub order_by: Option<String>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub min_date: Option<DateTime<Utc>>,
    pub max_date: Option<DateTime<Utc>>,
}

/// POST /entries/search
///
/// Unset filters widen to "everything": full amount range, the last year of
/// entries, newest first.
pub async fn search_entries(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchEntriesRequest>,
) -> ApiResult<Vec<Entry>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let sort = match &req.sort_column {
        Some(raw) => EntrySort::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("unknown sort column: {raw}")))?,
        None => EntrySort::Id,
    };
    let order = match &req.order_by {
        Some(raw) => SortOrder::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("unknown sort order: {raw}")))?,
        None => SortOrder::Desc,
    };

    let now = Utc::now();
    let search = EntrySearch {
        owner_query: &req.search_query,
        min_amount: req.min_amount.unwrap_or(i64::MIN),
        max_amount: req.max_amount.unwrap_or(i64::MAX),
        start_date: req.min_date.unwrap_or(now - Duration::days(365)),
        end_date: req.max_date.unwrap_or(now),
        sort,
        order,
        limit: req.limit.unwrap_or(10).clamp(1, 50),
        offset: req.offset.unwrap_or(0).max(0),
    };

    let entries = EntryRepository::search_by_account_owner(state.store.pool(), search)
        .await
        .map_err(ApiError::from_store)?;

    ok(entries)
}
