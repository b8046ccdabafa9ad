//! User handlers: registration, login, lookup, search, password update,
//! and the cascading delete.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{Claims, password};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, created, error_codes, ok};
use crate::store::models::User;
use crate::store::users::{NewUser, UserRepository};

/// Public view of a user row; never carries the credential hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
}

/// POST /users
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<UserResponse> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let hashed = password::hash_password(&req.password)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let user = UserRepository::create(
        state.store.pool(),
        NewUser {
            username: &req.username,
            hashed_password: &hashed,
            full_name: &req.full_name,
            email: &req.email,
        },
    )
    .await
    .map_err(ApiError::from_store)?;

    tracing::info!(username = %user.username, "user registered");
    created(user.into())
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

/// POST /users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let user = UserRepository::get(state.store.pool(), &req.username)
        .await
        .map_err(ApiError::from_store)?;

    password::verify_password(&req.password, &user.hashed_password)
        .map_err(|_| ApiError::unauthorized("invalid username or password"))?;

    let (access_token, _) = state
        .tokens
        .create_token(&user.username)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    ok(LoginResponse {
        access_token,
        user: user.into(),
    })
}

/// GET /users/{username}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<UserResponse> {
    let user = UserRepository::get(state.store.pool(), &username)
        .await
        .map_err(ApiError::from_store)?;
    ok(user.into())
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchUsersRequest {
    #[validate(length(min = 1))]
    pub username: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /users/search
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchUsersRequest>,
) -> ApiResult<Vec<UserResponse>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let limit = req.limit.unwrap_or(10).clamp(1, 50);
    let offset = req.offset.unwrap_or(0).max(0);

    let users = UserRepository::search(state.store.pool(), &req.username, limit, offset)
        .await
        .map_err(ApiError::from_store)?;

    ok(users.into_iter().map(UserResponse::from).collect())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListUsersRequest {
    #[validate(length(min = 1))]
    pub usernames: Vec<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /users/list
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListUsersRequest>,
) -> ApiResult<Vec<UserResponse>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let limit = req.limit.unwrap_or(10).clamp(1, 50);
    let offset = req.offset.unwrap_or(0).max(0);

    let users = UserRepository::get_many(state.store.pool(), &req.usernames, limit, offset)
        .await
        .map_err(ApiError::from_store)?;

    ok(users.into_iter().map(UserResponse::from).collect())
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// PUT /users/password
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<serde_json::Value> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let user = UserRepository::get(state.store.pool(), &req.username)
        .await
        .map_err(ApiError::from_store)?;

    if user.username != claims.sub {
        return ApiError::new(
            StatusCode::UNAUTHORIZED,
            error_codes::NOT_OWNER,
            "user does not belong to the authenticated caller",
        )
        .into_err();
    }

    let hashed = password::hash_password(&req.new_password)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    UserRepository::update_password(state.store.pool(), &req.username, &hashed)
        .await
        .map_err(ApiError::from_store)?;

    ok(serde_json::json!({ "status": "password updated" }))
}

/// DELETE /users/{username}
///
/// Removes the user and every account they own in one transaction.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(username): Path<String>,
) -> ApiResult<serde_json::Value> {
    if username != claims.sub {
        return ApiError::new(
            StatusCode::UNAUTHORIZED,
            error_codes::NOT_OWNER,
            "user does not belong to the authenticated caller",
        )
        .into_err();
    }

    state
        .store
        .delete_user_with_accounts_tx(&username)
        .await
        .map_err(ApiError::from_store)?;

    tracing::info!(username = %username, "user and owned accounts deleted");
    ok(serde_json::json!({ "status": "user deleted" }))
}
