//! HTTP gateway: router, middleware wiring, serve loop.

pub mod handlers;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::auth::bearer_auth_middleware;
use crate::config::ServerConfig;
use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/users", post(handlers::users::register))
        .route("/users/login", post(handlers::users::login));

    let authed = Router::new()
        .route("/users/{username}", get(handlers::users::get_user))
        .route("/users/{username}", delete(handlers::users::delete_user))
        .route("/users/search", post(handlers::users::search_users))
        .route("/users/list", post(handlers::users::list_users))
        .route("/users/password", put(handlers::users::update_password))
        .route("/accounts", post(handlers::accounts::create_account))
        .route("/accounts", get(handlers::accounts::list_accounts))
        .route("/accounts/{id}", get(handlers::accounts::get_account))
        .route("/accounts/search", post(handlers::accounts::search_accounts))
        .route("/transfers", post(handlers::transfers::create_transfer))
        .route(
            "/transfers/account",
            post(handlers::transfers::list_transfers_for_account),
        )
        .route(
            "/transfers/search",
            post(handlers::transfers::search_transfers),
        )
        .route("/entries/{id}", get(handlers::entries::get_entry))
        .route(
            "/entries/account",
            post(handlers::entries::list_entries_for_account),
        )
        .route("/entries/search", post(handlers::entries::search_entries))
        .layer(from_fn_with_state(state.clone(), bearer_auth_middleware));

    public
        .merge(authed)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("gateway listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
