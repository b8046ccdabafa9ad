//! ironbank service entry point.
//!
//! Composition root: everything is constructed here and injected down.
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│ Postgres │───▶│  Store   │───▶│ Gateway  │
//! │  (YAML)  │    │  (pool)  │    │ (tx core)│    │  (axum)  │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘
//! ```

use std::sync::Arc;

use ironbank::auth::TokenMaker;
use ironbank::config::AppConfig;
use ironbank::gateway::{self, state::AppState};
use ironbank::logging;
use ironbank::store::{Database, Store};

fn get_env() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _log_guard = logging::init_logging(&config);

    tracing::info!(
        "Starting ironbank {} ({}) in {} mode",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env
    );

    let db = Database::connect(&config.database).await?;
    sqlx::migrate!().run(db.pool()).await?;
    tracing::info!("database migrations applied");

    let store = Store::new(db.pool().clone());
    let tokens = TokenMaker::new(
        config.auth.token_secret.clone(),
        config.auth.access_token_ttl_secs,
    );
    let state = Arc::new(AppState::new(store, tokens));

    gateway::serve(&config.server, state).await
}
