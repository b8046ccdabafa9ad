//! Liveness endpoint.

use serde::Serialize;

use super::super::types::{ApiResult, ok};

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub version: &'static str,
    pub build: &'static str,
}

/// GET /health
pub async fn health_check() -> ApiResult<HealthData> {
    ok(HealthData {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        build: env!("GIT_HASH"),
    })
}
