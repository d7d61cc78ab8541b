//! Probe endpoints.
//!
//! - GET /health - liveness, no dependency checks
//! - GET /ready - readiness, verifies database connectivity

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

/// Body of the liveness probe.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process answers at all.
    pub status: &'static str,
    /// Crate version baked in at compile time.
    pub version: &'static str,
}

/// Liveness probe. Answers `{"status":"ok","version":...}` as long as
/// the process runs; dependencies are the readiness probe's business.
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    let body = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    };
    (StatusCode::OK, Json(body))
}

/// Body of the readiness probe.
#[derive(Serialize)]
pub struct ReadinessResponse {
    /// Whether traffic should be routed here.
    pub ready: bool,
    /// Whether the database answered the probe query.
    pub database: bool,
}

/// Readiness probe. Runs a trivial query against the pool and reports
/// 503 while the database is unreachable, so load balancers hold
/// traffic back.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = sqlx::query("SELECT 1").execute(state.pool()).await.is_ok();

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready: database,
            database,
        }),
    )
}
