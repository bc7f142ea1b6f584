//! HTTP handlers for the REST API.
//!
//! Each handler delegates to the orchestrator or repository; nothing here
//! computes, formats or colors anything.

use axum::{
    extract::{Query, State},
    Json,
};

use super::dto::{DashboardQuery, DashboardResponse, HealthResponse};
use super::error::AppError;
use super::state::AppState;
use crate::cache::PersistedSnapshot;

/// GET /health
///
/// Health check endpoint to verify the service is running and the data
/// source is reachable.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    })
}

/// GET /v1/patio?force=true
///
/// Run one render cycle: serve the cached view when fresh, refresh it when
/// stale, missing or forced. Refresh failures come back inside the payload
/// (`stale` + `refresh_error`), never as an HTTP error, so the frontend
/// always has a table to draw.
pub async fn get_patio(
    State(state): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Json<DashboardResponse> {
    let force = params.force.as_deref().is_some_and(is_truthy);
    let cycle = state.orchestrator.run_cycle(force).await;
    Json(DashboardResponse::from(cycle))
}

/// GET /v1/patio/snapshot
///
/// The raw persisted snapshot, exactly as stored on disk. 404 when no
/// refresh has ever succeeded.
pub async fn get_snapshot(
    State(state): State<AppState>,
) -> Result<Json<PersistedSnapshot>, AppError> {
    state
        .orchestrator
        .persisted_snapshot()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no snapshot persisted yet".to_string()))
}

/// Lenient boolean parse for the force-refresh query flag.
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
