use axum::{extract::State, Json};

use crate::{api::models::*, config::Settings, db::DbPool, Result};

pub mod auth;
pub mod collections;
pub mod devices;
pub mod recipes;
pub mod tags;
pub mod users;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub settings: Settings,
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadinessResponse>> {
    // Check database connectivity
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    Ok(Json(ReadinessResponse {
        ready: db_healthy,
        database: if db_healthy { "ok" } else { "error" }.to_string(),
    }))
}
