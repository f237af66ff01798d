// handlers/health.rs - GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::database::DatabaseManager;
use crate::middleware::Meta;
use crate::state::AppState;

/// 200 when the database answers `SELECT 1`, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = Meta::now().timestamp;

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "ok",
                "timestamp": timestamp,
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "database": "unavailable",
                    "timestamp": timestamp,
                })),
            )
        }
    }
}
