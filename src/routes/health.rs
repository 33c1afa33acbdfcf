use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Liveness plus a round trip to Postgres.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if let Err(e) = sqlx::query("SELECT 1").execute(&state.db).await {
        tracing::warn!(error = %e, "health check could not reach the database");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "unreachable" })),
        );
    }
    (StatusCode::OK, Json(json!({ "status": "ok", "database": "reachable" })))
}
