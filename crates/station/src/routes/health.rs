use axum::{extract::State, http::StatusCode, Json};
use log::error;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Database reachable and intact"),
        (status = INTERNAL_SERVER_ERROR, description = "Database check failed")
    ))]
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, String)> {
    state.database.health_check().await.map_err(|e| {
        error!("health check failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(json!({ "status": "ok" })))
}
