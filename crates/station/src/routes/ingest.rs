use axum::{extract::State, Form, Json};
use std::{collections::HashMap, sync::Arc};

use crate::{
    errors::ApiError,
    ingest::{IngestAck, PositionAck, StrikeAck},
    AppState,
};

#[utoipa::path(
    post,
    path = "/update",
    responses(
        (status = OK, description = "Observation committed", body = IngestAck),
        (status = UNAUTHORIZED, description = "Bad credential"),
        (status = BAD_REQUEST, description = "Missing or non-numeric field")
    ))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<IngestAck>, ApiError> {
    state.ingestion.ingest(&fields).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/strike",
    responses(
        (status = OK, description = "Strike recorded", body = StrikeAck),
        (status = UNAUTHORIZED, description = "Bad credential"),
        (status = BAD_REQUEST, description = "Missing or non-numeric field")
    ))]
pub async fn strike(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<StrikeAck>, ApiError> {
    state.ingestion.report_strike(&fields).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/position",
    responses(
        (status = OK, description = "Position updated", body = PositionAck),
        (status = UNAUTHORIZED, description = "Bad credential"),
        (status = BAD_GATEWAY, description = "Resolver failed"),
        (status = GATEWAY_TIMEOUT, description = "Resolver timed out")
    ))]
pub async fn position(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<PositionAck>, ApiError> {
    state.ingestion.update_position(&fields).await.map(Json)
}
