use axum::{
    extract::{Query, State},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{
    errors::ApiError,
    query::{CurrentReport, DeviceClass, HistoricalReport},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CurrentParams {
    /// Declared client type: "compact" or "full" (default).
    pub client: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct HistoryParams {
    /// Window start in any recognized loose date format.
    pub start: Option<String>,
    /// Window end in any recognized loose date format.
    pub end: Option<String>,
    /// Declared client type: "compact" or "full" (default).
    pub client: Option<String>,
}

#[utoipa::path(
    get,
    path = "/current",
    params(CurrentParams),
    responses(
        (status = OK, description = "Current-window observations and conditions summary", body = CurrentReport)
    ))]
pub async fn current(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CurrentParams>,
) -> Result<Json<CurrentReport>, ApiError> {
    let client = DeviceClass::from_param(params.client.as_deref());
    state
        .query
        .current_window(Utc::now(), client)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/historical",
    params(HistoryParams),
    responses(
        (status = OK, description = "Historical-window observations", body = HistoricalReport)
    ))]
pub async fn historical(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoricalReport>, ApiError> {
    run_historical(&state, params).await
}

#[utoipa::path(
    post,
    path = "/historical",
    responses(
        (status = OK, description = "Historical-window observations", body = HistoricalReport)
    ))]
pub async fn historical_form(
    State(state): State<Arc<AppState>>,
    Form(params): Form<HistoryParams>,
) -> Result<Json<HistoricalReport>, ApiError> {
    run_historical(&state, params).await
}

async fn run_historical(
    state: &Arc<AppState>,
    params: HistoryParams,
) -> Result<Json<HistoricalReport>, ApiError> {
    let client = DeviceClass::from_param(params.client.as_deref());
    state
        .query
        .historical_window(
            Utc::now(),
            params.start.as_deref(),
            params.end.as_deref(),
            client,
        )
        .await
        .map(Json)
}
