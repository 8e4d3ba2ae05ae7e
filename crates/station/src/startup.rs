use crate::{
    current, db::Database, db::Observation, health, historical, historical_form,
    ingest::IngestionService, position, query::QueryService, resolver::LocationResolver, routes,
    scene::Scene, state::StationState, strike, update,
};
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub state: Arc<StationState>,
    pub ingestion: Arc<IngestionService>,
    pub query: Arc<QueryService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::ingest::update,
        routes::ingest::strike,
        routes::ingest::position,
        routes::query::current,
        routes::query::historical,
        routes::query::historical_form,
        routes::health::health,
    ),
    components(
        schemas(
            crate::ingest::IngestAck,
            crate::ingest::StrikeAck,
            crate::ingest::PositionAck,
            crate::query::CurrentReport,
            crate::query::HistoricalReport,
            crate::query::WindowReport,
            crate::query::DisplayObservation,
            crate::query::DateBounds,
            Observation,
            Scene,
        )
    ),
    tags(
        (name = "piwx station api", description = "observation ingestion and time-series queries for a single weather station")
    )
)]
struct ApiDoc;

pub async fn build_app_state(
    db_dir: String,
    credential_digest: String,
    current_window_hours: i64,
    display_zone: Tz,
    resolver: Arc<dyn LocationResolver>,
) -> Result<AppState, anyhow::Error> {
    let database = Arc::new(Database::new(&db_dir).await?);
    let state = Arc::new(StationState::new(display_zone));

    let ingestion = Arc::new(IngestionService::new(
        database.clone(),
        state.clone(),
        resolver,
        credential_digest,
    ));
    let query = Arc::new(QueryService::new(
        database.clone(),
        state.clone(),
        current_window_hours,
    ));

    Ok(AppState {
        database,
        state,
        ingestion,
        query,
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        // Sensor-facing writes
        .route("/update", post(update))
        .route("/strike", post(strike))
        .route("/position", post(position))
        // Viewer-facing reads
        .route("/current", get(current))
        .route("/historical", get(historical).post(historical_form))
        .route("/health", get(health))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request", "new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = chrono::Utc::now() - now;
    info!(target: "http_response", "response, code: {}, time: {}ms", response.status().as_str(), response_time.num_milliseconds());

    response
}
