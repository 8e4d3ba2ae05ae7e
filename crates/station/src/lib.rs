pub mod auth;
pub mod db;
pub mod errors;
pub mod ingest;
pub mod query;
pub mod resolver;
pub mod routes;
pub mod scene;
pub mod startup;
pub mod state;
pub mod time_parse;
pub mod timezone;
pub mod utils;

pub use db::{Database, NewObservation, Observation, ObservationData};
pub use errors::ApiError;
pub use ingest::{IngestAck, IngestionService, PositionAck, StrikeAck};
pub use query::{
    CurrentReport, DateBounds, DeviceClass, DisplayObservation, HistoricalReport, QueryService,
    WindowReport, NO_DATA_MESSAGE,
};
pub use resolver::{HttpResolver, LocationResolver, ResolvedLocation};
pub use routes::*;
pub use scene::{classify, Scene};
pub use startup::{app, build_app_state, AppState};
pub use state::{LightningState, LocationState, StationState};
pub use time_parse::parse_date_str;
pub use timezone::{format_local, to_local};
pub use utils::{get_config_info, get_log_level, setup_logger, Cli};
