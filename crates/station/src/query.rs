//! Time-windowed reads for the viewer.
//!
//! The store keeps °C and UTC; everything leaving this module is already
//! unit-converted and localized, so presentation layers never touch raw
//! rows. An empty window is a valid result carrying an explicit message,
//! not an error.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use piwx_core::DEFAULT_HISTORY_WINDOW_DAYS;

use crate::{
    db::{Observation, ObservationData},
    errors::ApiError,
    state::StationState,
    time_parse::parse_date_str,
    timezone::format_local,
};

/// Message presentation shows when a window matched nothing.
pub const NO_DATA_MESSAGE: &str = "no data available in this period";

/// Declared client type; only affects which auxiliary plot axes the viewer
/// renders, surfaced as a boolean hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Compact,
    Full,
}

impl DeviceClass {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("compact") => DeviceClass::Compact,
            _ => DeviceClass::Full,
        }
    }

    pub fn full_axes(&self) -> bool {
        matches!(self, DeviceClass::Full)
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    (celsius * 9.0 / 5.0) + 32.0
}

/// An observation after unit and timezone conversion.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DisplayObservation {
    pub id: i64,
    /// Local time, `YYYY-MM-DD HH:MM ZONE`.
    pub recorded_at: String,
    pub temperature_f: f64,
    pub relative_humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub solar_radiation: f64,
    pub precip_rate: f64,
    pub strike_rate: f64,
}

impl DisplayObservation {
    fn from_stored(observation: &Observation, zone: chrono_tz::Tz) -> Self {
        Self {
            id: observation.id,
            recorded_at: format_local(observation.recorded_at, zone),
            temperature_f: celsius_to_fahrenheit(observation.temperature),
            relative_humidity: observation.relative_humidity,
            pressure: observation.pressure,
            wind_speed: observation.wind_speed,
            wind_direction: observation.wind_direction,
            solar_radiation: observation.solar_radiation,
            precip_rate: observation.precip_rate,
            strike_rate: observation.strike_rate,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WindowReport {
    /// Queried bounds, UTC RFC 3339.
    pub start: String,
    pub end: String,
    pub observations: Vec<DisplayObservation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub full_axes: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentReport {
    #[serde(flatten)]
    pub window: WindowReport,
    /// Latest reading for the conditions panel; present whenever the store
    /// holds anything at all, even with an empty window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<DisplayObservation>,
    pub scene: String,
    pub scene_asset: String,
    pub place_name: String,
}

/// First/last observation dates bounding the date-picker, UTC `YYYY-MM-DD`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DateBounds {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoricalReport {
    #[serde(flatten)]
    pub window: WindowReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_bounds: Option<DateBounds>,
}

/// Default-window policy for historical queries: a missing bound extends the
/// present one by the default width, and a degenerate equal pair widens one
/// day each side.
pub(crate) fn resolve_window(
    now: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let default_width = Duration::days(DEFAULT_HISTORY_WINDOW_DAYS);

    match (start, end) {
        (None, None) => (now - default_width, now),
        (None, Some(end)) => (end - default_width, end),
        (Some(start), None) => (start, start + default_width),
        (Some(start), Some(end)) if start == end => {
            (start - Duration::days(1), end + Duration::days(1))
        }
        (Some(start), Some(end)) => (start, end),
    }
}

pub struct QueryService {
    store: Arc<dyn ObservationData>,
    state: Arc<StationState>,
    current_window_hours: i64,
}

impl QueryService {
    pub fn new(
        store: Arc<dyn ObservationData>,
        state: Arc<StationState>,
        current_window_hours: i64,
    ) -> Self {
        Self {
            store,
            state,
            current_window_hours,
        }
    }

    /// The fixed-lookback "current conditions" view. When the window is
    /// empty the plot reports no data but the conditions panel still shows
    /// the system-wide latest reading.
    pub async fn current_window(
        &self,
        now: DateTime<Utc>,
        client: DeviceClass,
    ) -> Result<CurrentReport, ApiError> {
        let start = now - Duration::hours(self.current_window_hours);
        let rows = self.store.query_range(start, now).await?;

        let location = self.state.location().await;
        let zone = location.timezone;

        let observations: Vec<DisplayObservation> = rows
            .iter()
            .map(|o| DisplayObservation::from_stored(o, zone))
            .collect();

        let conditions = match rows.last() {
            Some(latest_in_window) => Some(DisplayObservation::from_stored(latest_in_window, zone)),
            None => self
                .store
                .latest()
                .await?
                .map(|o| DisplayObservation::from_stored(&o, zone)),
        };

        let message = observations
            .is_empty()
            .then(|| NO_DATA_MESSAGE.to_string());
        let scene = self.state.current_scene().await;

        Ok(CurrentReport {
            window: WindowReport {
                start: start.to_rfc3339(),
                end: now.to_rfc3339(),
                observations,
                message,
                full_axes: client.full_axes(),
            },
            conditions,
            scene: scene.to_string(),
            scene_asset: scene.asset().to_string(),
            place_name: location.place_name,
        })
    }

    /// Historical view over an explicit or defaulted window. Bounds arrive
    /// as loose date strings; an unparseable bound counts as absent.
    pub async fn historical_window(
        &self,
        now: DateTime<Utc>,
        start_text: Option<&str>,
        end_text: Option<&str>,
        client: DeviceClass,
    ) -> Result<HistoricalReport, ApiError> {
        let start = start_text.and_then(parse_date_str);
        let end = end_text.and_then(parse_date_str);
        let (start, end) = resolve_window(now, start, end);

        let rows = self.store.query_range(start, end).await?;
        let zone = self.state.location().await.timezone;

        let observations: Vec<DisplayObservation> = rows
            .iter()
            .map(|o| DisplayObservation::from_stored(o, zone))
            .collect();
        let message = observations
            .is_empty()
            .then(|| NO_DATA_MESSAGE.to_string());

        let date_bounds = match (self.store.earliest().await?, self.store.latest().await?) {
            (Some(earliest), Some(latest)) => Some(DateBounds {
                start: earliest.recorded_at.format("%Y-%m-%d").to_string(),
                end: latest.recorded_at.format("%Y-%m-%d").to_string(),
            }),
            _ => None,
        };

        Ok(HistoricalReport {
            window: WindowReport {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
                observations,
                message,
                full_axes: client.full_axes(),
            },
            date_bounds,
        })
    }
}
