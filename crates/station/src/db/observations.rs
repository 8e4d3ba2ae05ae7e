//! Observation record types and the store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// One persisted sensor reading. Temperatures are stored in °C; presentation
/// conversion happens in the query layer.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Observation {
    pub id: i64,
    pub recorded_at: DateTime<Utc>,
    pub temperature: f64,
    pub relative_humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub solar_radiation: f64,
    pub precip_rate: f64,
    pub strike_rate: f64,
}

/// A validated reading awaiting its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub recorded_at: DateTime<Utc>,
    pub temperature: f64,
    pub relative_humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub solar_radiation: f64,
    pub precip_rate: f64,
    pub strike_rate: f64,
}

impl NewObservation {
    pub fn with_id(self, id: i64) -> Observation {
        Observation {
            id,
            recorded_at: self.recorded_at,
            temperature: self.temperature,
            relative_humidity: self.relative_humidity,
            pressure: self.pressure,
            wind_speed: self.wind_speed,
            wind_direction: self.wind_direction,
            solar_radiation: self.solar_radiation,
            precip_rate: self.precip_rate,
            strike_rate: self.strike_rate,
        }
    }
}

/// Append-only observation store.
///
/// Ids are assigned at insert time as one past the current maximum and never
/// reused. Range queries filter on `recorded_at`, not id order.
#[async_trait]
pub trait ObservationData: Send + Sync {
    /// Insert a reading, returning its assigned id. Id computation and the
    /// insert are a single atomic statement.
    async fn append(&self, observation: NewObservation) -> Result<i64, sqlx::Error>;

    /// Readings with `start <= recorded_at <= end`, ascending by timestamp.
    /// An empty window yields an empty vec, never an error.
    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, sqlx::Error>;

    /// The reading with the highest id, if any.
    async fn latest(&self) -> Result<Option<Observation>, sqlx::Error>;

    /// The reading with the lowest id, if any. Bounds the date picker.
    async fn earliest(&self) -> Result<Option<Observation>, sqlx::Error>;
}
