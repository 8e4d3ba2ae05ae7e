//! Observation ingestion and the sensor-side state mutations.
//!
//! All three sensor endpoints funnel through this service: the periodic
//! observation post, the lightning strike report, and the position update.
//! Every path checks the shared-secret credential first and mutates nothing
//! on failure. Scene classification runs after a successful commit and is
//! best-effort: the observation's durability never depends on it.

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    auth,
    db::{NewObservation, ObservationData},
    errors::ApiError,
    resolver::LocationResolver,
    scene::{self, Scene},
    state::{LocationState, StationState},
    time_parse::parse_date_str,
};

/// Numeric observation fields in wire order; missing-field errors name the
/// first absent one.
const OBSERVATION_FIELDS: [&str; 8] = [
    "ta", "rh", "pres", "wspd", "wdir", "solar", "precip", "strikes",
];

#[derive(Debug, Serialize, ToSchema)]
pub struct IngestAck {
    pub status: &'static str,
    pub id: i64,
    pub scene: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StrikeAck {
    pub status: &'static str,
    pub last_strike_at: String,
    pub distance_km: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PositionAck {
    pub status: &'static str,
    pub place_name: String,
    pub timezone: String,
}

pub struct IngestionService {
    store: Arc<dyn ObservationData>,
    state: Arc<StationState>,
    resolver: Arc<dyn LocationResolver>,
    credential_digest: String,
}

impl IngestionService {
    pub fn new(
        store: Arc<dyn ObservationData>,
        state: Arc<StationState>,
        resolver: Arc<dyn LocationResolver>,
        credential_digest: String,
    ) -> Self {
        Self {
            store,
            state,
            resolver,
            credential_digest,
        }
    }

    /// Validate and commit one observation, then refresh the display scene.
    pub async fn ingest(&self, fields: &HashMap<String, String>) -> Result<IngestAck, ApiError> {
        self.authorize(fields)?;

        // A present-but-unparseable date falls back to now; absence is a
        // distinct named error.
        let date_text = required_field(fields, "date")?;
        let recorded_at = parse_date_str(date_text).unwrap_or_else(Utc::now);

        let mut values = [0f64; OBSERVATION_FIELDS.len()];
        for (slot, name) in values.iter_mut().zip(OBSERVATION_FIELDS) {
            *slot = numeric_field(fields, name)?;
        }
        let [ta, rh, pres, wspd, wdir, solar, precip, strikes] = values;

        let observation = NewObservation {
            recorded_at,
            temperature: ta,
            relative_humidity: rh,
            pressure: pres,
            wind_speed: wspd,
            wind_direction: wdir,
            solar_radiation: solar,
            precip_rate: precip,
            strike_rate: strikes,
        };

        let id = self.store.append(observation.clone()).await?;
        let scene = self.refresh_scene(observation.with_id(id)).await;

        Ok(IngestAck {
            status: "ok",
            id,
            scene: scene.to_string(),
        })
    }

    /// Record a lightning strike. The report overwrites the previous one
    /// unconditionally; detectors send them in order.
    pub async fn report_strike(
        &self,
        fields: &HashMap<String, String>,
    ) -> Result<StrikeAck, ApiError> {
        self.authorize(fields)?;

        let date_text = required_field(fields, "date")?;
        let at = parse_date_str(date_text).unwrap_or_else(Utc::now);
        let distance_km = numeric_field(fields, "distance")?.round();

        self.state.record_strike(at, distance_km).await;

        // Storm visibility shouldn't wait for the next sensor cycle;
        // reclassify against the latest reading if one exists.
        match self.store.latest().await {
            Ok(Some(latest)) => {
                self.refresh_scene(latest).await;
            }
            Ok(None) => {}
            Err(e) => warn!("skipping scene refresh after strike: {}", e),
        }

        Ok(StrikeAck {
            status: "ok",
            last_strike_at: at.to_rfc3339(),
            distance_km,
        })
    }

    /// Re-resolve the station position. The resolver must produce a timezone
    /// and sun times; a missing place name only degrades the display text.
    pub async fn update_position(
        &self,
        fields: &HashMap<String, String>,
    ) -> Result<PositionAck, ApiError> {
        self.authorize(fields)?;

        let latitude = required_field(fields, "latitude")?.to_string();
        let longitude = required_field(fields, "longitude")?.to_string();

        let resolved = self.resolver.resolve(&latitude, &longitude).await?;
        let place_name = resolved
            .place_name
            .unwrap_or_else(|| format!("{}, {}", latitude, longitude));

        self.state
            .set_location(LocationState {
                latitude,
                longitude,
                place_name: place_name.clone(),
                timezone: resolved.timezone,
                sunrise_utc: resolved.sunrise_utc,
                sunset_utc: resolved.sunset_utc,
            })
            .await;

        info!(
            "station position updated: {} ({})",
            place_name, resolved.timezone
        );

        Ok(PositionAck {
            status: "ok",
            place_name,
            timezone: resolved.timezone.name().to_string(),
        })
    }

    fn authorize(&self, fields: &HashMap<String, String>) -> Result<(), ApiError> {
        let credential = required_field(fields, "credential")?;
        if !auth::verify_credential(credential, &self.credential_digest) {
            return Err(ApiError::Auth);
        }
        Ok(())
    }

    /// Classify the committed observation and swap the displayed scene if it
    /// changed. Runs after the write; problems here are logged, never
    /// surfaced to the sensor.
    async fn refresh_scene(&self, observation: crate::db::Observation) -> Scene {
        let lightning = self.state.lightning().await;
        let location = self.state.location().await;

        let next = scene::classify(&observation, &lightning, &location);
        if self.state.swap_scene(next).await {
            info!("scene changed to {} ({})", next, next.asset());
        }
        next
    }
}

fn required_field<'a>(
    fields: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, ApiError> {
    fields
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::MissingField(name.to_string()))
}

fn numeric_field(fields: &HashMap<String, String>, name: &str) -> Result<f64, ApiError> {
    let raw = required_field(fields, name)?;
    raw.parse::<f64>().map_err(|_| ApiError::InvalidValue {
        field: name.to_string(),
        value: raw.to_string(),
    })
}
