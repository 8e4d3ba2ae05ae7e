//! Display-scene classification.
//!
//! Each committed observation selects one of five scenes, checked in strict
//! priority order: an active nearby storm trumps rain, rain trumps the
//! sunset window, and day/night fall out of the stored sun times. The result
//! picks a background asset; callers swap the asset only when the selection
//! changes.

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::Observation;
use crate::state::{LightningState, LocationState};

/// A strike counts toward the storm scene for this long.
pub const STORM_RECENCY_SECONDS: i64 = 30 * 60;

/// ...and from at most this far away.
pub const STORM_DISTANCE_KM: f64 = 30.0;

/// Precipitation rate at which the rain scene kicks in, mm/hr.
pub const RAIN_RATE_MM_HR: f64 = 1.0;

/// Half-width of the sunset window, seconds either side of sunset.
pub const SUNSET_WINDOW_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scene {
    Storm,
    Rain,
    Sunset,
    Day,
    Night,
}

impl Scene {
    /// Background asset name the viewer swaps in for this scene.
    pub fn asset(&self) -> &'static str {
        match self {
            Scene::Storm => "bg_storm.png",
            Scene::Rain => "bg_rain.png",
            Scene::Sunset => "bg_sunset.png",
            Scene::Day => "bg_day.png",
            Scene::Night => "bg_night.png",
        }
    }
}

impl std::fmt::Display for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scene::Storm => "storm",
            Scene::Rain => "rain",
            Scene::Sunset => "sunset",
            Scene::Day => "day",
            Scene::Night => "night",
        };
        write!(f, "{}", name)
    }
}

/// Classify an observation against the current lightning and location state.
/// Pure: identical inputs always select the identical scene.
pub fn classify(
    observation: &Observation,
    lightning: &LightningState,
    location: &LocationState,
) -> Scene {
    let t = observation.recorded_at;

    let strike_age = (t - lightning.last_strike_at).num_seconds().abs();
    if strike_age <= STORM_RECENCY_SECONDS && lightning.last_strike_distance_km <= STORM_DISTANCE_KM
    {
        return Scene::Storm;
    }

    if observation.precip_rate >= RAIN_RATE_MM_HR {
        return Scene::Rain;
    }

    if (t - location.sunset_utc).num_seconds().abs() <= SUNSET_WINDOW_SECONDS {
        return Scene::Sunset;
    }

    if location.sunrise_utc <= t && t <= location.sunset_utc {
        return Scene::Day;
    }

    Scene::Night
}
