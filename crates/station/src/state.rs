//! Process-lifetime mutable station state.
//!
//! Position, lightning history, and the displayed scene live here rather
//! than in the database; a restart resets them to defaults and the next
//! sensor cycle repopulates them. The state object is owned by `AppState`
//! and injected into the services, with one lock per singleton held only
//! across the read-modify-write.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::RwLock;

use crate::scene::Scene;

/// Sentinel distance meaning "no strike anywhere near", in km.
pub const DISTANT_STRIKE_KM: f64 = 9999.0;

/// Station position and the sun times that go with it. Replaced wholesale by
/// a position update; sunrise/sunset always describe the update's day.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationState {
    pub latitude: String,
    pub longitude: String,
    pub place_name: String,
    pub timezone: Tz,
    pub sunrise_utc: DateTime<Utc>,
    pub sunset_utc: DateTime<Utc>,
}

impl LocationState {
    fn initial(timezone: Tz) -> Self {
        Self {
            latitude: String::from("40.7128"),
            longitude: String::from("-74.0060"),
            place_name: String::from("New York, NY"),
            timezone,
            // Epoch sun times classify everything as night until the first
            // position update brings real ones.
            sunrise_utc: DateTime::UNIX_EPOCH,
            sunset_utc: DateTime::UNIX_EPOCH,
        }
    }
}

/// Most recent lightning report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightningState {
    pub last_strike_at: DateTime<Utc>,
    pub last_strike_distance_km: f64,
}

impl Default for LightningState {
    fn default() -> Self {
        Self {
            last_strike_at: DateTime::UNIX_EPOCH,
            last_strike_distance_km: DISTANT_STRIKE_KM,
        }
    }
}

pub struct StationState {
    location: RwLock<LocationState>,
    lightning: RwLock<LightningState>,
    scene: RwLock<Scene>,
}

impl StationState {
    pub fn new(display_zone: Tz) -> Self {
        Self {
            location: RwLock::new(LocationState::initial(display_zone)),
            lightning: RwLock::new(LightningState::default()),
            scene: RwLock::new(Scene::Night),
        }
    }

    pub async fn location(&self) -> LocationState {
        self.location.read().await.clone()
    }

    pub async fn set_location(&self, next: LocationState) {
        *self.location.write().await = next;
    }

    pub async fn lightning(&self) -> LightningState {
        *self.lightning.read().await
    }

    /// Overwrite the strike record unconditionally; reports arrive in order.
    pub async fn record_strike(&self, at: DateTime<Utc>, distance_km: f64) {
        *self.lightning.write().await = LightningState {
            last_strike_at: at,
            last_strike_distance_km: distance_km,
        };
    }

    pub async fn current_scene(&self) -> Scene {
        *self.scene.read().await
    }

    /// Swap the displayed scene, returning true only when it changed so the
    /// caller can skip redundant asset writes.
    pub async fn swap_scene(&self, next: Scene) -> bool {
        let mut scene = self.scene.write().await;
        if *scene == next {
            return false;
        }
        *scene = next;
        true
    }
}
