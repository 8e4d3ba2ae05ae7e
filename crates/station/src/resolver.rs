//! External geocoding / timezone / sun-times lookup.
//!
//! Position updates hand coordinates to a resolver and get back everything
//! the station needs to localize itself: an IANA timezone, today's sunrise
//! and sunset, and (best effort) a human-readable place name. The HTTP
//! implementation talks to Open-Meteo for the timezone and sun times and to
//! Nominatim for the reverse-geocoded name; the trait exists so tests can
//! substitute a mock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::warn;
use serde::Deserialize;
use std::time::Duration;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REVERSE_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Bound on every resolver HTTP call.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("location lookup timed out")]
    Timeout,
    #[error("location lookup failed: {0}")]
    Http(String),
    #[error("location response missing {0}")]
    MissingData(&'static str),
    #[error("unrecognized timezone: {0}")]
    UnknownTimezone(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Http(err.to_string())
        }
    }
}

/// What a successful lookup yields. Timezone and sun times are required for
/// correctness; the place name is cosmetic and may be absent.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    pub place_name: Option<String>,
    pub timezone: Tz,
    pub sunrise_utc: DateTime<Utc>,
    pub sunset_utc: DateTime<Utc>,
}

#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self, latitude: &str, longitude: &str) -> Result<ResolvedLocation, Error>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: Option<String>,
    daily: Option<DailySunTimes>,
}

#[derive(Debug, Deserialize)]
struct DailySunTimes {
    sunrise: Vec<i64>,
    sunset: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    display_name: Option<String>,
}

pub struct HttpResolver {
    client: reqwest::Client,
    forecast_url: String,
    reverse_geocode_url: String,
}

impl HttpResolver {
    pub fn new() -> Result<Self, Error> {
        Self::with_urls(FORECAST_URL, REVERSE_GEOCODE_URL)
    }

    pub fn with_urls(forecast_url: &str, reverse_geocode_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(RESOLVE_TIMEOUT)
            .user_agent(format!("piwx/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            forecast_url: forecast_url.to_string(),
            reverse_geocode_url: reverse_geocode_url.to_string(),
        })
    }

    /// Timezone plus today's sun times, as unix seconds so no local-time
    /// parsing is involved.
    async fn sun_times(&self, latitude: &str, longitude: &str) -> Result<ResolvedLocation, Error> {
        let response: ForecastResponse = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude),
                ("longitude", longitude),
                ("daily", "sunrise,sunset"),
                ("timezone", "auto"),
                ("timeformat", "unixtime"),
                ("forecast_days", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tz_name = response.timezone.ok_or(Error::MissingData("timezone"))?;
        let timezone: Tz = tz_name
            .parse()
            .map_err(|_| Error::UnknownTimezone(tz_name))?;

        let daily = response.daily.ok_or(Error::MissingData("sun times"))?;
        let sunrise = daily
            .sunrise
            .first()
            .and_then(|s| DateTime::from_timestamp(*s, 0))
            .ok_or(Error::MissingData("sunrise"))?;
        let sunset = daily
            .sunset
            .first()
            .and_then(|s| DateTime::from_timestamp(*s, 0))
            .ok_or(Error::MissingData("sunset"))?;

        Ok(ResolvedLocation {
            place_name: None,
            timezone,
            sunrise_utc: sunrise,
            sunset_utc: sunset,
        })
    }

    /// Reverse-geocoded display name. Failures here never fail the update.
    async fn place_name(&self, latitude: &str, longitude: &str) -> Option<String> {
        let result = self
            .client
            .get(&self.reverse_geocode_url)
            .query(&[("format", "jsonv2"), ("lat", latitude), ("lon", longitude)])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(response) => match response.json::<ReverseGeocodeResponse>().await {
                Ok(body) => body.display_name,
                Err(e) => {
                    warn!("reverse geocode response unreadable: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("reverse geocode lookup failed: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl LocationResolver for HttpResolver {
    async fn resolve(&self, latitude: &str, longitude: &str) -> Result<ResolvedLocation, Error> {
        let mut resolved = self.sun_times(latitude, longitude).await?;
        resolved.place_name = self.place_name(latitude, longitude).await;
        Ok(resolved)
    }
}
