//! Upstream weather API client
//!
//! HTTP client for retrieving current conditions and forecasts from an
//! OpenWeatherMap-compatible API. The API key and base URL are explicit
//! construction-time configuration, never ambient process state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::WeatherConfig;
use crate::models::WeatherSnapshot;
use crate::{Result, SkycastError};

/// A place to look up weather for: either coordinates or a free-form name.
#[derive(Debug, Clone)]
pub enum PlaceQuery {
    /// Latitude/longitude pair
    Coords { lat: f64, lon: f64 },
    /// Location name (city, region, etc.)
    Name(String),
}

impl PlaceQuery {
    /// Render as upstream query-string parameters.
    fn to_query(&self) -> String {
        match self {
            PlaceQuery::Coords { lat, lon } => format!("lat={lat}&lon={lon}"),
            PlaceQuery::Name(name) => format!("q={}", urlencoding::encode(name)),
        }
    }
}

/// Capability of fetching live weather data.
///
/// The report assembler and the lookup handlers depend on this trait so that
/// tests can substitute a canned provider.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for a place, normalized to a [`WeatherSnapshot`].
    async fn current(&self, place: &PlaceQuery) -> Result<WeatherSnapshot>;

    /// Forecast for a place, passed through as the upstream JSON document.
    async fn forecast(&self, place: &PlaceQuery, days: u8) -> Result<Value>;
}

/// Weather API client for OpenWeatherMap-compatible endpoints
pub struct OpenWeatherClient {
    /// HTTP client
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
    /// API key appended to every request
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a new weather API client from explicit configuration.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            SkycastError::config("Weather API key is required to fetch live weather data")
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("SkyCast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SkycastError::upstream(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn request(&self, url: &str) -> Result<reqwest::Response> {
        debug!("Upstream request: {}", url.split("appid=").next().unwrap_or(url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SkycastError::upstream(format!("Request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        warn!("Upstream returned status {status}");
        Err(status_error(status))
    }
}

/// Map an upstream error status to a service error. A 400 from the source is
/// reported as not-found for compatibility, even though it also covers
/// malformed queries.
fn status_error(status: reqwest::StatusCode) -> SkycastError {
    if status.as_u16() == 400 {
        SkycastError::not_found("Location not found")
    } else {
        SkycastError::upstream(format!("Request failed with status {status}"))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, place: &PlaceQuery) -> Result<WeatherSnapshot> {
        let url = format!(
            "{}/weather?{}&units=metric&appid={}",
            self.base_url,
            place.to_query(),
            self.api_key
        );

        let response = self.request(&url).await?;
        let current: openweather::CurrentResponse = response
            .json()
            .await
            .map_err(|e| SkycastError::upstream(format!("Invalid weather response: {e}")))?;

        Ok(current.into_snapshot())
    }

    #[instrument(skip(self))]
    async fn forecast(&self, place: &PlaceQuery, days: u8) -> Result<Value> {
        // The forecast endpoint returns 3-hour steps, 8 per day
        let url = format!(
            "{}/forecast?{}&cnt={}&units=metric&appid={}",
            self.base_url,
            place.to_query(),
            u32::from(days) * 8,
            self.api_key
        );

        let response = self.request(&url).await?;
        response
            .json()
            .await
            .map_err(|e| SkycastError::upstream(format!("Invalid forecast response: {e}")))
    }
}

/// Upstream API response structures and conversion utilities
mod openweather {
    use chrono::Utc;
    use serde::Deserialize;

    use crate::models::WeatherSnapshot;

    /// Current conditions response
    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub name: String,
        pub sys: Sys,
        pub coord: Coord,
        pub main: MainData,
        pub wind: Wind,
        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Sys {
        #[serde(default)]
        pub country: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Coord {
        pub lat: f64,
        pub lon: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainData {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: u8,
        pub pressure: u32,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
        pub icon: String,
    }

    impl CurrentResponse {
        /// Flatten the nested upstream document into an exportable snapshot.
        pub fn into_snapshot(self) -> WeatherSnapshot {
            let condition = self.weather.into_iter().next();
            WeatherSnapshot {
                location: self.name,
                country: self.sys.country.unwrap_or_default(),
                lat: self.coord.lat,
                lon: self.coord.lon,
                temperature: self.main.temp,
                feels_like: self.main.feels_like,
                humidity: self.main.humidity,
                pressure: self.main.pressure,
                wind_speed: self.wind.speed,
                description: condition
                    .as_ref()
                    .map(|c| c.description.clone())
                    .unwrap_or_default(),
                icon: condition.map(|c| c.icon).unwrap_or_default(),
                timestamp: Utc::now(),
            }
        }
    }
}
