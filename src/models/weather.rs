//! Weather snapshot and weather record models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single normalized weather observation ready for export.
///
/// Field order here is the export field order: CSV columns and XML child
/// elements are emitted in exactly this sequence.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Location name
    pub location: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Atmospheric pressure in hPa
    pub pressure: u32,
    /// Wind speed in the unit supplied by the upstream source
    pub wind_speed: f64,
    /// Human-readable description of conditions
    pub description: String,
    /// Weather condition icon reference from the upstream API
    pub icon: String,
    /// When this snapshot was assembled
    pub timestamp: DateTime<Utc>,
}

/// A weather observation persisted for a stored location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    /// Database row ID
    pub id: i64,
    /// Stored location this record belongs to
    pub location_id: i64,
    /// When the observation was taken
    pub date: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity percentage, when recorded
    pub humidity: Option<u8>,
    /// Atmospheric pressure in hPa, when recorded
    pub pressure: Option<u32>,
    /// Wind speed, when recorded
    pub wind_speed: Option<f64>,
    /// Description of conditions, when recorded
    pub description: Option<String>,
    /// Icon reference, when recorded
    pub icon: Option<String>,
}

/// Fields accepted when creating a weather record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecordDraft {
    /// Stored location the record belongs to
    pub location_id: i64,
    /// Temperature in Celsius
    pub temperature: f64,
    #[serde(default)]
    pub humidity: Option<u8>,
    #[serde(default)]
    pub pressure: Option<u32>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Partial update for a weather record; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecordUpdate {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<u8>,
    #[serde(default)]
    pub pressure: Option<u32>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            location: "Paris".to_string(),
            country: "FR".to_string(),
            lat: 48.85,
            lon: 2.35,
            temperature: 18.2,
            feels_like: 17.8,
            humidity: 60,
            pressure: 1012,
            wind_speed: 12.0,
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_json_round_trip_is_stable() {
        let snapshot = sample_snapshot();
        let first = serde_json::to_string(&snapshot).unwrap();
        let parsed: WeatherSnapshot = serde_json::from_str(&first).unwrap();
        let second = serde_json::to_string(&parsed).unwrap();
        assert_eq!(first, second);
        assert_eq!(snapshot, parsed);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = WeatherRecord {
            id: 1,
            location_id: 7,
            date: Utc::now(),
            temperature: 21.5,
            humidity: Some(55),
            pressure: None,
            wind_speed: Some(3.2),
            description: Some("overcast".to_string()),
            icon: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("locationId").is_some());
        assert!(json.get("windSpeed").is_some());
    }
}
