//! Stored location model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A location saved by the user
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredLocation {
    /// Database row ID
    pub id: i64,
    /// Location name (city, region, etc.)
    pub name: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// When this location was saved
    pub created_at: DateTime<Utc>,
}

impl StoredLocation {
    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{}, {}", self.lat, self.lon)
    }
}
