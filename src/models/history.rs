//! Search history model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record of a past location search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    /// Database row ID
    pub id: i64,
    /// Searched location name
    pub name: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// When this location was last searched
    pub last_searched: DateTime<Utc>,
    /// How many times this location has been searched, at least 1
    pub search_count: u32,
}
