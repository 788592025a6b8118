//! Data models for the `SkyCast` service
//!
//! This module contains the core domain models organized by concern:
//! - Location: Stored locations with coordinates
//! - Weather: Exportable weather snapshots and persisted weather records
//! - History: Search history entries with recency and repeat counts

pub mod history;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use history::SearchHistoryEntry;
pub use location::StoredLocation;
pub use weather::{WeatherRecord, WeatherRecordDraft, WeatherRecordUpdate, WeatherSnapshot};
