//! `SkyCast` - Weather lookup and history web service
//!
//! This library provides the REST backend for weather lookup, stored
//! locations, search history, and the multi-format weather-report export
//! pipeline (PDF/CSV/XML/Markdown/JSON).

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod store;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::SkycastConfig;
pub use error::SkycastError;
pub use export::{ExportFormat, ExportResult, WeatherReport};
pub use models::{SearchHistoryEntry, StoredLocation, WeatherRecord, WeatherSnapshot};
pub use store::Store;
pub use weather::{OpenWeatherClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkycastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
