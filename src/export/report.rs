//! Report assembly: resolve a location query into an exportable report.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::models::{SearchHistoryEntry, WeatherRecord, WeatherSnapshot};
use crate::store::Store;
use crate::weather::{PlaceQuery, WeatherProvider};
use crate::{Result, SkycastError};

/// Maximum number of history entries included in a report
const HISTORY_LIMIT: u32 = 5;

/// A location to build a report for
#[derive(Debug, Clone)]
pub enum ReportQuery {
    /// A stored location by ID
    LocationId(i64),
    /// A location name, matched against stored locations then search history
    LocationName(String),
    /// Raw coordinates, resolved by the upstream API alone
    Coordinates { lat: f64, lon: f64 },
}

/// Everything a format renderer needs: the normalized snapshot plus the
/// stored history and weather records for the resolved location.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    /// Current conditions, normalized into the flat export record
    pub snapshot: WeatherSnapshot,
    /// Up to five most recent search-history entries for this location
    pub history: Vec<SearchHistoryEntry>,
    /// Stored weather records for this location, newest first
    pub records: Vec<WeatherRecord>,
}

/// Builds weather reports from stored data plus live upstream conditions.
pub struct ReportAssembler {
    store: Arc<Mutex<Store>>,
    provider: Arc<dyn WeatherProvider>,
}

impl ReportAssembler {
    /// Create an assembler over the given store and upstream provider.
    pub fn new(store: Arc<Mutex<Store>>, provider: Arc<dyn WeatherProvider>) -> Self {
        Self { store, provider }
    }

    /// Resolve a query to a report.
    ///
    /// Resolution is a linear fallback chain, first satisfied branch wins:
    /// stored location by ID, stored location by name fragment, search
    /// history by name fragment, then `NotFound`. Raw coordinates skip the
    /// stores entirely. The resolved place is then passed to the upstream
    /// provider for current conditions.
    #[instrument(skip(self))]
    pub async fn assemble(&self, query: &ReportQuery) -> Result<WeatherReport> {
        let (place, resolved_name, records) = self.resolve(query).await?;

        let mut snapshot = self.provider.current(&place).await?;

        // A stored or remembered name takes precedence over whatever the
        // upstream reverse lookup calls the coordinates.
        if let Some(name) = resolved_name {
            snapshot.location = name;
        }

        if snapshot.location.is_empty() {
            return Err(SkycastError::render(
                "Snapshot has no location name; refusing to hand it to a renderer",
            ));
        }

        let history = {
            let store = self.store.lock().await;
            store.recent_history(&snapshot.location, HISTORY_LIMIT)?
        };

        debug!(
            location = %snapshot.location,
            history = history.len(),
            records = records.len(),
            "Assembled weather report"
        );

        Ok(WeatherReport {
            snapshot,
            history,
            records,
        })
    }

    async fn resolve(
        &self,
        query: &ReportQuery,
    ) -> Result<(PlaceQuery, Option<String>, Vec<WeatherRecord>)> {
        let store = self.store.lock().await;

        match query {
            ReportQuery::LocationId(id) => {
                let location = store
                    .find_location(*id)?
                    .ok_or_else(|| SkycastError::not_found("Location not found"))?;
                let records = store.weather_records_for(location.id)?;
                Ok((
                    PlaceQuery::Coords {
                        lat: location.lat,
                        lon: location.lon,
                    },
                    Some(location.name),
                    records,
                ))
            }
            ReportQuery::LocationName(name) => {
                if let Some(location) = store.find_location_by_name(name)? {
                    let records = store.weather_records_for(location.id)?;
                    return Ok((
                        PlaceQuery::Coords {
                            lat: location.lat,
                            lon: location.lon,
                        },
                        Some(location.name),
                        records,
                    ));
                }

                // The name never made it into the locations table; fall back
                // to the most recent matching search.
                if let Some(entry) = store.history_matching(name)?.into_iter().next() {
                    debug!("Resolved '{}' via search history", name);
                    return Ok((
                        PlaceQuery::Coords {
                            lat: entry.lat,
                            lon: entry.lon,
                        },
                        Some(entry.name),
                        Vec::new(),
                    ));
                }

                Err(SkycastError::not_found("Location not found"))
            }
            ReportQuery::Coordinates { lat, lon } => Ok((
                PlaceQuery::Coords {
                    lat: *lat,
                    lon: *lon,
                },
                None,
                Vec::new(),
            )),
        }
    }
}
