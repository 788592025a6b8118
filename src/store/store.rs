//! Main store implementation.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::models::{
    SearchHistoryEntry, StoredLocation, WeatherRecord, WeatherRecordDraft, WeatherRecordUpdate,
};
use crate::{Result, SkycastError};

use super::schema;

/// SQLite-based store for locations, weather records, and search history.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // === Location operations ===

    /// Save a new location. Duplicate (name, lat, lon) triples are rejected.
    pub fn insert_location(&self, name: &str, lat: f64, lon: f64) -> Result<StoredLocation> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM locations WHERE name = ?1 AND lat = ?2 AND lon = ?3",
                params![name, lat, lon],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Err(SkycastError::conflict("Location already exists"));
        }

        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO locations (name, lat, lon, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, lat, lon, created_at.timestamp()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Saved location {} ({})", name, id);

        Ok(StoredLocation {
            id,
            name: name.to_string(),
            lat,
            lon,
            created_at,
        })
    }

    /// All saved locations, newest first.
    pub fn all_locations(&self) -> Result<Vec<StoredLocation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, lat, lon, created_at FROM locations ORDER BY created_at DESC",
        )?;
        let locations = stmt
            .query_map([], map_location)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(locations)
    }

    /// Find a location by ID.
    pub fn find_location(&self, id: i64) -> Result<Option<StoredLocation>> {
        let location = self
            .conn
            .query_row(
                "SELECT id, name, lat, lon, created_at FROM locations WHERE id = ?1",
                [id],
                map_location,
            )
            .optional()?;
        Ok(location)
    }

    /// Find the first location whose name contains the given fragment,
    /// case-insensitively.
    pub fn find_location_by_name(&self, fragment: &str) -> Result<Option<StoredLocation>> {
        let location = self
            .conn
            .query_row(
                "SELECT id, name, lat, lon, created_at FROM locations
                 WHERE name LIKE '%' || ?1 || '%' ORDER BY id LIMIT 1",
                [fragment],
                map_location,
            )
            .optional()?;
        Ok(location)
    }

    /// Update a location. Returns the updated row, or `None` if it does not exist.
    pub fn update_location(
        &self,
        id: i64,
        name: &str,
        lat: f64,
        lon: f64,
    ) -> Result<Option<StoredLocation>> {
        let changed = self.conn.execute(
            "UPDATE locations SET name = ?2, lat = ?3, lon = ?4 WHERE id = ?1",
            params![id, name, lat, lon],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.find_location(id)
    }

    /// Delete a location together with its weather records.
    pub fn delete_location(&self, id: i64) -> Result<bool> {
        self.conn.execute(
            "DELETE FROM weather_records WHERE location_id = ?1",
            [id],
        )?;
        let deleted = self.conn.execute("DELETE FROM locations WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    // === Weather record operations ===

    /// Persist a weather observation for a stored location.
    pub fn insert_weather_record(&self, draft: &WeatherRecordDraft) -> Result<WeatherRecord> {
        let date = Utc::now();
        self.conn.execute(
            "INSERT INTO weather_records
                (location_id, date, temperature, humidity, pressure, wind_speed, description, icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                draft.location_id,
                date.timestamp(),
                draft.temperature,
                draft.humidity,
                draft.pressure,
                draft.wind_speed,
                draft.description,
                draft.icon,
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        Ok(WeatherRecord {
            id,
            location_id: draft.location_id,
            date,
            temperature: draft.temperature,
            humidity: draft.humidity,
            pressure: draft.pressure,
            wind_speed: draft.wind_speed,
            description: draft.description.clone(),
            icon: draft.icon.clone(),
        })
    }

    /// All weather records for a location, newest first.
    pub fn weather_records_for(&self, location_id: i64) -> Result<Vec<WeatherRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, location_id, date, temperature, humidity, pressure, wind_speed,
                    description, icon
             FROM weather_records WHERE location_id = ?1 ORDER BY date DESC",
        )?;
        let records = stmt
            .query_map([location_id], map_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Find a weather record by ID.
    pub fn find_weather_record(&self, id: i64) -> Result<Option<WeatherRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, location_id, date, temperature, humidity, pressure, wind_speed,
                        description, icon
                 FROM weather_records WHERE id = ?1",
                [id],
                map_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Apply a partial update to a weather record. Absent fields keep their
    /// stored value. Returns the updated row, or `None` if it does not exist.
    pub fn update_weather_record(
        &self,
        id: i64,
        update: &WeatherRecordUpdate,
    ) -> Result<Option<WeatherRecord>> {
        let Some(existing) = self.find_weather_record(id)? else {
            return Ok(None);
        };

        let merged = WeatherRecord {
            temperature: update.temperature.unwrap_or(existing.temperature),
            humidity: update.humidity.or(existing.humidity),
            pressure: update.pressure.or(existing.pressure),
            wind_speed: update.wind_speed.or(existing.wind_speed),
            description: update.description.clone().or(existing.description),
            icon: update.icon.clone().or(existing.icon),
            ..existing
        };

        self.conn.execute(
            "UPDATE weather_records
             SET temperature = ?2, humidity = ?3, pressure = ?4, wind_speed = ?5,
                 description = ?6, icon = ?7
             WHERE id = ?1",
            params![
                id,
                merged.temperature,
                merged.humidity,
                merged.pressure,
                merged.wind_speed,
                merged.description,
                merged.icon,
            ],
        )?;

        Ok(Some(merged))
    }

    /// Delete a weather record.
    pub fn delete_weather_record(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM weather_records WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    // === Search history operations ===

    /// All search history entries, most recent first.
    pub fn all_history(&self) -> Result<Vec<SearchHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, lat, lon, last_searched, search_count
             FROM search_history ORDER BY last_searched DESC",
        )?;
        let entries = stmt
            .query_map([], map_history)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Record a search: bump the repeat count and recency of an exact
    /// (name, lat, lon) match, or insert a fresh entry with count 1.
    pub fn record_search(&self, name: &str, lat: f64, lon: f64) -> Result<SearchHistoryEntry> {
        let now = Utc::now();
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM search_history WHERE name = ?1 AND lat = ?2 AND lon = ?3",
                params![name, lat, lon],
                |row| row.get(0),
            )
            .optional()?;

        let id = if let Some(id) = existing {
            self.conn.execute(
                "UPDATE search_history
                 SET last_searched = ?2, search_count = search_count + 1
                 WHERE id = ?1",
                params![id, now.timestamp()],
            )?;
            id
        } else {
            self.conn.execute(
                "INSERT INTO search_history (name, lat, lon, last_searched, search_count)
                 VALUES (?1, ?2, ?3, ?4, 1)",
                params![name, lat, lon, now.timestamp()],
            )?;
            self.conn.last_insert_rowid()
        };

        let entry = self
            .conn
            .query_row(
                "SELECT id, name, lat, lon, last_searched, search_count
                 FROM search_history WHERE id = ?1",
                [id],
                map_history,
            )
            .optional()?
            .ok_or_else(|| SkycastError::not_found("Search record not found"))?;
        Ok(entry)
    }

    /// History entries whose name contains the given fragment,
    /// case-insensitively, most recent first.
    pub fn history_matching(&self, fragment: &str) -> Result<Vec<SearchHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, lat, lon, last_searched, search_count
             FROM search_history WHERE name LIKE '%' || ?1 || '%'
             ORDER BY last_searched DESC",
        )?;
        let entries = stmt
            .query_map([fragment], map_history)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// The most recent history entries for an exact location name.
    pub fn recent_history(&self, name: &str, limit: u32) -> Result<Vec<SearchHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, lat, lon, last_searched, search_count
             FROM search_history WHERE name = ?1 COLLATE NOCASE
             ORDER BY last_searched DESC LIMIT ?2",
        )?;
        let entries = stmt
            .query_map(params![name, limit], map_history)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Delete a search history entry.
    pub fn delete_history(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM search_history WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn map_location(row: &Row<'_>) -> rusqlite::Result<StoredLocation> {
    Ok(StoredLocation {
        id: row.get(0)?,
        name: row.get(1)?,
        lat: row.get(2)?,
        lon: row.get(3)?,
        created_at: timestamp(row.get(4)?),
    })
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<WeatherRecord> {
    Ok(WeatherRecord {
        id: row.get(0)?,
        location_id: row.get(1)?,
        date: timestamp(row.get(2)?),
        temperature: row.get(3)?,
        humidity: row.get(4)?,
        pressure: row.get(5)?,
        wind_speed: row.get(6)?,
        description: row.get(7)?,
        icon: row.get(8)?,
    })
}

fn map_history(row: &Row<'_>) -> rusqlite::Result<SearchHistoryEntry> {
    Ok(SearchHistoryEntry {
        id: row.get(0)?,
        name: row.get(1)?,
        lat: row.get(2)?,
        lon: row.get(3)?,
        last_searched: timestamp(row.get(4)?),
        search_count: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(location_id: i64, temperature: f64) -> WeatherRecordDraft {
        WeatherRecordDraft {
            location_id,
            temperature,
            humidity: None,
            pressure: None,
            wind_speed: None,
            description: None,
            icon: None,
        }
    }

    #[test]
    fn test_insert_and_find_location() {
        let store = Store::open_in_memory().unwrap();
        let saved = store.insert_location("Paris", 48.85, 2.35).unwrap();

        let found = store.find_location(saved.id).unwrap().unwrap();
        assert_eq!(found.name, "Paris");
        assert_eq!(found.lat, 48.85);

        assert!(store.find_location(9999).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_location_is_conflict() {
        let store = Store::open_in_memory().unwrap();
        store.insert_location("Paris", 48.85, 2.35).unwrap();
        let result = store.insert_location("Paris", 48.85, 2.35);
        assert!(matches!(result, Err(SkycastError::Conflict { .. })));
    }

    #[test]
    fn test_location_substring_match_is_case_insensitive() {
        let store = Store::open_in_memory().unwrap();
        store.insert_location("New York City", -74.0, 40.7).unwrap();

        let hit = store.find_location_by_name("york").unwrap();
        assert_eq!(hit.unwrap().name, "New York City");

        assert!(store.find_location_by_name("berlin").unwrap().is_none());
    }

    #[test]
    fn test_update_and_delete_location() {
        let store = Store::open_in_memory().unwrap();
        let saved = store.insert_location("Pari", 48.0, 2.0).unwrap();

        let updated = store
            .update_location(saved.id, "Paris", 48.85, 2.35)
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Paris");

        assert!(store.update_location(9999, "X", 0.0, 0.0).unwrap().is_none());

        assert!(store.delete_location(saved.id).unwrap());
        assert!(!store.delete_location(saved.id).unwrap());
    }

    #[test]
    fn test_weather_records_come_back_newest_first() {
        let store = Store::open_in_memory().unwrap();
        let location = store.insert_location("Paris", 48.85, 2.35).unwrap();

        store.insert_weather_record(&draft(location.id, 10.0)).unwrap();
        store.insert_weather_record(&draft(location.id, 20.0)).unwrap();

        // Same-second inserts; force distinct dates for the ordering check
        store
            .conn
            .execute(
                "UPDATE weather_records SET date = date - id",
                [],
            )
            .unwrap();

        let records = store.weather_records_for(location.id).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].date >= records[1].date);
        assert_eq!(records[0].temperature, 10.0);
    }

    #[test]
    fn test_weather_record_partial_update() {
        let store = Store::open_in_memory().unwrap();
        let location = store.insert_location("Paris", 48.85, 2.35).unwrap();
        let mut record_draft = draft(location.id, 15.0);
        record_draft.humidity = Some(70);
        let record = store.insert_weather_record(&record_draft).unwrap();

        let update = WeatherRecordUpdate {
            temperature: Some(16.5),
            description: Some("light rain".to_string()),
            ..Default::default()
        };
        let updated = store
            .update_weather_record(record.id, &update)
            .unwrap()
            .unwrap();

        assert_eq!(updated.temperature, 16.5);
        assert_eq!(updated.humidity, Some(70));
        assert_eq!(updated.description.as_deref(), Some("light rain"));

        assert!(store
            .update_weather_record(9999, &WeatherRecordUpdate::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_delete_location_cascades_to_records() {
        let store = Store::open_in_memory().unwrap();
        let location = store.insert_location("Paris", 48.85, 2.35).unwrap();
        store.insert_weather_record(&draft(location.id, 12.0)).unwrap();

        assert!(store.delete_location(location.id).unwrap());
        assert!(store.weather_records_for(location.id).unwrap().is_empty());
    }

    #[test]
    fn test_record_search_bumps_count_on_repeat() {
        let store = Store::open_in_memory().unwrap();

        let first = store.record_search("Paris", 48.85, 2.35).unwrap();
        assert_eq!(first.search_count, 1);

        let second = store.record_search("Paris", 48.85, 2.35).unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.search_count, 2);

        // Different coordinates make a distinct entry
        let other = store.record_search("Paris", 48.0, 2.0).unwrap();
        assert_ne!(other.id, first.id);
        assert_eq!(other.search_count, 1);
    }

    #[test]
    fn test_history_matching_and_recent() {
        let store = Store::open_in_memory().unwrap();
        store.record_search("Paris", 48.85, 2.35).unwrap();
        store.record_search("Parintins", -2.6, -56.7).unwrap();
        store.record_search("Berlin", 52.5, 13.4).unwrap();

        let matches = store.history_matching("pari").unwrap();
        assert_eq!(matches.len(), 2);

        let recent = store.recent_history("paris", 5).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "Paris");
    }

    #[test]
    fn test_recent_history_respects_limit() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..8 {
            // Distinct coordinates so each search is its own entry
            store.record_search("Paris", 48.0 + f64::from(i), 2.35).unwrap();
        }

        let recent = store.recent_history("Paris", 5).unwrap();
        assert_eq!(recent.len(), 5);
    }

    #[test]
    fn test_delete_history() {
        let store = Store::open_in_memory().unwrap();
        let entry = store.record_search("Paris", 48.85, 2.35).unwrap();

        assert!(store.delete_history(entry.id).unwrap());
        assert!(!store.delete_history(entry.id).unwrap());
        assert!(store.all_history().unwrap().is_empty());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("skycast.db");
        let store = Store::open(&path).unwrap();
        store.insert_location("Paris", 48.85, 2.35).unwrap();
        drop(store);

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.all_locations().unwrap().len(), 1);
    }
}
