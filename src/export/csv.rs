//! CSV renderer: one header row, one data row, same field order.

use crate::models::WeatherSnapshot;
use crate::{Result, SkycastError};

use super::{ExportResult, filename_stem};

/// Render a snapshot as CSV.
///
/// The header row comes from the snapshot's field names in declaration
/// order, so header and data always have matching columns.
pub fn render(snapshot: &WeatherSnapshot) -> Result<ExportResult> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .serialize(snapshot)
        .map_err(|e| SkycastError::render(format!("CSV serialization failed: {e}")))?;
    let body = writer
        .into_inner()
        .map_err(|e| SkycastError::render(format!("CSV flush failed: {e}")))?;

    Ok(ExportResult {
        content_type: "text/csv",
        filename: Some(format!("{}_weather.csv", filename_stem(&snapshot.location))),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot() -> WeatherSnapshot {
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
    fn test_csv_header_matches_export_field_order() {
        let result = render(&snapshot()).unwrap();
        let text = String::from_utf8(result.body).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "location,country,lat,lon,temperature,feels_like,humidity,pressure,wind_speed,description,icon,timestamp"
        );
        let data = lines.next().unwrap();
        assert!(data.starts_with("Paris,FR,48.85,2.35,18.2,17.8,60,1012,12"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_header_and_data_have_matching_column_counts() {
        let result = render(&snapshot()).unwrap();
        let text = String::from_utf8(result.body).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().len();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(headers, record.len());
        assert_eq!(headers, 12);
    }

    #[test]
    fn test_csv_filename_and_mime() {
        let result = render(&snapshot()).unwrap();
        assert_eq!(result.content_type, "text/csv");
        assert_eq!(result.filename.as_deref(), Some("Paris_weather.csv"));
    }
}
