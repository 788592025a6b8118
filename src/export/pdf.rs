//! PDF renderer: paginated weather and search-history reports.
//!
//! Report content is built as a flat list of sized text lines first, then
//! laid out top-to-bottom across as many pages as needed. The byte buffer is
//! fully assembled before it is handed back; no partial output ever reaches
//! a caller.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::models::SearchHistoryEntry;
use crate::{Result, SkycastError};

use super::{ExportResult, WeatherReport, filename_stem};

// A4 portrait, in points
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 72.0;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Text size classes used by the reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontSize {
    Title,
    Heading,
    Body,
}

impl FontSize {
    fn points(self) -> f32 {
        match self {
            FontSize::Title => 20.0,
            FontSize::Heading => 16.0,
            FontSize::Body => 12.0,
        }
    }

    /// Vertical advance for a line of this size
    fn leading(self) -> f32 {
        self.points() * 1.4
    }
}

/// One laid-out line of report text
#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    size: FontSize,
}

impl Line {
    fn title(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: FontSize::Title,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: FontSize::Heading,
        }
    }

    fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: FontSize::Body,
        }
    }

    fn blank() -> Self {
        Self::body("")
    }
}

/// Render a weather report as a paginated PDF.
pub fn render(report: &WeatherReport) -> Result<ExportResult> {
    let lines = weather_report_lines(report);
    let body = write_document(&lines)?;

    Ok(ExportResult {
        content_type: "application/pdf",
        filename: Some(format!(
            "{}_weather.pdf",
            filename_stem(&report.snapshot.location)
        )),
        body,
    })
}

/// Render the full search history as a paginated PDF report.
pub fn render_history_report(entries: &[SearchHistoryEntry]) -> Result<ExportResult> {
    let lines = history_report_lines(entries);
    let body = write_document(&lines)?;

    Ok(ExportResult {
        content_type: "application/pdf",
        filename: Some("search_history_report.pdf".to_string()),
        body,
    })
}

fn weather_report_lines(report: &WeatherReport) -> Vec<Line> {
    let s = &report.snapshot;
    let mut lines = Vec::new();

    lines.push(Line::title(format!("Weather Report for {}", s.location)));
    lines.push(Line::blank());
    lines.push(Line::body(format!(
        "Report Generated: {}",
        s.timestamp.format(TIME_FORMAT)
    )));
    lines.push(Line::body(format!("Coordinates: {}, {}", s.lat, s.lon)));
    lines.push(Line::blank());

    if !report.history.is_empty() {
        lines.push(Line::heading("Search History"));
        for (i, entry) in report.history.iter().enumerate() {
            lines.push(Line::body(format!(
                "{}. Last Searched: {}",
                i + 1,
                entry.last_searched.format(TIME_FORMAT)
            )));
            lines.push(Line::body(format!(
                "   Search Count: {}",
                entry.search_count.max(1)
            )));
        }
        lines.push(Line::blank());
    }

    if report.records.is_empty() {
        lines.push(Line::body(
            "No weather records available for this location.",
        ));
    } else {
        lines.push(Line::heading("Weather Records"));
        for (i, record) in report.records.iter().enumerate() {
            lines.push(Line::body(format!(
                "Record {} - {}",
                i + 1,
                record.date.format(TIME_FORMAT)
            )));
            lines.push(Line::body(format!(
                "Temperature: {} C",
                record.temperature
            )));
            // Detail lines appear only when the field was recorded
            if let Some(humidity) = record.humidity {
                lines.push(Line::body(format!("Humidity: {humidity}%")));
            }
            if let Some(pressure) = record.pressure {
                lines.push(Line::body(format!("Pressure: {pressure} hPa")));
            }
            if let Some(wind_speed) = record.wind_speed {
                lines.push(Line::body(format!("Wind Speed: {wind_speed} m/s")));
            }
            if let Some(description) = &record.description {
                lines.push(Line::body(format!("Description: {description}")));
            }
            lines.push(Line::blank());
        }
    }

    lines
}

fn history_report_lines(entries: &[SearchHistoryEntry]) -> Vec<Line> {
    let mut lines = Vec::new();

    lines.push(Line::title("Search History Report"));
    lines.push(Line::blank());
    lines.push(Line::body(format!("Total Searches: {}", entries.len())));
    lines.push(Line::blank());

    if entries.is_empty() {
        lines.push(Line::body("No search history records available."));
        return lines;
    }

    lines.push(Line::heading("Search Records"));
    for (i, entry) in entries.iter().enumerate() {
        lines.push(Line::body(format!("{}. Location: {}", i + 1, entry.name)));
        lines.push(Line::body(format!(
            "   Coordinates: {}, {}",
            entry.lat, entry.lon
        )));
        lines.push(Line::body(format!(
            "   Last Searched: {}",
            entry.last_searched.format(TIME_FORMAT)
        )));
        lines.push(Line::body(format!(
            "   Search Count: {}",
            entry.search_count.max(1)
        )));
        lines.push(Line::blank());
    }

    lines
}

/// Lay the lines out across pages and assemble the document.
fn write_document(lines: &[Line]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut operations: Vec<Operation> = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let leading = line.size.leading();
        if y - leading < MARGIN && !operations.is_empty() {
            flush_page(&mut doc, pages_id, &mut operations, &mut page_ids)?;
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= leading;

        if line.text.is_empty() {
            continue;
        }

        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec!["F1".into(), line.size.points().into()],
        ));
        operations.push(Operation::new("Td", vec![MARGIN.into(), y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.text.clone())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    // Flush the trailing page; a document always has at least one
    if !operations.is_empty() || page_ids.is_empty() {
        flush_page(&mut doc, pages_id, &mut operations, &mut page_ids)?;
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
    let page_count = page_ids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| SkycastError::render(format!("PDF assembly failed: {e}")))?;
    Ok(buffer)
}

fn flush_page(
    doc: &mut Document,
    pages_id: ObjectId,
    operations: &mut Vec<Operation>,
    page_ids: &mut Vec<ObjectId>,
) -> Result<()> {
    let content = Content {
        operations: std::mem::take(operations),
    };
    let encoded = content
        .encode()
        .map_err(|e| SkycastError::render(format!("PDF content encoding failed: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
    page_ids.push(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WeatherRecord, WeatherSnapshot};
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

    fn entry() -> SearchHistoryEntry {
        SearchHistoryEntry {
            id: 1,
            name: "Paris".to_string(),
            lat: 48.85,
            lon: 2.35,
            last_searched: Utc::now(),
            search_count: 3,
        }
    }

    fn record_with(
        humidity: Option<u8>,
        pressure: Option<u32>,
        wind_speed: Option<f64>,
        description: Option<&str>,
    ) -> WeatherRecord {
        WeatherRecord {
            id: 1,
            location_id: 1,
            date: Utc::now(),
            temperature: 15.0,
            humidity,
            pressure,
            wind_speed,
            description: description.map(String::from),
            icon: None,
        }
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_detail_lines_present_only_when_recorded() {
        let report = WeatherReport {
            snapshot: snapshot(),
            history: Vec::new(),
            records: vec![record_with(Some(70), None, Some(3.5), None)],
        };

        let lines = weather_report_lines(&report);
        let all = texts(&lines).join("\n");

        assert!(all.contains("Humidity: 70%"));
        assert!(all.contains("Wind Speed: 3.5 m/s"));
        assert!(!all.contains("Pressure:"));
        assert!(!all.contains("Description:"));
        assert!(!all.contains("N/A"));
    }

    #[test]
    fn test_all_detail_lines_when_fully_recorded() {
        let report = WeatherReport {
            snapshot: snapshot(),
            history: Vec::new(),
            records: vec![record_with(Some(70), Some(1008), Some(3.5), Some("mist"))],
        };

        let all = texts(&weather_report_lines(&report)).join("\n");
        assert!(all.contains("Humidity: 70%"));
        assert!(all.contains("Pressure: 1008 hPa"));
        assert!(all.contains("Wind Speed: 3.5 m/s"));
        assert!(all.contains("Description: mist"));
    }

    #[test]
    fn test_zero_records_fallback_line() {
        let report = WeatherReport {
            snapshot: snapshot(),
            history: Vec::new(),
            records: Vec::new(),
        };

        let all = texts(&weather_report_lines(&report)).join("\n");
        assert!(all.contains("No weather records available for this location."));
        assert!(!all.contains("Weather Records"));
    }

    #[test]
    fn test_history_section_only_when_entries_exist() {
        let without = WeatherReport {
            snapshot: snapshot(),
            history: Vec::new(),
            records: Vec::new(),
        };
        assert!(!texts(&weather_report_lines(&without))
            .join("\n")
            .contains("Search History"));

        let with = WeatherReport {
            snapshot: snapshot(),
            history: vec![entry()],
            records: Vec::new(),
        };
        let all = texts(&weather_report_lines(&with)).join("\n");
        assert!(all.contains("Search History"));
        assert!(all.contains("1. Last Searched:"));
        assert!(all.contains("Search Count: 3"));
    }

    #[test]
    fn test_rendered_pdf_is_loadable() {
        let report = WeatherReport {
            snapshot: snapshot(),
            history: vec![entry()],
            records: vec![record_with(Some(70), Some(1008), Some(3.5), Some("mist"))],
        };

        let result = render(&report).unwrap();
        assert_eq!(result.content_type, "application/pdf");
        assert_eq!(result.filename.as_deref(), Some("Paris_weather.pdf"));
        assert!(result.body.starts_with(b"%PDF"));

        let doc = Document::load_mem(&result.body).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_report_paginates() {
        let records = (0..120)
            .map(|_| record_with(Some(70), Some(1008), Some(3.5), Some("mist")))
            .collect();
        let report = WeatherReport {
            snapshot: snapshot(),
            history: Vec::new(),
            records,
        };

        let result = render(&report).unwrap();
        let doc = Document::load_mem(&result.body).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_history_report_lines_and_fallback() {
        let all = texts(&history_report_lines(&[entry()])).join("\n");
        assert!(all.contains("Search History Report"));
        assert!(all.contains("Total Searches: 1"));
        assert!(all.contains("1. Location: Paris"));

        let empty = texts(&history_report_lines(&[])).join("\n");
        assert!(empty.contains("No search history records available."));
        assert!(!empty.contains("Search Records"));
    }

    #[test]
    fn test_empty_history_report_still_renders() {
        let result = render_history_report(&[]).unwrap();
        assert_eq!(result.filename.as_deref(), Some("search_history_report.pdf"));
        assert!(result.body.starts_with(b"%PDF"));
    }
}
