//! Multi-format weather-report export pipeline
//!
//! The report assembler resolves a location query into a [`WeatherReport`];
//! the per-format renderers turn that report into a byte payload with MIME
//! type and filename metadata. Renderers are pure: given the same report
//! they produce the same payload, and they never touch storage or the
//! network themselves.

pub mod csv;
pub mod json;
pub mod markdown;
pub mod pdf;
pub mod report;
pub mod xml;

pub use report::{ReportAssembler, ReportQuery, WeatherReport};

use crate::{Result, SkycastError};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
    Markdown,
    Pdf,
}

impl ExportFormat {
    /// Parse a format keyword, case-insensitively.
    pub fn parse(keyword: &str) -> Result<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            "md" | "markdown" => Ok(Self::Markdown),
            "pdf" => Ok(Self::Pdf),
            _ => Err(SkycastError::unsupported_format(keyword)),
        }
    }
}

/// A rendered export: payload plus response metadata.
///
/// `filename` of `None` means the payload is served inline rather than as an
/// attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// MIME type of the payload
    pub content_type: &'static str,
    /// Attachment filename, when the payload is a download
    pub filename: Option<String>,
    /// The fully rendered payload
    pub body: Vec<u8>,
}

/// Render a report in the requested format.
pub fn render(format: ExportFormat, report: &WeatherReport) -> Result<ExportResult> {
    match format {
        ExportFormat::Json => json::render(&report.snapshot),
        ExportFormat::Csv => csv::render(&report.snapshot),
        ExportFormat::Xml => xml::render(&report.snapshot),
        ExportFormat::Markdown => markdown::render(report),
        ExportFormat::Pdf => pdf::render(report),
    }
}

/// Filename stem for a location: whitespace collapsed to underscores.
pub(crate) fn filename_stem(location: &str) -> String {
    location.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("json", ExportFormat::Json)]
    #[case("JSON", ExportFormat::Json)]
    #[case("CSV", ExportFormat::Csv)]
    #[case("Xml", ExportFormat::Xml)]
    #[case("md", ExportFormat::Markdown)]
    #[case("markdown", ExportFormat::Markdown)]
    #[case("PDF", ExportFormat::Pdf)]
    fn test_format_parsing_is_case_insensitive(
        #[case] keyword: &str,
        #[case] expected: ExportFormat,
    ) {
        assert_eq!(ExportFormat::parse(keyword).unwrap(), expected);
    }

    #[rstest]
    #[case("bogus")]
    #[case("yaml")]
    #[case("")]
    fn test_unknown_format_is_rejected(#[case] keyword: &str) {
        let err = ExportFormat::parse(keyword).unwrap_err();
        assert!(matches!(
            err,
            SkycastError::UnsupportedFormat { keyword: ref k } if k == keyword
        ));
    }

    #[test]
    fn test_filename_stem_collapses_whitespace() {
        assert_eq!(filename_stem("Paris"), "Paris");
        assert_eq!(filename_stem("New York City"), "New_York_City");
    }
}
