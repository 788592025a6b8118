//! XML renderer: the snapshot under a single `weather` root element.

use crate::models::WeatherSnapshot;
use crate::{Result, SkycastError};

use super::{ExportResult, filename_stem};

/// Render a snapshot as XML.
pub fn render(snapshot: &WeatherSnapshot) -> Result<ExportResult> {
    let xml = quick_xml::se::to_string_with_root("weather", snapshot)
        .map_err(|e| SkycastError::render(format!("XML serialization failed: {e}")))?;

    Ok(ExportResult {
        content_type: "application/xml",
        filename: Some(format!("{}_weather.xml", filename_stem(&snapshot.location))),
        body: xml.into_bytes(),
    })
}
