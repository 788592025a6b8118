//! JSON renderer: the snapshot passes through unchanged.

use crate::models::WeatherSnapshot;
use crate::{Result, SkycastError};

use super::ExportResult;

/// Render a snapshot as JSON, served inline.
pub fn render(snapshot: &WeatherSnapshot) -> Result<ExportResult> {
    let body = serde_json::to_vec(snapshot)
        .map_err(|e| SkycastError::render(format!("JSON serialization failed: {e}")))?;

    Ok(ExportResult {
        content_type: "application/json",
        filename: None,
        body,
    })
}
