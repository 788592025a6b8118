//! Markdown renderer: fixed report template.

use std::fmt::Write;

use crate::{Result, SkycastError};

use super::{ExportResult, WeatherReport, filename_stem};

/// Render a report as Markdown.
pub fn render(report: &WeatherReport) -> Result<ExportResult> {
    let s = &report.snapshot;
    let mut md = String::new();

    write_report(&mut md, report)
        .map_err(|e| SkycastError::render(format!("Markdown formatting failed: {e}")))?;

    Ok(ExportResult {
        content_type: "text/markdown",
        filename: Some(format!("{}_weather.md", filename_stem(&s.location))),
        body: md.into_bytes(),
    })
}

fn write_report(md: &mut String, report: &WeatherReport) -> std::fmt::Result {
    let s = &report.snapshot;

    writeln!(md, "# Weather Report for {}, {}", s.location, s.country)?;
    writeln!(md)?;
    writeln!(
        md,
        "*Generated on: {}*",
        s.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(md)?;

    writeln!(md, "## Current Conditions")?;
    writeln!(md)?;
    writeln!(md, "- **Temperature:** {}°C", s.temperature)?;
    writeln!(md, "- **Feels Like:** {}°C", s.feels_like)?;
    writeln!(md, "- **Weather:** {}", s.description)?;
    writeln!(md, "- **Humidity:** {}%", s.humidity)?;
    writeln!(md, "- **Pressure:** {} hPa", s.pressure)?;
    writeln!(md, "- **Wind Speed:** {} m/s", s.wind_speed)?;
    writeln!(md)?;

    writeln!(md, "## Location Information")?;
    writeln!(md)?;
    writeln!(md, "- **Coordinates:** {}, {}", s.lat, s.lon)?;
    writeln!(md)?;

    writeln!(md, "## Weather Records")?;
    writeln!(md)?;
    if report.records.is_empty() {
        writeln!(md, "No weather records available for this location.")?;
    } else {
        for (i, record) in report.records.iter().enumerate() {
            write!(
                md,
                "{}. **{}:** {}°C",
                i + 1,
                record.date.format("%Y-%m-%d %H:%M:%S UTC"),
                record.temperature
            )?;
            if let Some(description) = &record.description {
                write!(md, ", {description}")?;
            }
            writeln!(md)?;
        }
    }

    Ok(())
}
