//! Output formatting and persistence for reports.
//!
//! Supports pretty JSON logging, JSON file export, and CSV append for the
//! flat row types.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs any report as pretty-printed JSON.
pub fn log_json<T: Serialize>(report: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes a report as pretty-printed JSON to a file, replacing any previous
/// contents.
pub fn write_json<T: Serialize>(path: &str, report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("failed to write report to {path}"))?;
    info!(path, "Report written");
    Ok(())
}

/// Appends flat rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_rows<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
