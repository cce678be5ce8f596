//! Dataset loading: raw bytes to normalized records.
//!
//! The Form 127 dataset is a single JSON array of flat row objects, served
//! either plain or gzip-compressed at rest. Loading goes raw bytes →
//! optional gunzip → JSON rows → per-row normalization, with accepted and
//! rejected row counts logged for diagnostics. Rejected rows are dropped,
//! never propagated as errors.

use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;
use tracing::{debug, info};

use crate::fetch::{BasicClient, fetch_bytes};
use crate::record::{Record, YearPolicy};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Transparently gunzips the payload when it carries the gzip magic bytes;
/// anything else passes through untouched. The transport layer may have
/// already decompressed, so both shapes are expected.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.len() < 2 || bytes[..2] != GZIP_MAGIC {
        return Ok(bytes.to_vec());
    }
    debug!(compressed_bytes = bytes.len(), "Gunzipping dataset payload");
    let mut decoded = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut decoded)
        .context("failed to gunzip dataset payload")?;
    Ok(decoded)
}

/// Decodes the payload into raw JSON rows.
///
/// # Errors
///
/// Returns an error when the bytes are not valid JSON or the document root
/// is not an array.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<Value>> {
    let bytes = decompress(bytes)?;
    let root: Value = serde_json::from_slice(&bytes).context("dataset is not valid JSON")?;
    match root {
        Value::Array(rows) => Ok(rows),
        other => bail!(
            "dataset root must be a JSON array of rows, got {}",
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalizes raw rows into records, dropping rows the year policy or the
/// identity rule rejects. Logs the accepted/rejected split.
pub fn normalize(rows: &[Value], years: &YearPolicy) -> Vec<Record> {
    let records: Vec<Record> = rows
        .iter()
        .filter_map(|row| Record::from_raw(row, years))
        .collect();

    info!(
        accepted = records.len(),
        rejected = rows.len() - records.len(),
        "Dataset rows normalized"
    );
    records
}

/// Loads and normalizes the dataset from a local file path or an HTTP URL.
#[tracing::instrument(skip(years), fields(source = %source))]
pub async fn load(source: &str, years: &YearPolicy) -> Result<Vec<Record>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new();
        fetch_bytes(&client, source).await?.to_vec()
    } else {
        std::fs::read(source).with_context(|| format!("failed to read dataset file {source}"))?
    };

    let rows = parse_rows(&bytes)?;
    Ok(normalize(&rows, years))
}
