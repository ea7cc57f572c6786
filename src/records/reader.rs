// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::normalize::{canonical_column, normalize_row, Row};
use super::regions::region_from_filename;
use super::RawRecord;

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {reason}")]
    Csv { path: String, reason: String },

    #[error("Malformed JSON in {path}: {reason}")]
    Json { path: String, reason: String },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, ReaderError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(InputFormat::Csv),
            Some("json") => Ok(InputFormat::Json),
            other => Err(ReaderError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Parse rows from a reader. Column names are canonicalized.
pub fn parse_rows<R: Read>(
    reader: R,
    format: InputFormat,
    source: &str,
) -> Result<Vec<Row>, ReaderError> {
    match format {
        InputFormat::Csv => {
            let mut csv_reader = csv::ReaderBuilder::new()
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(reader);

            let headers: Vec<String> = csv_reader
                .headers()
                .map_err(|e| ReaderError::Csv {
                    path: source.to_string(),
                    reason: e.to_string(),
                })?
                .iter()
                .map(canonical_column)
                .collect();

            let mut rows = Vec::new();
            for result in csv_reader.records() {
                let record = result.map_err(|e| ReaderError::Csv {
                    path: source.to_string(),
                    reason: e.to_string(),
                })?;
                let row: Row = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.clone(), v.to_string()))
                    .collect();
                rows.push(row);
            }
            Ok(rows)
        }
        InputFormat::Json => {
            let values: Vec<serde_json::Map<String, serde_json::Value>> =
                serde_json::from_reader(reader).map_err(|e| ReaderError::Json {
                    path: source.to_string(),
                    reason: e.to_string(),
                })?;

            Ok(values
                .into_iter()
                .map(|object| {
                    object
                        .into_iter()
                        .map(|(k, v)| {
                            let value = match v {
                                serde_json::Value::String(s) => s,
                                serde_json::Value::Null => String::new(),
                                other => other.to_string(),
                            };
                            (canonical_column(&k), value)
                        })
                        .collect()
                })
                .collect())
        }
    }
}

/// Read canonicalized rows from a CSV or JSON file
pub fn read_rows(path: &Path) -> Result<Vec<Row>, ReaderError> {
    let format = InputFormat::from_path(path)?;
    let file = File::open(path).map_err(|source| ReaderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rows = parse_rows(file, format, &path.display().to_string())?;
    debug!("Parsed {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read a file into normalized records, in file order.
///
/// When `default_region` is `None` the region is derived from the file name.
pub fn read_records(path: &Path, default_region: Option<&str>) -> Result<Vec<RawRecord>, ReaderError> {
    let derived = region_from_filename(path);
    let region = default_region.map(str::to_string).or(derived);

    let records: Vec<RawRecord> = read_rows(path)?
        .iter()
        .map(|row| normalize_row(row, region.as_deref()))
        .collect();

    info!(
        path = %path.display(),
        region = region.as_deref().unwrap_or("-"),
        "Loaded {} records",
        records.len()
    );
    Ok(records)
}
