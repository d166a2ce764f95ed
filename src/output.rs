//! Result serialization: JSON for the downstream AI consumers, CSV for
//! spreadsheet review of the segment table.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::models::{DocumentSegment, ProcessedDocument};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output was not valid UTF-8")]
    InvalidUtf8,
}

/// Serialize a processed document to JSON (pretty-printed by default).
pub fn to_json_string(document: &ProcessedDocument, pretty: bool) -> Result<String, OutputError> {
    let json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(json)
}

/// Write a processed document to `path` as pretty-printed JSON.
pub fn write_json(document: &ProcessedDocument, path: &Path) -> Result<(), OutputError> {
    let json = to_json_string(document, true)?;
    fs::write(path, json)?;
    Ok(())
}

/// Render the segment table as CSV: one row per segment with its identity,
/// date, page range, detected header and text.
pub fn to_csv_string(segments: &[DocumentSegment]) -> Result<String, OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "segment_id",
        "date_of_service",
        "page_start",
        "page_end",
        "detected_header",
        "text_content",
    ])?;

    for segment in segments {
        let date = segment
            .date_of_service
            .map(|d| d.to_string())
            .unwrap_or_default();
        let header = segment
            .metadata
            .get("detected_header")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let segment_id = segment.segment_id.to_string();
        let page_start = segment.page_start.to_string();
        let page_end = segment.page_end.to_string();
        writer.write_record([
            segment_id.as_str(),
            date.as_str(),
            page_start.as_str(),
            page_end.as_str(),
            header,
            segment.text_content.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|_| OutputError::InvalidUtf8)
}
