use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Extracted text of a single physical PDF page, produced by the upstream
/// extraction step. Immutable once created; ordered by `page_number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub page_number: u32,
    pub raw_text: String,
    #[serde(default)]
    pub is_ocr_applied: bool,
}

impl PageContent {
    pub fn new(page_number: u32, raw_text: impl Into<String>) -> Self {
        Self {
            page_number,
            raw_text: raw_text.into(),
            is_ocr_applied: false,
        }
    }
}

/// A logical segment of a medical record: one contiguous span of text between
/// two detected boundaries (one clinical note, report, or result block).
///
/// Created by the segmenter with identity, text and page range; metadata
/// fields are filled in by enrichment, chunks by the timeline builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSegment {
    pub segment_id: Uuid,
    pub text_content: String,
    pub page_start: u32,
    pub page_end: u32,
    pub date_of_service: Option<NaiveDate>,
    pub document_type: Option<String>,
    pub provider: Option<String>,
    pub facility: Option<String>,
    pub keywords: Vec<String>,
    pub metadata: BTreeMap<String, Value>,
    pub chunks: Vec<DocumentChunk>,
}

impl DocumentSegment {
    pub fn new(text_content: impl Into<String>, page_start: u32, page_end: u32) -> Self {
        Self {
            segment_id: Uuid::new_v4(),
            text_content: text_content.into(),
            page_start,
            page_end,
            date_of_service: None,
            document_type: None,
            provider: None,
            facility: None,
            keywords: Vec::new(),
            metadata: BTreeMap::new(),
            chunks: Vec::new(),
        }
    }
}

/// A sub-division of an oversized segment, bounded by an estimated token
/// limit. Owned exclusively by its parent segment; `chunk_index` is zero-based
/// and contiguous within the segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub chunk_id: String,
    pub parent_segment_id: String,
    pub text_content: String,
    pub token_count: usize,
    pub chunk_index: usize,
}

/// Final result of a pipeline run: segments sorted into a timeline, with the
/// document-level date range and totals. Serializes to the JSON contract
/// consumed by the CLI/API layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub document_id: String,
    pub original_filename: String,
    pub total_pages: u32,
    pub processing_date: NaiveDateTime,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub total_segments: usize,
    pub segments: Vec<DocumentSegment>,
}
