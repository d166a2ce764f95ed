//! Chronological ordering and token-bounded chunking.
//!
//! Dated segments come first (ascending), undated segments follow in page
//! order: a confident partial timeline beats guessed dates, and undated
//! material keeps its document locality. Oversized segments are split along
//! sentence boundaries into chunks sized for AI consumption.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::TimelineConfig;
use crate::models::{DocumentChunk, DocumentSegment, ProcessedDocument};
use crate::pipeline::sentence::SentenceSplitter;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("segment {segment_id} could not be split into sentences for chunking")]
    SentenceTokenization { segment_id: Uuid },
}

/// Estimate language-model tokens from text length (~4 characters per token).
///
/// An approximation contract, not a precise count: chunk boundaries depend
/// only on the greedy accumulation below, never on exact tokenizer output.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_ascii() {
        text.len() / 4
    } else {
        text.chars().count() / 4
    }
}

/// Builds the final [`ProcessedDocument`] from enriched segments.
pub struct TimelineBuilder {
    max_chunk_tokens: usize,
}

impl TimelineBuilder {
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            max_chunk_tokens: config.max_chunk_tokens,
        }
    }

    /// Sort segments chronologically, chunk the oversized ones, and assemble
    /// the result document.
    pub fn build_timeline(
        &self,
        segments: Vec<DocumentSegment>,
        document_id: &str,
        original_filename: &str,
        total_pages: u32,
    ) -> Result<ProcessedDocument, TimelineError> {
        let mut sorted = sort_chronologically(segments);

        for segment in &mut sorted {
            let estimated = estimate_tokens(&segment.text_content);
            if estimated > self.max_chunk_tokens {
                debug!(
                    segment_id = %segment.segment_id,
                    estimated,
                    "segment exceeds token limit, chunking"
                );
                segment.chunks = self.split_into_chunks(segment)?;
            }
        }

        let date_range = calculate_date_range(&sorted);
        let total_segments = sorted.len();
        info!(
            document_id,
            total_segments,
            dated = date_range.is_some(),
            "timeline assembled"
        );

        Ok(ProcessedDocument {
            document_id: document_id.to_owned(),
            original_filename: original_filename.to_owned(),
            total_pages,
            processing_date: Utc::now().naive_utc(),
            date_range,
            total_segments,
            segments: sorted,
        })
    }

    /// Greedy sentence accumulation. A sentence is never split: one that
    /// alone exceeds the limit becomes its own over-limit chunk.
    fn split_into_chunks(
        &self,
        segment: &DocumentSegment,
    ) -> Result<Vec<DocumentChunk>, TimelineError> {
        let sentences = SentenceSplitter::shared().split(&segment.text_content);
        if sentences.is_empty() {
            return Err(TimelineError::SentenceTokenization {
                segment_id: segment.segment_id,
            });
        }

        let mut chunks = Vec::new();
        let mut buffer: Vec<String> = Vec::new();
        let mut buffered_tokens = 0;
        let mut chunk_index = 0;

        for sentence in sentences {
            let sentence_tokens = estimate_tokens(&sentence);
            if buffered_tokens + sentence_tokens > self.max_chunk_tokens && !buffer.is_empty() {
                chunks.push(make_chunk(segment, &buffer, buffered_tokens, chunk_index));
                chunk_index += 1;
                buffer = vec![sentence];
                buffered_tokens = sentence_tokens;
            } else {
                buffer.push(sentence);
                buffered_tokens += sentence_tokens;
            }
        }
        if !buffer.is_empty() {
            chunks.push(make_chunk(segment, &buffer, buffered_tokens, chunk_index));
        }

        Ok(chunks)
    }
}

fn make_chunk(
    segment: &DocumentSegment,
    sentences: &[String],
    token_count: usize,
    chunk_index: usize,
) -> DocumentChunk {
    DocumentChunk {
        chunk_id: format!("{}_chunk_{}", segment.segment_id, chunk_index),
        parent_segment_id: segment.segment_id.to_string(),
        text_content: sentences.join(" "),
        token_count,
        chunk_index,
    }
}

/// Dated segments ascending (stable), then undated in page order.
fn sort_chronologically(segments: Vec<DocumentSegment>) -> Vec<DocumentSegment> {
    let (mut dated, mut undated): (Vec<_>, Vec<_>) = segments
        .into_iter()
        .partition(|s| s.date_of_service.is_some());
    dated.sort_by_key(|s| s.date_of_service);
    undated.sort_by_key(|s| s.page_start);
    dated.extend(undated);
    dated
}

/// (min, max) over all dates of service, or `None` when nothing is dated.
fn calculate_date_range(segments: &[DocumentSegment]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = segments.iter().filter_map(|s| s.date_of_service);
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d)));
    Some((min, max))
}
