//! Boundary detection and segment construction.
//!
//! Pages are combined into one marker-annotated stream, noise-filtered, then
//! scanned with an ordered pattern set. Spans between consecutive boundary
//! matches become segments; page attribution is recovered from the embedded
//! `[PAGE_n]` markers.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SegmentationConfig;
use crate::models::{DocumentSegment, PageContent};
use crate::pipeline::noise::filter_noise;

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[PAGE_(\d+)\]").expect("valid regex"));

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("invalid boundary pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// What a boundary pattern signals. Carried for diagnostics; boundary
/// handling itself is uniform across categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCategory {
    DateLabel,
    CapsHeader,
    SectionKeyword,
    ProviderLabel,
}

#[derive(Debug)]
struct BoundaryPattern {
    category: BoundaryCategory,
    regex: Regex,
}

/// Splits a page stream into logical record segments.
#[derive(Debug)]
pub struct DocumentSegmenter {
    patterns: Vec<BoundaryPattern>,
    min_segment_length: usize,
}

impl DocumentSegmenter {
    /// Compile the boundary pattern set from configuration.
    ///
    /// Pattern order is fixed: date-of-service labels, all-caps header lines,
    /// the configured section vocabulary, provider/facility labels. Matches
    /// are later position-sorted, so order only decides ties.
    pub fn new(config: &SegmentationConfig) -> Result<Self, SegmentationError> {
        let mut patterns = Vec::new();

        for date_label in [
            r"(?i)Date of Service:\s*\d{1,2}[/-]\d{1,2}[/-]\d{2,4}",
            r"(?i)Service Date:\s*\d{1,2}[/-]\d{1,2}[/-]\d{2,4}",
            r"(?i)DOS:\s*\d{1,2}[/-]\d{1,2}[/-]\d{2,4}",
        ] {
            patterns.push(compile(BoundaryCategory::DateLabel, date_label)?);
        }

        patterns.push(compile(BoundaryCategory::CapsHeader, r"(?m)^[A-Z\s]{5,}$")?);

        for section in &config.medical_sections {
            patterns.push(compile(
                BoundaryCategory::SectionKeyword,
                &format!("(?i){section}"),
            )?);
        }

        for label in [
            r"(?i)Provider:\s*[^\n]+",
            r"(?i)Physician:\s*[^\n]+",
            r"(?i)Facility:\s*[^\n]+",
        ] {
            patterns.push(compile(BoundaryCategory::ProviderLabel, label)?);
        }

        Ok(Self {
            patterns,
            min_segment_length: config.min_segment_length,
        })
    }

    /// Segment the document pages.
    ///
    /// Never fails on content: documents without any recognizable boundary
    /// fall back to one segment per non-blank page.
    pub fn segment(&self, pages: &[PageContent]) -> Vec<DocumentSegment> {
        let combined = combine_pages_with_markers(pages);
        let cleaned = filter_noise(&combined);
        let segments = self.find_segments(&cleaned);

        if segments.is_empty() {
            warn!("no boundaries detected, falling back to page-based segments");
            return page_based_segments(pages);
        }
        segments
    }

    fn find_segments(&self, text: &str) -> Vec<DocumentSegment> {
        // Collect every match from every pattern, then stable-sort by
        // position: ties keep pattern-declaration order.
        let mut boundaries: Vec<(usize, &str, BoundaryCategory)> = Vec::new();
        for pattern in &self.patterns {
            for found in pattern.regex.find_iter(text) {
                boundaries.push((found.start(), found.as_str(), pattern.category));
            }
        }
        boundaries.sort_by_key(|&(start, _, _)| start);
        debug!(boundaries = boundaries.len(), "boundary scan complete");

        let mut segments = Vec::new();
        for (i, &(start, header, category)) in boundaries.iter().enumerate() {
            let end = boundaries
                .get(i + 1)
                .map(|&(next_start, _, _)| next_start)
                .unwrap_or(text.len());
            let span = text[start..end].trim();
            if span.chars().count() < self.min_segment_length {
                continue;
            }

            let (page_start, page_end) = find_page_range(span);
            let mut segment = DocumentSegment::new(span, page_start, page_end);
            segment
                .metadata
                .insert("detected_header".into(), Value::String(header.to_owned()));
            debug!(
                segment_id = %segment.segment_id,
                ?category,
                page_start,
                page_end,
                "segment emitted"
            );
            segments.push(segment);
        }
        segments
    }
}

fn compile(category: BoundaryCategory, pattern: &str) -> Result<BoundaryPattern, SegmentationError> {
    let regex = Regex::new(pattern).map_err(|source| SegmentationError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })?;
    Ok(BoundaryPattern { category, regex })
}

/// Combine page texts into one stream, each page prefixed with a literal
/// `[PAGE_n]` marker so attribution survives filtering and boundary search.
fn combine_pages_with_markers(pages: &[PageContent]) -> String {
    let mut combined = Vec::with_capacity(pages.len() * 2);
    for page in pages {
        combined.push(format!("[PAGE_{}]", page.page_number));
        combined.push(page.raw_text.clone());
    }
    combined.join("\n")
}

/// Page range of a span, from the markers embedded in it. Spans carrying no
/// marker (text before the first page's marker was trimmed away) default to
/// page 1.
fn find_page_range(span: &str) -> (u32, u32) {
    let mut numbers = PAGE_MARKER
        .captures_iter(span)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .peekable();
    match numbers.peek() {
        None => (1, 1),
        Some(_) => {
            let mut min = u32::MAX;
            let mut max = 0;
            for n in numbers {
                min = min.min(n);
                max = max.max(n);
            }
            (min, max)
        }
    }
}

/// One segment per non-blank page, used when no boundary matched anywhere.
fn page_based_segments(pages: &[PageContent]) -> Vec<DocumentSegment> {
    let mut segments = Vec::new();
    for page in pages {
        let text = page.raw_text.trim();
        if text.is_empty() {
            continue;
        }
        let mut segment = DocumentSegment::new(text, page.page_number, page.page_number);
        segment
            .metadata
            .insert("segment_type".into(), Value::String("page_based".into()));
        segment
            .metadata
            .insert("source".into(), Value::String("fallback".into()));
        segments.push(segment);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentationConfig;

    fn segmenter() -> DocumentSegmenter {
        DocumentSegmenter::new(&SegmentationConfig::default()).unwrap()
    }

    fn narrative(n: usize) -> String {
        "the patient was comfortable and resting quietly without acute distress today. "
            .chars()
            .cycle()
            .take(n)
            .collect()
    }

    #[test]
    fn detects_section_header_boundaries() {
        let text = format!(
            "DISCHARGE SUMMARY\n{}\nADMISSION NOTE\n{}",
            narrative(120),
            narrative(120)
        );
        let pages = vec![PageContent::new(1, text)];
        let segments = segmenter().segment(&pages);

        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments[0].metadata["detected_header"],
            Value::String("DISCHARGE SUMMARY".into())
        );
        assert_eq!(
            segments[1].metadata["detected_header"],
            Value::String("ADMISSION NOTE".into())
        );
    }

    #[test]
    fn short_spans_are_dropped_at_threshold() {
        // "OPERATIVE REPORT" (16) + newline + filler: 32 filler chars trim to
        // a 49-char span (dropped), 33 make it 50 (kept).
        for (filler_len, expect_kept) in [(32, false), (33, true)] {
            let text = format!(
                "OPERATIVE REPORT\n{}\nPATHOLOGY REPORT\n{}",
                "x".repeat(filler_len),
                narrative(120)
            );
            let pages = vec![PageContent::new(1, text)];
            let segments = segmenter().segment(&pages);
            let kept = segments
                .iter()
                .any(|s| s.metadata["detected_header"] == Value::String("OPERATIVE REPORT".into()));
            assert_eq!(kept, expect_kept, "filler_len = {filler_len}");
        }
    }

    #[test]
    fn falls_back_to_page_segments_without_boundaries() {
        let pages = vec![
            PageContent::new(1, narrative(90)),
            PageContent::new(2, narrative(90)),
            PageContent::new(3, narrative(90)),
        ];
        let segments = segmenter().segment(&pages);

        assert_eq!(segments.len(), 3);
        for (segment, page) in segments.iter().zip(&pages) {
            assert_eq!(segment.page_start, page.page_number);
            assert_eq!(segment.page_end, page.page_number);
            assert_eq!(
                segment.metadata["segment_type"],
                Value::String("page_based".into())
            );
        }
    }

    #[test]
    fn fallback_skips_blank_pages() {
        let pages = vec![
            PageContent::new(1, "   \n  "),
            PageContent::new(2, narrative(80)),
        ];
        let segments = segmenter().segment(&pages);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].page_start, 2);
    }

    #[test]
    fn page_range_spans_markers() {
        let (start, end) = find_page_range("[PAGE_2] mid [PAGE_4] end [PAGE_3]");
        assert_eq!((start, end), (2, 4));
    }

    #[test]
    fn page_range_defaults_without_markers() {
        assert_eq!(find_page_range("no markers here"), (1, 1));
    }

    #[test]
    fn segment_text_reconstructs_filtered_stream() {
        let text = format!(
            "DISCHARGE SUMMARY\n{}\nRADIOLOGY REPORT\n{}",
            narrative(100),
            narrative(100)
        );
        let pages = vec![PageContent::new(1, text)];
        let segments = segmenter().segment(&pages);
        assert_eq!(segments.len(), 2);

        // Spans are adjacent: joining them (allowing for trimmed boundary
        // whitespace) recovers the filtered text minus the marker prefix.
        let combined = combine_pages_with_markers(&pages);
        let cleaned = filter_noise(&combined);
        let first_start = cleaned.find("DISCHARGE SUMMARY").unwrap();
        let reconstructed = format!("{}\n{}", segments[0].text_content, segments[1].text_content);
        assert_eq!(reconstructed, cleaned[first_start..].trim());
    }

    #[test]
    fn date_of_service_label_is_a_boundary() {
        let text = format!(
            "Date of Service: 03/15/2023\n{}\nDate of Service: 04/02/2023\n{}",
            narrative(100),
            narrative(100)
        );
        let pages = vec![PageContent::new(1, text)];
        let segments = segmenter().segment(&pages);
        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments[0].metadata["detected_header"],
            Value::String("Date of Service: 03/15/2023".into())
        );
    }

    #[test]
    fn invalid_section_pattern_is_rejected() {
        let config = SegmentationConfig {
            medical_sections: vec!["BROKEN(".into()],
            ..SegmentationConfig::default()
        };
        let err = DocumentSegmenter::new(&config).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidPattern { .. }));
    }
}
