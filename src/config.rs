//! Pipeline configuration value objects.
//!
//! Configuration is constructed once at startup (or taken from `Default`) and
//! passed by reference into each component constructor. Nothing here is
//! mutated after construction.

/// Application-level constants
pub const APP_NAME: &str = "Chartprep";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "chartprep=info".into()
}

/// Boundary-detection and segment-emission settings.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Minimum trimmed span length (in characters) for a span to be emitted
    /// as a segment. Shorter spans are silently dropped as content noise.
    pub min_segment_length: usize,
    /// Advisory upper bound on segment length. Not enforced as a hard split
    /// point; exposed for callers that want to pre-filter.
    pub max_segment_length: usize,
    /// Section-header vocabulary compiled into boundary patterns. Each entry
    /// is a regex fragment matched case-insensitively.
    pub medical_sections: Vec<String>,
    /// Additional regex patterns recognized as dates of service during
    /// metadata enrichment.
    pub date_patterns: Vec<String>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_segment_length: 50,
            max_segment_length: 2000,
            medical_sections: [
                "DISCHARGE SUMMARY",
                "ADMISSION NOTE",
                "PROGRESS NOTE",
                "CONSULTATION",
                "OPERATIVE REPORT",
                "LABORATORY RESULTS?",
                "RADIOLOGY REPORT",
                "PATHOLOGY REPORT",
            ]
            .map(String::from)
            .to_vec(),
            date_patterns: [
                r"\d{1,2}/\d{1,2}/\d{4}",
                r"\d{4}-\d{2}-\d{2}",
                r"\b\w+\s+\d{1,2},\s+\d{4}\b",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Timeline assembly and chunking settings.
#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Maximum estimated tokens per chunk. Segments whose estimate exceeds
    /// this are split along sentence boundaries.
    pub max_chunk_tokens: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: 4000,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfig {
    pub segmentation: SegmentationConfig,
    pub timeline: TimelineConfig,
}
