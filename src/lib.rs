//! Chartprep turns noisy, concatenated medical-record text into a
//! structured, chronologically ordered document ready for AI summarization.
//!
//! The pipeline consumes per-page text produced by an upstream extraction
//! step (OCR or direct PDF text) and runs three stages per document:
//!
//! 1. [`pipeline::DocumentSegmenter`] — noise filtering and boundary
//!    detection, producing logical record segments with page attribution.
//! 2. [`pipeline::MetadataExtractor`] — per-segment enrichment with date of
//!    service, document type, provider/facility and keywords.
//! 3. [`pipeline::TimelineBuilder`] — chronological ordering, token-bounded
//!    chunking of oversized segments, and result assembly.
//!
//! [`pipeline::DocumentProcessor`] wires the stages together:
//!
//! ```
//! use chartprep::config::ProcessorConfig;
//! use chartprep::models::PageContent;
//! use chartprep::pipeline::DocumentProcessor;
//!
//! let processor = DocumentProcessor::new(&ProcessorConfig::default())?;
//! let pages = vec![PageContent::new(
//!     1,
//!     "DISCHARGE SUMMARY\nDate of Service: 01/05/2023\n\
//!      patient was discharged home in stable condition after treatment",
//! )];
//! let document = processor.process(&pages, "doc-1", "records.pdf", 1)?;
//! assert_eq!(document.total_pages, 1);
//! # Ok::<(), chartprep::pipeline::ProcessingError>(())
//! ```

pub mod config;
pub mod models;
pub mod output;
pub mod pipeline;

pub use config::{ProcessorConfig, SegmentationConfig, TimelineConfig};
pub use models::{DocumentChunk, DocumentSegment, PageContent, ProcessedDocument};
pub use pipeline::{DocumentProcessor, MetadataExtractor, ProcessingError};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and examples. Library consumers that
/// install their own subscriber should not call this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
