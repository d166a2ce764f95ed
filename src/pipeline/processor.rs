//! Document processing orchestrator.
//!
//! Single entry point driving the full pipeline:
//! segment → enrich → build timeline. The metadata extractor is trait-based
//! DI so the orchestrator stays testable with mock implementations.

use thiserror::Error;
use tracing::{info, warn};

use crate::config::ProcessorConfig;
use crate::models::{PageContent, ProcessedDocument};
use crate::pipeline::metadata::{MetadataExtractor, PatternMetadataExtractor};
use crate::pipeline::segmenter::DocumentSegmenter;
use crate::pipeline::timeline::TimelineBuilder;
use crate::pipeline::{MetadataError, SegmentationError, TimelineError};

/// Errors that can occur during document processing.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("segmentation failed: {0}")]
    Segmentation(#[from] SegmentationError),

    #[error("metadata extraction failed: {0}")]
    Metadata(#[from] MetadataError),

    #[error("timeline building failed: {0}")]
    Timeline(#[from] TimelineError),
}

/// Orchestrates segmentation, enrichment and timeline assembly for one
/// document at a time. Holds no per-document state; a single processor can
/// be reused across documents.
pub struct DocumentProcessor {
    segmenter: DocumentSegmenter,
    extractor: Box<dyn MetadataExtractor>,
    timeline: TimelineBuilder,
}

impl DocumentProcessor {
    /// Processor with the built-in pattern-based metadata extractor.
    pub fn new(config: &ProcessorConfig) -> Result<Self, ProcessingError> {
        let extractor = Box::new(PatternMetadataExtractor::new(&config.segmentation)?);
        Self::with_extractor(config, extractor)
    }

    /// Processor with a caller-supplied metadata extractor.
    pub fn with_extractor(
        config: &ProcessorConfig,
        extractor: Box<dyn MetadataExtractor>,
    ) -> Result<Self, ProcessingError> {
        Ok(Self {
            segmenter: DocumentSegmenter::new(&config.segmentation)?,
            extractor,
            timeline: TimelineBuilder::new(&config.timeline),
        })
    }

    /// Run the full pipeline over extracted pages.
    ///
    /// A segment whose enrichment fails is kept with null metadata rather
    /// than failing the document; the result is always complete and
    /// internally consistent, or an error.
    pub fn process(
        &self,
        pages: &[PageContent],
        document_id: &str,
        original_filename: &str,
        total_pages: u32,
    ) -> Result<ProcessedDocument, ProcessingError> {
        info!(document_id, pages = pages.len(), "processing document");

        let mut segments = self.segmenter.segment(pages);
        info!(segments = segments.len(), "segmentation complete");

        for segment in &mut segments {
            if let Err(error) = self.extractor.enrich(segment) {
                warn!(
                    segment_id = %segment.segment_id,
                    %error,
                    "enrichment failed, keeping segment without metadata"
                );
            }
        }

        let document =
            self.timeline
                .build_timeline(segments, document_id, original_filename, total_pages)?;
        Ok(document)
    }
}
