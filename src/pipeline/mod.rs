//! Record processing pipeline: noise filtering, segmentation, metadata
//! enrichment and timeline assembly.
//!
//! Stages run sequentially per document and share no mutable state, so the
//! pipeline is safe to invoke concurrently across documents. The only
//! process-wide state is the lazily initialized sentence splitter and the
//! compiled pattern sets.

pub mod metadata;
pub mod noise;
pub mod processor;
pub mod segmenter;
pub mod sentence;
pub mod timeline;

pub use metadata::{MetadataError, MetadataExtractor, PatternMetadataExtractor};
pub use noise::filter_noise;
pub use processor::{DocumentProcessor, ProcessingError};
pub use segmenter::{DocumentSegmenter, SegmentationError};
pub use sentence::SentenceSplitter;
pub use timeline::{estimate_tokens, TimelineBuilder, TimelineError};
