//! # Ingestion
//!
//! Decoding boundary of the matcher.
//!
//! Responsibilities:
//! - Decode FIT activity files and JSON Lines logs into `DeviceEvent` streams
//! - Read the capture window and camera file UUID of MP4 videos
//! - Discover candidate logs and load them in parallel, skipping corrupt ones
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{collect_candidates, IngestionPipeline, Mp4MetadataReader};
//! use contracts::VideoMetadataReader;
//!
//! let video = Mp4MetadataReader.read(Path::new("GX010042.MP4"))?;
//! let paths = collect_candidates(&[logs_dir], &config.ingestion)?;
//!
//! let pipeline = IngestionPipeline::with_default_readers(config.ingestion.clone());
//! let report = pipeline.load(paths, move |raw| engine.partition(raw)).await?;
//! ```

mod adapters;
mod discovery;
mod error;
pub mod fit;
mod jsonl;
mod metrics;
mod mock;
mod mp4;
mod pipeline;
mod registry;

// Re-exports
pub use discovery::{collect_candidates, discover};
pub use error::{IngestionError, Result};
pub use fit::FitReader;
pub use jsonl::JsonlLogReader;
pub use metrics::{ScanMetrics, ScanSnapshot};
pub use mock::{mp4_file, FitFileBuilder, FitSample, MockLogReader, MockVideoReader};
pub use mp4::{MovieHeader, Mp4MetadataReader, MP4_EPOCH_OFFSET};
pub use pipeline::{IngestionPipeline, IngestionReport, SkippedLog};
pub use registry::ReaderRegistry;
