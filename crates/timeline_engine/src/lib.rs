//! # Timeline Engine
//!
//! Correlates a video's capture window with sensor logs.
//!
//! - Session partitioning of decoded event streams
//! - Time-window matching with deterministic tie-breaks
//! - Windowed extraction and table reshape
//!
//! ## Usage
//!
//! ```ignore
//! use timeline_engine::{MatcherConfig, MatchingPipeline};
//!
//! let pipeline = MatchingPipeline::new(&MatcherConfig::default());
//! let logs: Vec<LogFile> = raw_logs
//!     .into_iter()
//!     .map(|raw| pipeline.partition(raw))
//!     .collect::<Result<_, _>>()?;
//!
//! let table = pipeline.extract_video_data(&video, &logs)?;
//! ```

mod matcher;
mod pipeline;
mod session;
mod window;

pub use matcher::{best_in_log, find_best_match, rank_matches};
pub use pipeline::{MatchStrategy, MatchingPipeline, Resolution};
pub use session::{extract_sessions, SessionExtractor};
pub use window::{extract, reshape};

// Re-export contracts types
pub use contracts::{FillPolicy, MatchResult, MatcherConfig, SessionBoundary, SensorTable};
