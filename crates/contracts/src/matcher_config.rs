//! MatcherConfig - Config Loader output
//!
//! Every section has defaults, so an empty document is a valid config.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Full matcher configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MatcherConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Session partitioning
    #[serde(default)]
    #[validate(nested)]
    pub session: SessionConfig,

    /// Candidate selection
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Windowed extraction / table reshape
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Log discovery and decoding
    #[serde(default)]
    #[validate(nested)]
    pub ingestion: IngestionConfig,
}

/// Session partitioning configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionConfig {
    /// How session boundaries are detected
    #[serde(default)]
    pub boundary: SessionBoundary,

    /// Sessions with fewer records are dropped
    #[serde(default = "default_min_records")]
    #[validate(range(min = 1))]
    pub min_records: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            boundary: SessionBoundary::default(),
            min_records: default_min_records(),
        }
    }
}

fn default_min_records() -> usize {
    1
}

/// Session boundary policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionBoundary {
    /// `Start` opens a session, `Stop` closes it; data with no open session
    /// opens an implicit one
    #[default]
    DeviceEvents,
    /// Ignore markers, the whole log is one session
    Whole,
    /// Ignore markers, split where consecutive samples are further apart
    /// than `max_gap_s`
    TimeGap { max_gap_s: f64 },
}

/// Candidate selection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Try logs whose camera events reference the video's camera file UUID
    /// before falling back to the plain time-window match. Off by default.
    #[serde(default)]
    pub use_camera_uuid: bool,
}

/// Extraction configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Gap handling in the reshaped table
    #[serde(default)]
    pub fill: FillPolicy,
}

/// How table cells without a sample are filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Leave an explicit "no value"
    #[default]
    None,
    /// Repeat the last observed value of the column
    Forward,
}

/// Log discovery and decoding configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IngestionConfig {
    /// Log file extensions considered candidates (case-insensitive)
    #[serde(default = "default_extensions")]
    #[validate(length(min = 1))]
    pub extensions: Vec<String>,

    /// Upper bound on the number of candidate logs scanned
    #[serde(default)]
    #[validate(range(min = 1))]
    pub max_candidates: Option<usize>,

    /// Parallel decode workers
    #[serde(default = "default_workers")]
    #[validate(range(min = 1, max = 256))]
    pub workers: usize,

    /// Verify FIT header and file CRCs
    #[serde(default = "default_true")]
    pub verify_crc: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            max_candidates: None,
            workers: default_workers(),
            verify_crc: true,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["fit".to_string(), "jsonl".to_string()]
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(16)
}

fn default_true() -> bool {
    true
}
