//! Layered error definitions
//!
//! Categorized by source: config / collaborator / engine / sink

use std::path::PathBuf;

use thiserror::Error;

use crate::Timestamp;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Collaborator Errors =====
    /// Log file has a malformed binary or text structure
    #[error("corrupt log '{}': {message}", path.display())]
    CorruptLog { path: PathBuf, message: String },

    /// Log file could not be read from disk
    #[error("failed to read log '{}': {source}", path.display())]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Video container could not be parsed
    #[error("unreadable video '{}': {message}", path.display())]
    UnreadableVideo { path: PathBuf, message: String },

    // ===== Engine Errors =====
    /// Event stream is not sorted by timestamp
    #[error("unsorted input at event {index}: {current} precedes {previous}")]
    UnsortedInput {
        index: usize,
        previous: Timestamp,
        current: Timestamp,
    },

    /// Range whose start is after its end
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidRange { start: Timestamp, end: Timestamp },

    /// No candidate session overlaps the video
    #[error("no log overlaps the capture window of video '{video}'")]
    NoMatch { video: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create corrupt log error
    pub fn corrupt_log(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptLog {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create unreadable video error
    pub fn unreadable_video(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::UnreadableVideo {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create no-match error
    pub fn no_match(video: impl Into<String>) -> Self {
        Self::NoMatch {
            video: video.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether a candidate log failing with this error can be skipped
    /// while matching continues against the remaining candidates.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::CorruptLog { .. } | Self::LogRead { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skippable_classification() {
        assert!(ContractError::corrupt_log("a.fit", "bad header").is_skippable());
        assert!(ContractError::LogRead {
            path: "a.fit".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .is_skippable());

        assert!(!ContractError::no_match("clip.mp4").is_skippable());
        assert!(!ContractError::unreadable_video("clip.mp4", "no moov").is_skippable());
        assert!(!ContractError::UnsortedInput {
            index: 3,
            previous: Timestamp::UNIX_EPOCH,
            current: Timestamp::UNIX_EPOCH,
        }
        .is_skippable());
    }

    #[test]
    fn test_display_includes_path() {
        let err = ContractError::corrupt_log("/logs/ride.fit", "missing .FIT signature");
        let msg = err.to_string();
        assert!(msg.contains("/logs/ride.fit"), "got: {msg}");
        assert!(msg.contains("signature"), "got: {msg}");
    }
}
