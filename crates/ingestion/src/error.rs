//! Ingestion error types

use std::path::Path;

use contracts::ContractError;
use thiserror::Error;

/// Decode failure inside a single log or video file
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Input ended before a structure was complete
    #[error("unexpected end of data at offset {offset}: {needed} more bytes required")]
    Truncated { offset: usize, needed: usize },

    /// FIT header signature is not `.FIT`
    #[error("missing .FIT signature")]
    BadSignature,

    /// FIT header size other than 12 or 14
    #[error("unsupported FIT header size {0}")]
    HeaderSize(u8),

    /// Stored and computed CRC differ
    #[error("{scope} CRC mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    CrcMismatch {
        scope: &'static str,
        stored: u16,
        computed: u16,
    },

    /// Data message refers to a local type with no definition
    #[error("data message at offset {offset} uses undefined local type {local_type}")]
    UndefinedLocalType { offset: usize, local_type: u8 },

    /// JSONL line is not a valid event
    #[error("line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Structure is present but unusable
    #[error("{0}")]
    Malformed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestionError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Attach the log path, producing a skippable `CorruptLog`
    pub fn into_corrupt_log(self, path: &Path) -> ContractError {
        ContractError::corrupt_log(path, self.to_string())
    }

    /// Attach the video path, producing `UnreadableVideo`
    pub fn into_unreadable_video(self, path: &Path) -> ContractError {
        ContractError::unreadable_video(path, self.to_string())
    }
}

/// Ingestion Result alias
pub type Result<T> = std::result::Result<T, IngestionError>;

/// Fails with `Truncated` unless `buf` holds at least `needed` bytes.
pub(crate) fn ensure(buf: &[u8], needed: usize, offset: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(IngestionError::Truncated {
            offset,
            needed: needed - buf.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_corrupt_log_is_skippable() {
        let err = IngestionError::BadSignature.into_corrupt_log(Path::new("a.fit"));
        assert!(err.is_skippable());
        assert!(err.to_string().contains("a.fit"));
        assert!(err.to_string().contains(".FIT signature"));
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(&[1, 2, 3], 3, 0).is_ok());
        match ensure(&[1, 2], 5, 10) {
            Err(IngestionError::Truncated { offset, needed }) => {
                assert_eq!(offset, 10);
                assert_eq!(needed, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
