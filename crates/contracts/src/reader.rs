//! Collaborator traits - decoding boundary of the engine
//!
//! The engine never touches files. Readers turn a path into decoded values:
//! a `VideoTarget` for the video, a `DeviceEvent` stream for each log.

use std::path::Path;

use crate::{ContractError, DeviceEvent, VideoTarget};

/// Reads the capture window of a video container
///
/// # Errors
/// `UnreadableVideo` if the container cannot be parsed or lacks timing
/// information.
pub trait VideoMetadataReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<VideoTarget, ContractError>;
}

/// Decodes a sensor log into a time-ordered event stream
///
/// # Errors
/// - `CorruptLog` on malformed structure
/// - `LogRead` if the file cannot be read
pub trait LogRecordReader: Send + Sync {
    /// Short format name used in logs and metrics (e.g. "fit")
    fn format(&self) -> &str;

    /// Whether this reader handles the given file
    fn accepts(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> Result<Vec<DeviceEvent>, ContractError>;
}

/// Case-insensitive extension check shared by readers
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("ride.fit"), "fit"));
        assert!(has_extension(Path::new("/a/RIDE.FIT"), "fit"));
        assert!(!has_extension(Path::new("ride.fit.bak"), "fit"));
        assert!(!has_extension(Path::new("fit"), "fit"));
    }
}
