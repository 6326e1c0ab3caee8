//! VideoTarget - VideoMetadataReader output

use serde::{Deserialize, Serialize};

use crate::TimeRange;

/// Video whose capture window is being correlated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoTarget {
    /// Path or name of the video
    pub identifier: String,

    /// Absolute capture window (creation time + duration)
    pub range: TimeRange,

    /// Camera file UUID embedded in the container, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_file_uuid: Option<String>,
}

impl VideoTarget {
    pub fn new(identifier: impl Into<String>, range: TimeRange) -> Self {
        Self {
            identifier: identifier.into(),
            range,
            camera_file_uuid: None,
        }
    }

    pub fn with_camera_file_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.camera_file_uuid = Some(uuid.into());
        self
    }
}
