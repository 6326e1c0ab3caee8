//! DeviceEvent - LogRecordReader output
//!
//! Device-agnostic event stream. Format-specific begin/end encodings are
//! mapped onto `Start` / `Stop` by the readers.

use serde::{Deserialize, Serialize};

use crate::{SensorRecord, Timestamp};

/// One entry of a decoded log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceEvent {
    /// Device started recording
    Start { timestamp: Timestamp },

    /// Device stopped recording
    Stop { timestamp: Timestamp },

    /// Sensor sample
    Data(SensorRecord),

    /// Camera control event (video start/end, photo, ...)
    Camera(CameraEvent),
}

impl DeviceEvent {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Start { timestamp } | Self::Stop { timestamp } => *timestamp,
            Self::Data(record) => record.timestamp,
            Self::Camera(event) => event.timestamp,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Self::Start { .. } | Self::Stop { .. })
    }
}

/// Camera event recorded by the logging device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraEvent {
    pub timestamp: Timestamp,

    pub kind: CameraEventKind,

    /// Identifier the camera also writes into the video file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_uuid: Option<String>,
}

/// Camera event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraEventKind {
    VideoStart,
    VideoSplit,
    VideoEnd,
    VideoSplitStart,
    PhotoTaken,
    Other(u8),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SensorKind;

    #[test]
    fn test_tagged_json_shape() {
        let line = r#"{"type":"start","timestamp":"2024-05-01T10:00:00Z"}"#;
        let event: DeviceEvent = serde_json::from_str(line).unwrap();
        assert!(event.is_marker());

        let line = r#"{"type":"data","timestamp":"2024-05-01T10:00:01Z","sensor_kind":"speed","fields":{"speed":4.2}}"#;
        let event: DeviceEvent = serde_json::from_str(line).unwrap();
        match event {
            DeviceEvent::Data(record) => {
                assert_eq!(record.sensor_kind, SensorKind::Speed);
                assert_eq!(record.field("speed"), Some(4.2));
            }
            other => panic!("expected data event, got {other:?}"),
        }
    }

    #[test]
    fn test_camera_event_uuid_optional() {
        let line = r#"{"type":"camera","timestamp":"2024-05-01T10:00:00Z","kind":"photo_taken"}"#;
        let event: DeviceEvent = serde_json::from_str(line).unwrap();
        match event {
            DeviceEvent::Camera(cam) => {
                assert_eq!(cam.kind, CameraEventKind::PhotoTaken);
                assert!(cam.file_uuid.is_none());
            }
            other => panic!("expected camera event, got {other:?}"),
        }
    }
}
