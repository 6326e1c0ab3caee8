//! `camera_event` (161) adapter

use chrono::TimeDelta;
use contracts::{CameraEvent, CameraEventKind, DeviceEvent};

use super::MessageAdapter;
use crate::fit::profile::{self, camera_event, mesg};
use crate::fit::FitMessage;

pub struct CameraEventAdapter;

impl MessageAdapter for CameraEventAdapter {
    fn global(&self) -> u16 {
        mesg::CAMERA_EVENT
    }

    fn adapt(&self, message: &FitMessage, out: &mut Vec<DeviceEvent>) {
        let Some(seconds) = message.timestamp.and_then(profile::fit_timestamp) else {
            return;
        };
        let Some(code) = message.unsigned(camera_event::CAMERA_EVENT_TYPE) else {
            return;
        };
        let millis = message.unsigned(camera_event::TIMESTAMP_MS).unwrap_or(0);

        out.push(DeviceEvent::Camera(CameraEvent {
            timestamp: seconds + TimeDelta::milliseconds(millis.min(999) as i64),
            kind: camera_event_kind(code),
            file_uuid: message
                .text(camera_event::CAMERA_FILE_UUID)
                .map(str::to_string),
        }));
    }
}

fn camera_event_kind(code: u64) -> CameraEventKind {
    match code {
        0 => CameraEventKind::VideoStart,
        1 => CameraEventKind::VideoSplit,
        2 => CameraEventKind::VideoEnd,
        3 => CameraEventKind::PhotoTaken,
        7 => CameraEventKind::VideoSplitStart,
        other => CameraEventKind::Other(other.min(u64::from(u8::MAX)) as u8),
    }
}
