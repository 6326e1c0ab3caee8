//! FIT message adapters
//!
//! Each adapter turns one FIT message type into `DeviceEvent`s.

mod camera;
mod event;
mod record;

pub use camera::CameraEventAdapter;
pub use event::TimerEventAdapter;
pub use record::RecordAdapter;

use contracts::DeviceEvent;

use crate::fit::FitMessage;

/// Maps decoded messages of one global message number to device events
pub trait MessageAdapter: Send + Sync {
    /// Global message number handled
    fn global(&self) -> u16;

    /// Append the events carried by `message`. Messages without a usable
    /// timestamp produce nothing.
    fn adapt(&self, message: &FitMessage, out: &mut Vec<DeviceEvent>);
}

/// Adapters for `record`, `event` and `camera_event`
pub fn default_adapters() -> Vec<Box<dyn MessageAdapter>> {
    vec![
        Box::new(RecordAdapter),
        Box::new(TimerEventAdapter),
        Box::new(CameraEventAdapter),
    ]
}
