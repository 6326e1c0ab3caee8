//! `event` (21) adapter: activity timer start/stop markers

use contracts::DeviceEvent;

use super::MessageAdapter;
use crate::fit::profile::{self, event, mesg};
use crate::fit::FitMessage;

pub struct TimerEventAdapter;

impl MessageAdapter for TimerEventAdapter {
    fn global(&self) -> u16 {
        mesg::EVENT
    }

    fn adapt(&self, message: &FitMessage, out: &mut Vec<DeviceEvent>) {
        let Some(timestamp) = message.timestamp.and_then(profile::fit_timestamp) else {
            return;
        };
        if message.unsigned(event::EVENT) != Some(event::TIMER) {
            return;
        }

        match message.unsigned(event::EVENT_TYPE) {
            Some(event::TYPE_START) => out.push(DeviceEvent::Start { timestamp }),
            Some(
                event::TYPE_STOP
                | event::TYPE_STOP_ALL
                | event::TYPE_STOP_DISABLE
                | event::TYPE_STOP_DISABLE_ALL,
            ) => out.push(DeviceEvent::Stop { timestamp }),
            _ => {}
        }
    }
}
