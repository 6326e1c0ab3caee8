//! `record` (20) adapter

use contracts::{DeviceEvent, SensorKind, SensorRecord, Timestamp};

use super::MessageAdapter;
use crate::fit::profile::{self, mesg, record};
use crate::fit::FitMessage;

/// Fans one `record` message out into per-sensor records sharing its
/// timestamp, scaled to SI units.
pub struct RecordAdapter;

impl MessageAdapter for RecordAdapter {
    fn global(&self) -> u16 {
        mesg::RECORD
    }

    fn adapt(&self, message: &FitMessage, out: &mut Vec<DeviceEvent>) {
        let Some(timestamp) = message.timestamp.and_then(profile::fit_timestamp) else {
            return;
        };
        let sample = |kind: SensorKind, field: &str, value: f64| {
            DeviceEvent::Data(SensorRecord::new(timestamp, kind).with_field(field, value))
        };

        if let Some(gps) = position(message, timestamp) {
            out.push(DeviceEvent::Data(gps));
        }

        let altitude = message
            .number(record::ENHANCED_ALTITUDE)
            .or_else(|| message.number(record::ALTITUDE))
            .map(|v| sample(SensorKind::Altimeter, "altitude", profile::altitude_m(v)));
        let speed = message
            .number(record::ENHANCED_SPEED)
            .or_else(|| message.number(record::SPEED))
            .map(|v| sample(SensorKind::Speed, "speed", profile::speed_mps(v)));
        let distance = message
            .number(record::DISTANCE)
            .map(|v| sample(SensorKind::Distance, "distance", profile::distance_m(v)));
        let heart_rate = message
            .number(record::HEART_RATE)
            .map(|v| sample(SensorKind::HeartRate, "heart_rate", v));
        let cadence = message
            .number(record::CADENCE)
            .map(|v| sample(SensorKind::Cadence, "cadence", v));
        let power = message
            .number(record::POWER)
            .map(|v| sample(SensorKind::Power, "power", v));
        let temperature = message
            .number(record::TEMPERATURE)
            .map(|v| sample(SensorKind::Temperature, "temperature", v));

        out.extend(
            [altitude, speed, distance, heart_rate, cadence, power, temperature]
                .into_iter()
                .flatten(),
        );
    }
}

/// Position fix, only when both coordinates are valid
fn position(message: &FitMessage, timestamp: Timestamp) -> Option<SensorRecord> {
    let lat = message.number(record::POSITION_LAT)?;
    let long = message.number(record::POSITION_LONG)?;
    Some(
        SensorRecord::new(timestamp, SensorKind::Gps)
            .with_field("latitude", profile::semicircles_to_degrees(lat))
            .with_field("longitude", profile::semicircles_to_degrees(long)),
    )
}
