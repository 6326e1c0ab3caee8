//! FIT profile subset: message and field numbers, base types, unit scaling.

use contracts::{timestamp_from_secs, Timestamp};

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z)
pub const FIT_EPOCH_OFFSET: i64 = 631_065_600;

/// Field number carrying the message timestamp, common to all messages
pub const FIELD_TIMESTAMP: u8 = 253;

pub mod mesg {
    pub const RECORD: u16 = 20;
    pub const EVENT: u16 = 21;
    pub const CAMERA_EVENT: u16 = 161;
}

pub mod record {
    pub const POSITION_LAT: u8 = 0;
    pub const POSITION_LONG: u8 = 1;
    pub const ALTITUDE: u8 = 2;
    pub const HEART_RATE: u8 = 3;
    pub const CADENCE: u8 = 4;
    pub const DISTANCE: u8 = 5;
    pub const SPEED: u8 = 6;
    pub const POWER: u8 = 7;
    pub const TEMPERATURE: u8 = 13;
    pub const ENHANCED_SPEED: u8 = 73;
    pub const ENHANCED_ALTITUDE: u8 = 78;
}

pub mod event {
    pub const EVENT: u8 = 0;
    pub const EVENT_TYPE: u8 = 1;

    /// `event` value of the activity timer
    pub const TIMER: u64 = 0;

    pub const TYPE_START: u64 = 0;
    pub const TYPE_STOP: u64 = 1;
    pub const TYPE_STOP_ALL: u64 = 4;
    pub const TYPE_STOP_DISABLE: u64 = 5;
    pub const TYPE_STOP_DISABLE_ALL: u64 = 9;
}

pub mod camera_event {
    pub const TIMESTAMP_MS: u8 = 0;
    pub const CAMERA_EVENT_TYPE: u8 = 1;
    pub const CAMERA_FILE_UUID: u8 = 2;
}

/// Base type numbers (low five bits of the base type byte)
pub mod base {
    pub const ENUM: u8 = 0x00;
    pub const SINT8: u8 = 0x01;
    pub const UINT8: u8 = 0x02;
    pub const SINT16: u8 = 0x03;
    pub const UINT16: u8 = 0x04;
    pub const SINT32: u8 = 0x05;
    pub const UINT32: u8 = 0x06;
    pub const STRING: u8 = 0x07;
    pub const FLOAT32: u8 = 0x08;
    pub const FLOAT64: u8 = 0x09;
    pub const UINT8Z: u8 = 0x0A;
    pub const UINT16Z: u8 = 0x0B;
    pub const UINT32Z: u8 = 0x0C;
    pub const BYTE: u8 = 0x0D;
    pub const SINT64: u8 = 0x0E;
    pub const UINT64: u8 = 0x0F;
    pub const UINT64Z: u8 = 0x10;
}

/// Semicircles (2^31 per 180°) to degrees
pub fn semicircles_to_degrees(value: f64) -> f64 {
    value * (180.0 / 2_147_483_648.0)
}

/// Stored altitude (`/5 - 500`) to metres
pub fn altitude_m(value: f64) -> f64 {
    value / 5.0 - 500.0
}

/// Stored speed (mm/s) to m/s
pub fn speed_mps(value: f64) -> f64 {
    value / 1000.0
}

/// Stored distance (cm) to metres
pub fn distance_m(value: f64) -> f64 {
    value / 100.0
}

/// FIT `date_time` seconds to an absolute instant
pub fn fit_timestamp(value: u32) -> Option<Timestamp> {
    timestamp_from_secs(i64::from(value) + FIT_EPOCH_OFFSET)
}
