//! SensorRecord - decoded telemetry sample
//!
//! One record per sensor per sampling instant. A single log message
//! (e.g. a FIT `record`) may fan out into several records sharing a timestamp.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::Timestamp;

/// Sensor kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Position fix (degrees)
    Gps,
    /// Altitude (metres)
    Altimeter,
    /// Ground speed (m/s)
    Speed,
    /// Cumulative distance (metres)
    Distance,
    /// Heart rate (bpm)
    HeartRate,
    /// Cadence (rpm)
    Cadence,
    /// Power (watts)
    Power,
    /// Temperature (°C)
    Temperature,
    /// Device-specific kind
    Other(u16),
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gps => f.write_str("gps"),
            Self::Altimeter => f.write_str("altimeter"),
            Self::Speed => f.write_str("speed"),
            Self::Distance => f.write_str("distance"),
            Self::HeartRate => f.write_str("heart_rate"),
            Self::Cadence => f.write_str("cadence"),
            Self::Power => f.write_str("power"),
            Self::Temperature => f.write_str("temperature"),
            Self::Other(code) => write!(f, "other_{code}"),
        }
    }
}

/// Decoded sensor sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Absolute sample time
    pub timestamp: Timestamp,

    /// Which sensor produced the sample
    pub sensor_kind: SensorKind,

    /// Field name -> value, in SI units
    pub fields: BTreeMap<String, f64>,
}

impl SensorRecord {
    pub fn new(timestamp: Timestamp, sensor_kind: SensorKind) -> Self {
        Self {
            timestamp,
            sensor_kind,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}
