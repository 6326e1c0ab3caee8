//! Session / LogFile - SessionExtractor output
//!
//! A log is partitioned into recording sessions; each session owns its
//! time-ordered records.

use serde::Serialize;

use crate::{
    CameraEvent, CameraEventKind, ContractError, DeviceEvent, LogId, SensorRecord, TimeRange,
};

/// Contiguous recording interval of one log
///
/// Records are sorted by timestamp and non-empty; `range` spans the first
/// and last record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    range: TimeRange,
    records: Vec<SensorRecord>,
}

impl Session {
    /// Build a session from time-ordered records.
    ///
    /// # Errors
    /// - `UnsortedInput` if a timestamp decreases
    /// - `Other` if `records` is empty
    pub fn new(records: Vec<SensorRecord>) -> Result<Self, ContractError> {
        if let Some(index) = records
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(ContractError::UnsortedInput {
                index: index + 1,
                previous: records[index].timestamp,
                current: records[index + 1].timestamp,
            });
        }

        let (first, last) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => {
                return Err(ContractError::Other(
                    "session must contain at least one record".to_string(),
                ))
            }
        };

        Ok(Self {
            range: TimeRange::new(first, last)?,
            records,
        })
    }

    #[inline]
    pub fn range(&self) -> &TimeRange {
        &self.range
    }

    #[inline]
    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decoded but not yet partitioned log
#[derive(Debug, Clone)]
pub struct RawLog {
    pub id: LogId,
    pub events: Vec<DeviceEvent>,
}

/// Partitioned candidate log
#[derive(Debug, Clone, Serialize)]
pub struct LogFile {
    /// Path or name of the log
    pub identifier: LogId,

    /// Sessions in chronological order (possibly none)
    pub sessions: Vec<Session>,

    /// Camera events found in the log
    pub camera_events: Vec<CameraEvent>,
}

impl LogFile {
    pub fn new(identifier: impl Into<LogId>, sessions: Vec<Session>) -> Self {
        Self {
            identifier: identifier.into(),
            sessions,
            camera_events: Vec::new(),
        }
    }

    pub fn with_camera_events(mut self, camera_events: Vec<CameraEvent>) -> Self {
        self.camera_events = camera_events;
        self
    }

    /// Total number of records across sessions
    pub fn record_count(&self) -> usize {
        self.sessions.iter().map(Session::len).sum()
    }

    /// Range from the first session start to the last session end
    pub fn span(&self) -> Option<TimeRange> {
        let start = self.sessions.iter().map(|s| s.range().start()).min()?;
        let end = self.sessions.iter().map(|s| s.range().end()).max()?;
        TimeRange::new(start, end).ok()
    }

    /// Whether any camera event carries this file UUID
    pub fn references_camera_file(&self, uuid: &str) -> bool {
        self.camera_events
            .iter()
            .any(|e| e.file_uuid.as_deref() == Some(uuid))
    }

    /// Capture window the log recorded for a camera file:
    /// first `VideoStart` to last `VideoEnd` carrying `uuid`.
    pub fn camera_window(&self, uuid: &str) -> Option<TimeRange> {
        let tagged = || {
            self.camera_events
                .iter()
                .filter(move |e| e.file_uuid.as_deref() == Some(uuid))
        };

        let start = tagged()
            .filter(|e| e.kind == CameraEventKind::VideoStart)
            .map(|e| e.timestamp)
            .min()?;
        let end = tagged()
            .filter(|e| e.kind == CameraEventKind::VideoEnd)
            .map(|e| e.timestamp)
            .max()?;

        TimeRange::new(start, end).ok()
    }
}
