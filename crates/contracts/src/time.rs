//! Time model
//!
//! All timestamps are absolute UTC instants. Durations are `TimeDelta`.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Absolute UTC instant
pub type Timestamp = DateTime<Utc>;

/// Closed time interval `[start, end]` with `start <= end`.
///
/// Immutable once constructed; deserialization goes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: Timestamp,
    end: Timestamp,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: Timestamp,
    end: Timestamp,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = ContractError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        TimeRange::new(raw.start, raw.end)
    }
}

impl TimeRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ContractError> {
        if start > end {
            return Err(ContractError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a range from a start instant and a non-negative length.
    pub fn from_start(start: Timestamp, length: TimeDelta) -> Result<Self, ContractError> {
        Self::new(start, start + length)
    }

    /// Zero-length range at a single instant
    pub fn instant(at: Timestamp) -> Self {
        Self { start: at, end: at }
    }

    #[inline]
    pub fn start(&self) -> Timestamp {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Timestamp {
        self.end
    }

    #[inline]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Inclusive containment: `start <= t <= end`
    #[inline]
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t <= self.end
    }

    /// Whether `other` lies entirely inside this range
    pub fn covers(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Signed overlap length: `min(ends) - max(starts)`.
    ///
    /// Zero or negative means the ranges do not really overlap; the magnitude
    /// of a negative value is the gap between them.
    pub fn overlap_duration(&self, other: &TimeRange) -> TimeDelta {
        self.end.min(other.end) - self.start.max(other.start)
    }

    /// Intersection with strictly positive length, if any.
    pub fn overlap(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeRange { start, end })
    }

    /// Absolute distance between the two start instants
    pub fn start_distance(&self, other: &TimeRange) -> TimeDelta {
        (self.start - other.start).abs()
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}]",
            self.start.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            self.end.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        )
    }
}

/// Signed length in fractional seconds (millisecond resolution)
pub fn delta_secs(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

/// Timestamp at `secs` seconds after the Unix epoch.
///
/// Convenience for fixtures and for formats that store whole seconds.
pub fn timestamp_from_secs(secs: i64) -> Option<Timestamp> {
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        timestamp_from_secs(secs).unwrap()
    }

    fn range(a: i64, b: i64) -> TimeRange {
        TimeRange::new(ts(a), ts(b)).unwrap()
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = TimeRange::new(ts(10), ts(5)).unwrap_err();
        assert!(matches!(err, ContractError::InvalidRange { .. }));
    }

    #[test]
    fn test_overlap_inside() {
        let session = range(500, 700);
        let video = range(550, 650);
        assert_eq!(session.overlap(&video), Some(video));
        assert_eq!(session.overlap_duration(&video), TimeDelta::seconds(100));
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        let a = range(100, 200);
        let b = range(200, 300);
        assert_eq!(a.overlap_duration(&b), TimeDelta::zero());
        assert!(a.overlap(&b).is_none());
    }

    #[test]
    fn test_disjoint_overlap_is_negative() {
        let a = range(0, 10);
        let b = range(100, 200);
        assert_eq!(a.overlap_duration(&b), TimeDelta::seconds(-90));
        assert!(a.overlap(&b).is_none());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let r = range(550, 650);
        assert!(r.contains(ts(550)));
        assert!(r.contains(ts(650)));
        assert!(!r.contains(ts(651)));
    }

    #[test]
    fn test_deserialize_checks_order() {
        let ok: Result<TimeRange, _> = serde_json::from_str(
            r#"{"start":"2024-05-01T10:00:00Z","end":"2024-05-01T10:05:00Z"}"#,
        );
        assert!(ok.is_ok());

        let bad: Result<TimeRange, _> = serde_json::from_str(
            r#"{"start":"2024-05-01T10:05:00Z","end":"2024-05-01T10:00:00Z"}"#,
        );
        assert!(bad.is_err());
    }
}
