//! Session partitioning of a decoded event stream.

use chrono::TimeDelta;
use contracts::{
    ContractError, DeviceEvent, SensorRecord, Session, SessionBoundary, SessionConfig, Timestamp,
};
use tracing::{debug, instrument};

/// Splits one log's events into recording sessions
#[derive(Debug, Clone)]
pub struct SessionExtractor {
    config: SessionConfig,
}

impl SessionExtractor {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Partition `events` into sessions.
    ///
    /// Session ranges span their first and last data record; marker
    /// timestamps never widen a range. Sessions shorter than
    /// `min_records` are dropped.
    ///
    /// # Errors
    /// `UnsortedInput` if any event timestamp decreases; `ConfigValidation`
    /// for a time-gap boundary that is not a positive number of seconds.
    #[instrument(
        level = "debug",
        name = "extract_sessions",
        skip(self, events),
        fields(events = events.len(), boundary = ?self.config.boundary)
    )]
    pub fn extract(&self, events: Vec<DeviceEvent>) -> Result<Vec<Session>, ContractError> {
        ensure_sorted(&events)?;

        let groups = match self.config.boundary {
            SessionBoundary::DeviceEvents => split_on_markers(events),
            SessionBoundary::Whole => vec![data_records(events).collect()],
            SessionBoundary::TimeGap { max_gap_s } => split_on_gaps(events, gap_delta(max_gap_s)?),
        };

        let min_records = self.config.min_records.max(1);
        let mut sessions = Vec::with_capacity(groups.len());
        let mut dropped = 0usize;
        for group in groups {
            if group.len() < min_records {
                dropped += 1;
                continue;
            }
            sessions.push(Session::new(group)?);
        }

        debug!(
            sessions = sessions.len(),
            dropped,
            min_records,
            "Partitioned event stream"
        );
        Ok(sessions)
    }
}

impl Default for SessionExtractor {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Session gap as a duration; must be finite and positive
fn gap_delta(max_gap_s: f64) -> Result<TimeDelta, ContractError> {
    let invalid = || {
        ContractError::config_validation(
            "session.boundary.max_gap_s",
            format!("gap must be a positive number of seconds, got {max_gap_s}"),
        )
    };
    if !max_gap_s.is_finite() || max_gap_s <= 0.0 {
        return Err(invalid());
    }
    TimeDelta::try_milliseconds((max_gap_s * 1000.0) as i64).ok_or_else(invalid)
}

/// Partition with the given boundary policy and default `min_records`.
pub fn extract_sessions(
    events: Vec<DeviceEvent>,
    boundary: SessionBoundary,
) -> Result<Vec<Session>, ContractError> {
    SessionExtractor::new(SessionConfig {
        boundary,
        ..SessionConfig::default()
    })
    .extract(events)
}

fn ensure_sorted(events: &[DeviceEvent]) -> Result<(), ContractError> {
    let mut previous: Option<Timestamp> = None;
    for (index, event) in events.iter().enumerate() {
        let current = event.timestamp();
        if let Some(previous) = previous {
            if current < previous {
                return Err(ContractError::UnsortedInput {
                    index,
                    previous,
                    current,
                });
            }
        }
        previous = Some(current);
    }
    Ok(())
}

fn data_records(events: Vec<DeviceEvent>) -> impl Iterator<Item = SensorRecord> {
    events.into_iter().filter_map(|event| match event {
        DeviceEvent::Data(record) => Some(record),
        _ => None,
    })
}

/// `Start` closes the open session and opens a new one, `Stop` closes it,
/// data with nothing open starts an implicit session.
fn split_on_markers(events: Vec<DeviceEvent>) -> Vec<Vec<SensorRecord>> {
    let mut groups = Vec::new();
    let mut current: Option<Vec<SensorRecord>> = None;

    for event in events {
        match event {
            DeviceEvent::Start { .. } => {
                if let Some(group) = current.replace(Vec::new()) {
                    groups.push(group);
                }
            }
            DeviceEvent::Stop { .. } => {
                if let Some(group) = current.take() {
                    groups.push(group);
                }
            }
            DeviceEvent::Data(record) => current.get_or_insert_with(Vec::new).push(record),
            DeviceEvent::Camera(_) => {}
        }
    }

    groups.extend(current);
    groups
}

fn split_on_gaps(events: Vec<DeviceEvent>, max_gap: TimeDelta) -> Vec<Vec<SensorRecord>> {
    let mut groups: Vec<Vec<SensorRecord>> = Vec::new();

    for record in data_records(events) {
        match groups.last_mut() {
            Some(group)
                if group
                    .last()
                    .is_some_and(|last| record.timestamp - last.timestamp <= max_gap) =>
            {
                group.push(record)
            }
            _ => groups.push(vec![record]),
        }
    }

    groups
}
