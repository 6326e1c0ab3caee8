//! MatchResult - TimeWindowMatcher output

use serde::Serialize;

use crate::{delta_secs, LogFile, LogId, Session, TimeRange};

/// Winning session, borrowed from the candidate set
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub log: &'a LogFile,
    pub session: &'a Session,
    /// Intersection of the target and the session range (positive length)
    pub overlap: TimeRange,
}

impl MatchResult<'_> {
    /// Owned, serializable view for reporting
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            log: self.log.identifier.clone(),
            session_index: self
                .log
                .sessions
                .iter()
                .position(|s| std::ptr::eq(s, self.session))
                .unwrap_or_default(),
            session_range: *self.session.range(),
            session_records: self.session.len(),
            overlap: self.overlap,
            overlap_secs: delta_secs(self.overlap.duration()),
        }
    }
}

/// Reporting view of a match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub log: LogId,
    pub session_index: usize,
    pub session_range: TimeRange,
    pub session_records: usize,
    pub overlap: TimeRange,
    pub overlap_secs: f64,
}
