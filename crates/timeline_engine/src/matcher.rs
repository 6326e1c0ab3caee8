//! Time-window matching of a target range against candidate sessions.
//!
//! Each log contributes at most one candidate (its best session); the
//! winner is the candidate with the largest positive overlap. Ties go to the
//! session whose start lies closest to the target start, then to the
//! lexicographically smallest log identifier.

use std::cmp::Ordering;

use chrono::TimeDelta;
use contracts::{LogFile, MatchResult, Session, TimeRange};

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    log: &'a LogFile,
    session: &'a Session,
    overlap: TimeRange,
    start_distance: TimeDelta,
}

impl<'a> Candidate<'a> {
    fn new(target: &TimeRange, log: &'a LogFile, session: &'a Session) -> Option<Self> {
        let overlap = target.overlap(session.range())?;
        Some(Self {
            log,
            session,
            overlap,
            start_distance: target.start_distance(session.range()),
        })
    }

    /// `Less` means `self` ranks ahead of `other`
    fn rank(&self, other: &Self) -> Ordering {
        other
            .overlap
            .duration()
            .cmp(&self.overlap.duration())
            .then(self.start_distance.cmp(&other.start_distance))
            .then_with(|| self.log.identifier.cmp(&other.log.identifier))
    }

    /// Keeps the incumbent on a full tie, so earlier sessions win inside a log
    fn better(self, challenger: Self) -> Self {
        if challenger.rank(&self) == Ordering::Less {
            challenger
        } else {
            self
        }
    }

    fn into_result(self) -> MatchResult<'a> {
        MatchResult {
            log: self.log,
            session: self.session,
            overlap: self.overlap,
        }
    }
}

/// Best overlapping session of a single log
pub fn best_in_log<'a>(target: &TimeRange, log: &'a LogFile) -> Option<MatchResult<'a>> {
    best_candidate(target, log).map(Candidate::into_result)
}

fn best_candidate<'a>(target: &TimeRange, log: &'a LogFile) -> Option<Candidate<'a>> {
    log.sessions
        .iter()
        .filter_map(|session| Candidate::new(target, log, session))
        .reduce(Candidate::better)
}

/// Best session across all candidate logs.
///
/// `None` when no session overlaps the target by a strictly positive
/// duration (touching endpoints do not count). The result does not depend
/// on the order of `logs`.
pub fn find_best_match<'a>(target: &TimeRange, logs: &'a [LogFile]) -> Option<MatchResult<'a>> {
    logs.iter()
        .filter_map(|log| best_candidate(target, log))
        .reduce(Candidate::better)
        .map(Candidate::into_result)
}

/// Every overlapping session across all logs, best first
pub fn rank_matches<'a>(target: &TimeRange, logs: &'a [LogFile]) -> Vec<MatchResult<'a>> {
    let mut candidates: Vec<Candidate<'a>> = logs
        .iter()
        .flat_map(|log| {
            log.sessions
                .iter()
                .filter_map(move |session| Candidate::new(target, log, session))
        })
        .collect();

    // stable: equal candidates keep session order
    candidates.sort_by(Candidate::rank);
    candidates.into_iter().map(Candidate::into_result).collect()
}
