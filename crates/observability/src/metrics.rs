//! Run metrics
//!
//! Prometheus counters for log scanning, matching and export, plus an
//! in-memory aggregator for the end-of-run summary.

use contracts::{LogFile, MatchSummary};
use metrics::{counter, gauge, histogram};

/// Record the outcome of decoding one candidate log.
///
/// `status` is `loaded` or `skipped`.
pub fn record_log_scanned(format: &str, status: &str) {
    counter!(
        "fitclip_logs_scanned_total",
        "format" => format.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record sessions found in a partitioned log
pub fn record_sessions_extracted(log: &LogFile) {
    counter!("fitclip_sessions_extracted_total").increment(log.sessions.len() as u64);
    counter!("fitclip_records_decoded_total").increment(log.record_count() as u64);
}

/// Record a resolved match.
///
/// `strategy` names how the log was chosen (`camera_uuid` or `time_window`).
pub fn record_match(strategy: &str, overlap_secs: f64) {
    counter!(
        "fitclip_matches_total",
        "strategy" => strategy.to_string()
    )
    .increment(1);
    histogram!("fitclip_match_overlap_seconds").record(overlap_secs);
}

/// Record a video without any overlapping session
pub fn record_no_match() {
    counter!("fitclip_no_match_total").increment(1);
}

/// Record wall time spent decoding the candidate set
pub fn record_scan_duration_ms(elapsed_ms: f64, candidates: usize) {
    histogram!("fitclip_scan_duration_ms").record(elapsed_ms);
    gauge!("fitclip_scan_candidates").set(candidates as f64);
}

/// Record rows written by a sink
pub fn record_rows_exported(sink_name: &str, rows: usize, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "fitclip_tables_exported_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    if success {
        counter!(
            "fitclip_rows_exported_total",
            "sink" => sink_name.to_string()
        )
        .increment(rows as u64);
    }
}

/// Run metrics aggregator
///
/// Collects what the Prometheus counters export, in memory, for the
/// summary printed at the end of a command.
#[derive(Debug, Clone, Default)]
pub struct RunMetricsAggregator {
    pub logs_loaded: u64,
    pub logs_skipped: u64,
    pub sessions: u64,
    pub records: u64,
    pub matches: u64,
    pub rows_exported: u64,
    /// Records per session
    pub session_size_stats: RunningStats,
    /// Overlap of resolved matches (seconds)
    pub overlap_stats: RunningStats,
}

impl RunMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_log(&mut self, log: &LogFile) {
        self.logs_loaded += 1;
        self.sessions += log.sessions.len() as u64;
        self.records += log.record_count() as u64;
        for session in &log.sessions {
            self.session_size_stats.push(session.len() as f64);
        }
    }

    pub fn record_skip(&mut self) {
        self.logs_skipped += 1;
    }

    pub fn record_match(&mut self, summary: &MatchSummary) {
        self.matches += 1;
        self.overlap_stats.push(summary.overlap_secs);
    }

    pub fn record_export(&mut self, rows: usize) {
        self.rows_exported += rows as u64;
    }

    pub fn summary(&self) -> RunSummary {
        let scanned = self.logs_loaded + self.logs_skipped;
        RunSummary {
            logs_loaded: self.logs_loaded,
            logs_skipped: self.logs_skipped,
            skip_rate: if scanned > 0 {
                self.logs_skipped as f64 / scanned as f64 * 100.0
            } else {
                0.0
            },
            sessions: self.sessions,
            records: self.records,
            matches: self.matches,
            rows_exported: self.rows_exported,
            session_size: StatsSummary::from(&self.session_size_stats),
            overlap_secs: StatsSummary::from(&self.overlap_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// End-of-run summary
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub logs_loaded: u64,
    pub logs_skipped: u64,
    pub skip_rate: f64,
    pub sessions: u64,
    pub records: u64,
    pub matches: u64,
    pub rows_exported: u64,
    pub session_size: StatsSummary,
    pub overlap_secs: StatsSummary,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Run Summary ===")?;
        writeln!(f, "Logs loaded: {}", self.logs_loaded)?;
        writeln!(
            f,
            "Logs skipped: {} ({:.2}%)",
            self.logs_skipped, self.skip_rate
        )?;
        writeln!(f, "Sessions: {} ({} records)", self.sessions, self.records)?;
        writeln!(f, "Session size: {}", self.session_size)?;
        writeln!(f, "Matches: {}", self.matches)?;
        writeln!(f, "Overlap (s): {}", self.overlap_secs)?;
        writeln!(f, "Rows exported: {}", self.rows_exported)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
