//! Run statistics.

use std::time::Duration;

use ingestion::ScanSnapshot;
use observability::RunMetricsAggregator;

/// Statistics from one command run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Candidate logs after discovery
    pub candidates: usize,

    /// Wall time spent loading candidates
    pub scan_duration: Duration,

    /// Reader-level counters
    pub scan: ScanSnapshot,

    /// Load / match / export aggregator
    pub run_metrics: RunMetricsAggregator,
}

impl RunStats {
    /// Candidate logs decoded per second
    pub fn logs_per_sec(&self) -> f64 {
        if self.scan_duration.as_secs_f64() > 0.0 {
            self.scan.logs_scanned as f64 / self.scan_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary to stderr
    pub fn print_summary(&self) {
        eprintln!();
        eprintln!("Candidates: {}", self.candidates);
        eprintln!(
            "Scan: {:.2}s ({:.1} logs/s, {} events)",
            self.scan_duration.as_secs_f64(),
            self.logs_per_sec(),
            self.scan.events_decoded
        );
        eprint!("{}", self.run_metrics.summary());
    }
}
