//! Parallel candidate loading
//!
//! Each candidate is read and partitioned on the blocking pool, at most
//! `workers` at a time. Results come back in candidate order whatever the
//! completion order, so downstream tie-breaks stay deterministic.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use contracts::{ContractError, IngestionConfig, LogFile, LogId, RawLog};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::metrics::ScanMetrics;
use crate::registry::ReaderRegistry;

/// Candidate that could not be used, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLog {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of loading a candidate set
#[derive(Debug, Default)]
pub struct IngestionReport {
    /// Partitioned logs, in candidate order
    pub loaded: Vec<LogFile>,
    pub skipped: Vec<SkippedLog>,
}

type LoadOutcome = (usize, PathBuf, String, Result<LogFile, ContractError>);

/// Ingestion Pipeline
///
/// Turns candidate paths into partitioned `LogFile`s. Corrupt or unreadable
/// logs are skipped and reported, and so is a log whose decode panics; any
/// other error aborts the scan.
pub struct IngestionPipeline {
    config: IngestionConfig,
    registry: Arc<ReaderRegistry>,
    metrics: Arc<ScanMetrics>,
}

impl IngestionPipeline {
    pub fn new(config: IngestionConfig, registry: ReaderRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            metrics: Arc::new(ScanMetrics::new()),
        }
    }

    /// Pipeline with the built-in readers
    pub fn with_default_readers(config: IngestionConfig) -> Self {
        let registry = ReaderRegistry::with_defaults(config.verify_crc);
        Self::new(config, registry)
    }

    pub fn metrics(&self) -> Arc<ScanMetrics> {
        self.metrics.clone()
    }

    pub fn registry(&self) -> &ReaderRegistry {
        &self.registry
    }

    /// Decode every candidate and hand the raw log to `partition`.
    ///
    /// # Errors
    /// The first non-skippable error from a reader or from `partition`
    /// (e.g. `UnsortedInput`). Remaining tasks are aborted.
    #[instrument(
        name = "ingestion_load",
        skip(self, paths, partition),
        fields(candidates = paths.len(), workers = self.config.workers)
    )]
    pub async fn load<F>(
        &self,
        paths: Vec<PathBuf>,
        partition: F,
    ) -> Result<IngestionReport, ContractError>
    where
        F: Fn(RawLog) -> Result<LogFile, ContractError> + Send + Sync + 'static,
    {
        let started = Instant::now();
        let candidates = paths.len();
        let partition = Arc::new(partition);
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut tasks: JoinSet<LoadOutcome> = JoinSet::new();

        for (index, path) in paths.into_iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ContractError::Other(format!("worker pool closed: {e}")))?;
            let registry = self.registry.clone();
            let metrics = self.metrics.clone();
            let partition = partition.clone();

            tasks.spawn_blocking(move || {
                let _permit = permit;
                let (format, outcome) = panic::catch_unwind(AssertUnwindSafe(|| {
                    load_one(&registry, &metrics, &path, partition.as_ref())
                }))
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    (
                        registry
                            .reader_for(&path)
                            .map_or_else(|| "unknown".to_string(), |r| r.format().to_string()),
                        Err(ContractError::corrupt_log(
                            &path,
                            format!("decoder panicked: {message}"),
                        )),
                    )
                });
                (index, path, format, outcome)
            });
        }

        let mut loaded: Vec<(usize, LogFile)> = Vec::with_capacity(candidates);
        let mut skipped: Vec<(usize, SkippedLog)> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (index, path, format, outcome) = joined
                .map_err(|e| ContractError::Other(format!("decode task failed: {e}")))?;

            match outcome {
                Ok(log) => {
                    observability::record_log_scanned(&format, "loaded");
                    loaded.push((index, log));
                }
                Err(e) if e.is_skippable() => {
                    warn!(path = %path.display(), error = %e, "Skipping candidate log");
                    observability::record_log_scanned(&format, "skipped");
                    self.metrics.record_skipped();
                    skipped.push((
                        index,
                        SkippedLog {
                            path,
                            reason: e.to_string(),
                        },
                    ));
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        loaded.sort_by_key(|(index, _)| *index);
        skipped.sort_by_key(|(index, _)| *index);

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        observability::record_scan_duration_ms(elapsed_ms, candidates);
        info!(
            candidates,
            loaded = loaded.len(),
            skipped = skipped.len(),
            elapsed_ms = format!("{:.1}", elapsed_ms),
            "Candidate logs loaded"
        );

        Ok(IngestionReport {
            loaded: loaded.into_iter().map(|(_, log)| log).collect(),
            skipped: skipped.into_iter().map(|(_, s)| s).collect(),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn load_one<F>(
    registry: &ReaderRegistry,
    metrics: &ScanMetrics,
    path: &Path,
    partition: &F,
) -> (String, Result<LogFile, ContractError>)
where
    F: Fn(RawLog) -> Result<LogFile, ContractError>,
{
    let Some(reader) = registry.reader_for(path) else {
        return (
            "unknown".to_string(),
            Err(ContractError::corrupt_log(path, "no reader for this file type")),
        );
    };
    let format = reader.format().to_string();
    metrics.record_scanned();

    let outcome = reader.read(path).and_then(|events| {
        let count = events.len();
        let log = partition(RawLog {
            id: LogId::from_path(path),
            events,
        })?;
        metrics.record_loaded(count);
        debug!(
            path = %path.display(),
            events = count,
            sessions = log.sessions.len(),
            "Candidate log partitioned"
        );
        Ok(log)
    });
    (format, outcome)
}
