//! Orchestrator - wires discovery, decoding, matching and export.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{LogFile, MatcherConfig, RawLog, SensorTable, VideoMetadataReader, VideoTarget};
use ingestion::{
    collect_candidates, IngestionPipeline, Mp4MetadataReader, ReaderRegistry, SkippedLog,
};
use timeline_engine::{MatchingPipeline, Resolution};
use tracing::{debug, info};

use super::RunStats;
use crate::error::CliError;

/// Matcher configuration from `path`, or defaults without one
pub fn load_config(path: Option<&Path>) -> Result<MatcherConfig> {
    let Some(path) = path else {
        debug!("No configuration file, using defaults");
        return Ok(MatcherConfig::default());
    };
    if !path.exists() {
        return Err(CliError::config_not_found(path).into());
    }
    let config = ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    info!(config = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Candidate logs of one run
#[derive(Debug)]
pub struct LoadedLogs {
    pub logs: Vec<LogFile>,
    pub skipped: Vec<SkippedLog>,
}

/// Main orchestrator
pub struct Orchestrator {
    config: MatcherConfig,
    engine: Arc<MatchingPipeline>,
    video_reader: Arc<dyn VideoMetadataReader>,
    registry: ReaderRegistry,
}

impl Orchestrator {
    /// Orchestrator with the MP4 reader and the built-in log readers
    pub fn new(config: MatcherConfig) -> Self {
        let registry = ReaderRegistry::with_defaults(config.ingestion.verify_crc);
        Self::with_readers(config, Arc::new(Mp4MetadataReader), registry)
    }

    pub fn with_readers(
        config: MatcherConfig,
        video_reader: Arc<dyn VideoMetadataReader>,
        registry: ReaderRegistry,
    ) -> Self {
        Self {
            engine: Arc::new(MatchingPipeline::new(&config)),
            config,
            video_reader,
            registry,
        }
    }

    /// Capture window of the video; failure aborts the run
    pub fn read_video(&self, path: &Path) -> Result<VideoTarget> {
        let video = self.video_reader.read(path).map_err(CliError::from)?;
        info!(
            video = %video.identifier,
            range = %video.range,
            uuid = video.camera_file_uuid.as_deref().unwrap_or("-"),
            "Video capture window"
        );
        Ok(video)
    }

    /// Discover and decode candidate logs, skipping corrupt ones
    pub async fn load_logs(&self, inputs: &[PathBuf], stats: &mut RunStats) -> Result<LoadedLogs> {
        let paths = collect_candidates(inputs, &self.config.ingestion)
            .map_err(CliError::from)
            .context("Failed to list candidate logs")?;
        stats.candidates = paths.len();
        info!(candidates = paths.len(), "Candidate logs discovered");

        let pipeline = IngestionPipeline::new(self.config.ingestion.clone(), self.registry.clone());
        let engine = self.engine.clone();
        let started = Instant::now();
        let report = pipeline
            .load(paths, move |raw: RawLog| engine.partition(raw))
            .await
            .map_err(CliError::from)?;

        stats.scan_duration = started.elapsed();
        stats.scan = pipeline.metrics().snapshot();
        for log in &report.loaded {
            stats.run_metrics.record_log(log);
        }
        for _ in &report.skipped {
            stats.run_metrics.record_skip();
        }

        Ok(LoadedLogs {
            logs: report.loaded,
            skipped: report.skipped,
        })
    }

    /// Resolve the log recorded during `video`
    pub fn resolve<'a>(
        &self,
        video: &VideoTarget,
        logs: &'a [LogFile],
        stats: &mut RunStats,
    ) -> Result<Resolution<'a>> {
        let resolution = self
            .engine
            .resolve(video, logs)
            .map_err(CliError::from)?;
        stats.run_metrics.record_match(&resolution.matched.summary());
        Ok(resolution)
    }

    /// Windowed table of a resolution
    pub fn tabulate(&self, resolution: &Resolution<'_>) -> SensorTable {
        self.engine.tabulate(resolution)
    }
}
