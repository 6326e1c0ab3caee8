//! `sessions` command implementation.

use anyhow::{Context, Result};
use contracts::{delta_secs, LogId, MatcherConfig, RawLog, Timestamp};
use serde::Serialize;
use timeline_engine::MatchingPipeline;
use tracing::info;

use crate::cli::SessionsArgs;
use crate::error::CliError;
use ingestion::ReaderRegistry;

#[derive(Serialize)]
struct SessionRow {
    index: usize,
    start: Timestamp,
    end: Timestamp,
    duration_s: f64,
    records: usize,
}

#[derive(Serialize)]
struct SessionsOutput {
    log: String,
    format: String,
    sessions: Vec<SessionRow>,
    camera_files: Vec<String>,
}

/// Execute the `sessions` command
pub fn run_sessions(args: &SessionsArgs, config: MatcherConfig) -> Result<()> {
    let registry = ReaderRegistry::with_defaults(config.ingestion.verify_crc);
    let reader = registry
        .reader_for(&args.log)
        .ok_or_else(|| CliError::no_reader(&args.log))?;

    let events = reader.read(&args.log).map_err(CliError::from)?;
    let log = MatchingPipeline::new(&config)
        .partition(RawLog {
            id: LogId::from_path(&args.log),
            events,
        })
        .map_err(CliError::from)?;
    info!(log = %log.identifier, sessions = log.sessions.len(), "Log partitioned");

    let mut camera_files: Vec<String> = log
        .camera_events
        .iter()
        .filter_map(|e| e.file_uuid.clone())
        .collect();
    camera_files.sort();
    camera_files.dedup();

    let output = SessionsOutput {
        log: log.identifier.to_string(),
        format: reader.format().to_string(),
        sessions: log
            .sessions
            .iter()
            .enumerate()
            .map(|(index, s)| SessionRow {
                index,
                start: s.range().start(),
                end: s.range().end(),
                duration_s: delta_secs(s.range().duration()),
                records: s.len(),
            })
            .collect(),
        camera_files,
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize sessions")?;
        println!("{}", json);
        return Ok(());
    }

    println!("{} ({}, {} sessions)", output.log, output.format, output.sessions.len());
    for row in &output.sessions {
        println!(
            "  #{:<3} {} .. {}  {:>8.1}s  {} records",
            row.index,
            row.start.to_rfc3339(),
            row.end.to_rfc3339(),
            row.duration_s,
            row.records
        );
    }
    for uuid in &output.camera_files {
        println!("  camera file: {}", uuid);
    }
    Ok(())
}
