//! `find-log` command implementation.

use anyhow::{Context, Result};
use contracts::{LogFile, MatchSummary, MatcherConfig, TimeRange};
use serde::Serialize;
use timeline_engine::{rank_matches, MatchStrategy, Resolution};

use super::apply_match_overrides;
use crate::cli::FindLogArgs;
use crate::pipeline::{Orchestrator, RunStats};

#[derive(Serialize)]
struct FindLogOutput {
    video: String,
    capture_window: TimeRange,
    log: String,
    strategy: MatchStrategy,
    target: TimeRange,
    session: MatchSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ranked: Vec<MatchSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<SkippedOutput>,
}

#[derive(Serialize)]
struct SkippedOutput {
    path: String,
    reason: String,
}

/// Every overlapping session, ranked against the window the winner was
/// chosen against
fn ranked_candidates(resolution: &Resolution<'_>, logs: &[LogFile]) -> Vec<MatchSummary> {
    rank_matches(&resolution.target, logs)
        .iter()
        .map(|m| m.summary())
        .collect()
}

/// Execute the `find-log` command
pub async fn run_find_log(args: &FindLogArgs, mut config: MatcherConfig) -> Result<()> {
    apply_match_overrides(&mut config, &args.target)?;
    let orchestrator = Orchestrator::new(config);
    let mut stats = RunStats::default();

    let video = orchestrator.read_video(&args.target.video)?;
    let loaded = orchestrator
        .load_logs(&args.target.log_dirs, &mut stats)
        .await?;
    let resolution = orchestrator.resolve(&video, &loaded.logs, &mut stats)?;

    let ranked: Vec<MatchSummary> = if args.all {
        ranked_candidates(&resolution, &loaded.logs)
    } else {
        Vec::new()
    };

    if args.json {
        let output = FindLogOutput {
            video: video.identifier.clone(),
            capture_window: video.range,
            log: resolution.log_id().to_string(),
            strategy: resolution.strategy,
            target: resolution.target,
            session: resolution.matched.summary(),
            ranked,
            skipped: loaded
                .skipped
                .iter()
                .map(|s| SkippedOutput {
                    path: s.path.display().to_string(),
                    reason: s.reason.clone(),
                })
                .collect(),
        };
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize match result")?;
        println!("{}", json);
    } else if args.all {
        for summary in &ranked {
            println!(
                "{}\tsession {}\t{}\toverlap {:.1}s",
                summary.log, summary.session_index, summary.session_range, summary.overlap_secs
            );
        }
    } else {
        println!("{}", resolution.log_id());
    }

    if args.target.stats {
        stats.print_summary();
    }
    Ok(())
}
