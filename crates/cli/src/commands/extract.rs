//! `extract` command implementation.

use anyhow::{Context, Result};
use contracts::MatcherConfig;
use export::{create_sink, export_table, sink_config_for_output};
use tracing::{info, warn};

use super::apply_match_overrides;
use crate::cli::ExtractArgs;
use crate::error::CliError;
use crate::pipeline::{Orchestrator, RunStats};

/// Execute the `extract` command
pub async fn run_extract(args: &ExtractArgs, mut config: MatcherConfig) -> Result<()> {
    if let Some(fill) = args.fill {
        config.extraction.fill = fill.into();
    }
    apply_match_overrides(&mut config, &args.target)?;

    // fail on an unusable output before any decoding work
    let sink_config = sink_config_for_output(&args.output, args.format.map(Into::into))
        .map_err(CliError::from)?;

    let orchestrator = Orchestrator::new(config);
    let mut stats = RunStats::default();

    let video = orchestrator.read_video(&args.target.video)?;
    let loaded = orchestrator
        .load_logs(&args.target.log_dirs, &mut stats)
        .await?;
    let resolution = orchestrator.resolve(&video, &loaded.logs, &mut stats)?;

    let table = orchestrator.tabulate(&resolution);
    if table.is_empty() {
        warn!(
            log = %resolution.log_id(),
            "No records inside the capture window, writing header only"
        );
    }

    let mut sink = create_sink(&sink_config).map_err(CliError::from)?;
    let rows = export_table(&mut sink, &table)
        .await
        .map_err(CliError::from)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    stats.run_metrics.record_export(rows);

    info!(
        log = %resolution.log_id(),
        strategy = resolution.strategy.as_str(),
        rows,
        output = %args.output.display(),
        "Extraction complete"
    );
    println!(
        "{}\t{} rows\t{}",
        resolution.log_id(),
        rows,
        args.output.display()
    );

    if args.target.stats {
        stats.print_summary();
    }
    Ok(())
}
