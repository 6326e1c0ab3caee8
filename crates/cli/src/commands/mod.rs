//! Command implementations.

mod extract;
mod find_log;
mod sessions;
mod validate;

pub use extract::run_extract;
pub use find_log::run_find_log;
pub use sessions::run_sessions;
pub use validate::run_validate;

use anyhow::Result;
use config_loader::ConfigLoader;
use contracts::MatcherConfig;
use tracing::info;

use crate::cli::MatchArgs;

/// Apply command-line overrides and re-validate
fn apply_match_overrides(config: &mut MatcherConfig, args: &MatchArgs) -> Result<()> {
    if let Some(workers) = args.workers {
        info!(workers, "Overriding ingestion.workers from CLI");
        config.ingestion.workers = workers;
    }
    if let Some(max) = args.max_candidates {
        info!(max_candidates = max, "Overriding ingestion.max_candidates from CLI");
        config.ingestion.max_candidates = Some(max);
    }
    if args.camera_uuid {
        config.matching.use_camera_uuid = true;
    }
    ConfigLoader::validate(config)?;
    Ok(())
}
