//! Run orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{load_config, LoadedLogs, Orchestrator};
pub use stats::RunStats;
