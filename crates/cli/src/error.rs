//! Error types for CLI operations.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// `validate` without a path and without `--config`
    #[error("No configuration file given (pass a path or --config)")]
    MissingConfigPath,

    /// No registered reader handles the file
    #[error("No log reader for '{}'", path.display())]
    NoReader { path: PathBuf },

    /// Engine, reader or sink failure
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),

    /// Sink setup failure
    #[error(transparent)]
    Export(#[from] export::ExportError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn no_reader(path: impl Into<PathBuf>) -> Self {
        Self::NoReader { path: path.into() }
    }
}
