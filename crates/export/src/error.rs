//! Export error types

use contracts::ContractError;
use thiserror::Error;

/// Export-specific errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Output format could not be determined
    #[error("cannot infer output format for '{0}', pass it explicitly")]
    UnknownFormat(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Attribute a write-path failure to a sink
    pub fn into_sink_write(self, sink_name: &str) -> ContractError {
        ContractError::sink_write(sink_name, self.to_string())
    }
}

impl From<ExportError> for ContractError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::SinkCreation { name, message } => ContractError::sink_write(name, message),
            ExportError::Io(e) => ContractError::Io(e),
            other => ContractError::Other(other.to_string()),
        }
    }
}
