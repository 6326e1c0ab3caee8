//! TableSink trait - export output interface
//!
//! Defines the abstract interface for Sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ContractError, SensorTable};

/// Table output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(TableSink: Send)]
pub trait LocalTableSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write extracted table
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, table: &SensorTable) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Delimited text, one row per timestamp
    Csv,
    /// JSON document with columns and rows
    Json,
    /// Summary through tracing only
    Log,
}

impl SinkType {
    /// Infer from an output path extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" | "tsv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    pub name: String,
    pub sink_type: SinkType,
    /// Sink-specific parameters (e.g. "path", "delimiter")
    #[serde(default)]
    pub params: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_type_from_extension() {
        assert_eq!(SinkType::from_extension("CSV"), Some(SinkType::Csv));
        assert_eq!(SinkType::from_extension("json"), Some(SinkType::Json));
        assert_eq!(SinkType::from_extension("parquet"), None);
    }
}
