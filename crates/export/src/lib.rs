//! # Export
//!
//! Table output.
//!
//! Responsibilities:
//! - Write an extracted `SensorTable` as CSV or JSON
//! - Summarize a table through tracing
//! - Build a sink from `SinkConfig` and drive write / flush / close

pub mod error;
pub mod exporter;
pub mod sinks;

pub use contracts::{SensorTable, TableSink};
pub use error::ExportError;
pub use exporter::{create_sink, export_table, sink_config_for_output, Sink};
pub use sinks::{CsvSink, JsonSink, LogSink};
