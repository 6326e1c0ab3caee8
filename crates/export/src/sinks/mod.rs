//! Sink implementations
//!
//! Contains CsvSink, JsonSink, and LogSink.

mod csv;
mod json;
mod log;

pub use self::csv::{CsvSink, CsvSinkConfig};
pub use self::json::JsonSink;
pub use self::log::LogSink;

use chrono::SecondsFormat;
use contracts::Timestamp;

/// Timestamp cell text: RFC 3339, millisecond precision, `Z` suffix
pub(crate) fn format_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
