//! SensorTable - extraction output
//!
//! Flat, timestamp-indexed view of a record set. One column per distinct
//! `(sensor_kind, field)` pair; `None` marks a column not sampled at a row's
//! timestamp.

use serde::Serialize;
use std::fmt;

use crate::{SensorKind, Timestamp};

/// Column identity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ColumnKey {
    pub kind: SensorKind,
    pub field: String,
}

impl ColumnKey {
    pub fn new(kind: SensorKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
        }
    }
}

/// Header form: `<kind>.<field>`
impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.field)
    }
}

/// One timestamp worth of values, aligned with `SensorTable::columns`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub timestamp: Timestamp,
    pub values: Vec<Option<f64>>,
}

/// Extracted telemetry table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorTable {
    pub columns: Vec<ColumnKey>,
    pub rows: Vec<TableRow>,
}

impl SensorTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, kind: SensorKind, field: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.kind == kind && c.field == field)
    }

    /// Value at `(row, kind.field)`; `None` for no value or unknown column
    pub fn value(&self, row: usize, kind: SensorKind, field: &str) -> Option<f64> {
        let col = self.column_index(kind, field)?;
        self.rows.get(row)?.values.get(col).copied().flatten()
    }

    /// Header names, timestamp first
    pub fn header(&self) -> Vec<String> {
        std::iter::once("timestamp".to_string())
            .chain(self.columns.iter().map(ToString::to_string))
            .collect()
    }
}
