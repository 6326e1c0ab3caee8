//! JsonSink - table as a JSON document

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use contracts::{ContractError, SensorTable, TableSink};
use serde_json::{json, Map, Value};
use tracing::{debug, error, instrument};

use super::format_timestamp;
use crate::error::ExportError;

/// Sink that writes
/// `{"columns": [...], "rows": [{"timestamp": ..., "<kind.field>": value|null}]}`.
///
/// Tables are buffered and the document is written on flush, so several
/// writes with the same columns end up in one document.
pub struct JsonSink {
    name: String,
    path: PathBuf,
    pretty: bool,
    columns: Vec<String>,
    rows: Vec<Value>,
    dirty: bool,
}

impl JsonSink {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            pretty: true,
            columns: Vec::new(),
            rows: Vec::new(),
            dirty: false,
        }
    }

    /// Create from params map (for factory): `path`, optional `pretty`
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ExportError> {
        let name = name.into();
        let path = params
            .get("path")
            .ok_or_else(|| ExportError::sink_creation(&name, "missing 'path' parameter"))?;
        let mut sink = Self::new(name, path);
        sink.pretty = params.get("pretty").map_or(true, |v| v != "false");
        Ok(sink)
    }

    fn buffer(&mut self, table: &SensorTable) -> Result<(), ExportError> {
        let columns: Vec<String> = table.columns.iter().map(ToString::to_string).collect();
        if self.rows.is_empty() {
            self.columns = columns;
        } else if columns != self.columns {
            return Err(ExportError::sink_creation(
                &self.name,
                "table columns differ from the buffered document",
            ));
        }

        for row in &table.rows {
            let mut object = Map::with_capacity(self.columns.len() + 1);
            object.insert("timestamp".into(), json!(format_timestamp(row.timestamp)));
            for (column, value) in self.columns.iter().zip(&row.values) {
                object.insert(column.clone(), json!(value));
            }
            self.rows.push(Value::Object(object));
        }
        self.dirty = true;
        Ok(())
    }

    fn persist(&mut self) -> Result<(), ExportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let document = json!({
            "columns": self.columns,
            "rows": self.rows,
        });
        let writer = BufWriter::new(File::create(&self.path)?);
        if self.pretty {
            serde_json::to_writer_pretty(writer, &document)?;
        } else {
            serde_json::to_writer(writer, &document)?;
        }
        self.dirty = false;
        Ok(())
    }
}

impl TableSink for JsonSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "json_sink_write",
        skip(self, table),
        fields(sink = %self.name, rows = table.row_count())
    )]
    async fn write(&mut self, table: &SensorTable) -> Result<(), ContractError> {
        self.buffer(table).map_err(|e| e.into_sink_write(&self.name))
    }

    #[instrument(name = "json_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if !self.dirty {
            return Ok(());
        }
        self.persist().map_err(|e| {
            error!(sink = %self.name, error = %e, "Write failed");
            e.into_sink_write(&self.name)
        })
    }

    #[instrument(name = "json_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        debug!(sink = %self.name, rows = self.rows.len(), "JsonSink closed");
        Ok(())
    }
}
