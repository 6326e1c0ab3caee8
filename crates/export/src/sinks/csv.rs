//! CsvSink - one row per timestamp, one column per `kind.field`

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::PathBuf;

use contracts::{ContractError, SensorTable, TableSink};
use tracing::{debug, error, instrument};

use super::format_timestamp;
use crate::error::ExportError;

/// Configuration for CsvSink
#[derive(Debug, Clone)]
pub struct CsvSinkConfig {
    pub path: PathBuf,
    pub delimiter: u8,
}

impl CsvSinkConfig {
    /// `path` is required; `delimiter` defaults to tab for `.tsv`, comma
    /// otherwise.
    pub fn from_params(name: &str, params: &HashMap<String, String>) -> Result<Self, ExportError> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .ok_or_else(|| ExportError::sink_creation(name, "missing 'path' parameter"))?;

        let delimiter = match params.get("delimiter").map(String::as_str) {
            Some("\\t" | "tab") => b'\t',
            Some(d) if d.len() == 1 => d.as_bytes()[0],
            Some(d) => {
                return Err(ExportError::sink_creation(
                    name,
                    format!("delimiter must be a single byte, got '{d}'"),
                ))
            }
            None if contracts::has_extension(&path, "tsv") => b'\t',
            None => b',',
        };

        Ok(Self { path, delimiter })
    }
}

/// Sink that writes tables to a delimited text file.
///
/// The file is created on the first write. Later writes append rows and
/// must carry the same columns.
pub struct CsvSink {
    name: String,
    config: CsvSinkConfig,
    writer: Option<csv::Writer<File>>,
    header: Vec<String>,
    rows_written: usize,
}

impl CsvSink {
    pub fn new(name: impl Into<String>, config: CsvSinkConfig) -> Self {
        Self {
            name: name.into(),
            config,
            writer: None,
            header: Vec::new(),
            rows_written: 0,
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ExportError> {
        let name = name.into();
        let config = CsvSinkConfig::from_params(&name, params)?;
        Ok(Self::new(name, config))
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    fn write_table(&mut self, table: &SensorTable) -> Result<(), ExportError> {
        let header = table.header();

        let writer = match &mut self.writer {
            Some(writer) => {
                if header != self.header {
                    return Err(ExportError::sink_creation(
                        &self.name,
                        "table columns differ from the header already written",
                    ));
                }
                writer
            }
            slot @ None => {
                if let Some(parent) = self.config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let mut writer = csv::WriterBuilder::new()
                    .delimiter(self.config.delimiter)
                    .from_path(&self.config.path)?;
                writer.write_record(&header)?;
                self.header = header;
                slot.insert(writer)
            }
        };

        for row in &table.rows {
            let mut record = Vec::with_capacity(row.values.len() + 1);
            record.push(format_timestamp(row.timestamp));
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        self.rows_written += table.row_count();
        Ok(())
    }
}

impl TableSink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_write",
        skip(self, table),
        fields(sink = %self.name, rows = table.row_count())
    )]
    async fn write(&mut self, table: &SensorTable) -> Result<(), ContractError> {
        self.write_table(table).map_err(|e| {
            error!(sink = %self.name, error = %e, "Write failed");
            e.into_sink_write(&self.name)
        })
    }

    #[instrument(name = "csv_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(writer) = &mut self.writer {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "csv_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        self.writer = None;
        debug!(
            sink = %self.name,
            path = %self.config.path.display(),
            rows = self.rows_written,
            "CsvSink closed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{timestamp_from_secs, ColumnKey, SensorKind, TableRow};
    use tempfile::tempdir;

    fn table() -> SensorTable {
        SensorTable {
            columns: vec![
                ColumnKey::new(SensorKind::Gps, "latitude"),
                ColumnKey::new(SensorKind::HeartRate, "heart_rate"),
            ],
            rows: vec![
                TableRow {
                    timestamp: timestamp_from_secs(1_700_000_000).unwrap(),
                    values: vec![Some(45.5), Some(120.0)],
                },
                TableRow {
                    timestamp: timestamp_from_secs(1_700_000_001).unwrap(),
                    values: vec![None, Some(121.0)],
                },
            ],
        }
    }

    fn params(path: &std::path::Path) -> HashMap<String, String> {
        HashMap::from([("path".to_string(), path.display().to_string())])
    }

    #[tokio::test]
    async fn test_csv_sink_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/clip.csv");

        let mut sink = CsvSink::from_params("csv", &params(&path)).unwrap();
        sink.write(&table()).await.unwrap();
        sink.close().await.unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,gps.latitude,heart_rate.heart_rate");
        assert_eq!(lines[1], "2023-11-14T22:13:20.000Z,45.5,120");
        assert_eq!(lines[2], "2023-11-14T22:13:21.000Z,,121");
        assert_eq!(sink.rows_written(), 2);
    }

    #[tokio::test]
    async fn test_tsv_delimiter_from_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.tsv");

        let mut sink = CsvSink::from_params("tsv", &params(&path)).unwrap();
        sink.write(&table()).await.unwrap();
        sink.close().await.unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("timestamp\tgps.latitude\t"));
    }

    #[tokio::test]
    async fn test_mismatched_columns_rejected() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::from_params("csv", &params(&dir.path().join("a.csv"))).unwrap();
        sink.write(&table()).await.unwrap();

        let other = SensorTable {
            columns: vec![ColumnKey::new(SensorKind::Power, "power")],
            rows: Vec::new(),
        };
        let err = sink.write(&other).await.unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }));
    }

    #[test]
    fn test_missing_path_param() {
        assert!(CsvSink::from_params("csv", &HashMap::new()).is_err());
    }
}
