//! Sink factory and export driver

use std::collections::HashMap;
use std::path::Path;

use contracts::{ContractError, SensorTable, SinkConfig, SinkType, TableSink};
use tracing::{info, instrument};

use crate::error::ExportError;
use crate::sinks::{CsvSink, JsonSink, LogSink};

/// Any configured sink
pub enum Sink {
    Csv(CsvSink),
    Json(JsonSink),
    Log(LogSink),
}

impl TableSink for Sink {
    fn name(&self) -> &str {
        match self {
            Self::Csv(s) => s.name(),
            Self::Json(s) => s.name(),
            Self::Log(s) => s.name(),
        }
    }

    async fn write(&mut self, table: &SensorTable) -> Result<(), ContractError> {
        match self {
            Self::Csv(s) => s.write(table).await,
            Self::Json(s) => s.write(table).await,
            Self::Log(s) => s.write(table).await,
        }
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Csv(s) => s.flush().await,
            Self::Json(s) => s.flush().await,
            Self::Log(s) => s.flush().await,
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Csv(s) => s.close().await,
            Self::Json(s) => s.close().await,
            Self::Log(s) => s.close().await,
        }
    }
}

/// Create a sink from configuration
#[instrument(
    name = "export_create_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub fn create_sink(config: &SinkConfig) -> Result<Sink, ExportError> {
    Ok(match config.sink_type {
        SinkType::Csv => Sink::Csv(CsvSink::from_params(&config.name, &config.params)?),
        SinkType::Json => Sink::Json(JsonSink::from_params(&config.name, &config.params)?),
        SinkType::Log => Sink::Log(LogSink::new(&config.name)),
    })
}

/// Sink configuration for an output file.
///
/// `format` wins over the extension; without either the format cannot be
/// chosen.
pub fn sink_config_for_output(
    path: &Path,
    format: Option<SinkType>,
) -> Result<SinkConfig, ExportError> {
    let sink_type = format
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(SinkType::from_extension)
        })
        .ok_or_else(|| ExportError::UnknownFormat(path.display().to_string()))?;

    let name = match sink_type {
        SinkType::Csv => "csv",
        SinkType::Json => "json",
        SinkType::Log => "log",
    };
    Ok(SinkConfig {
        name: name.to_string(),
        sink_type,
        params: HashMap::from([("path".to_string(), path.display().to_string())]),
    })
}

/// Write, flush and close. Returns the number of rows exported.
#[instrument(
    name = "export_table",
    skip(sink, table),
    fields(sink = %sink.name(), rows = table.row_count())
)]
pub async fn export_table<S: TableSink>(
    sink: &mut S,
    table: &SensorTable,
) -> Result<usize, ContractError> {
    let result = async {
        sink.write(table).await?;
        sink.flush().await?;
        sink.close().await
    }
    .await;

    let rows = table.row_count();
    observability::record_rows_exported(sink.name(), rows, result.is_ok());
    result?;

    info!(
        sink = %sink.name(),
        rows,
        columns = table.columns.len(),
        "Table exported"
    );
    Ok(rows)
}
