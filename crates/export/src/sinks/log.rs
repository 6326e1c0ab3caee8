//! LogSink - logs table summary via tracing

use contracts::{ContractError, SensorTable, TableSink};
use tracing::{info, instrument};

use super::format_timestamp;

/// Sink that logs table summaries, for dry runs
pub struct LogSink {
    name: String,
    tables: usize,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: 0,
        }
    }

    fn log_table_summary(&self, table: &SensorTable) {
        let first = table.rows.first().map(|r| format_timestamp(r.timestamp));
        let last = table.rows.last().map(|r| format_timestamp(r.timestamp));
        let filled = table
            .rows
            .iter()
            .flat_map(|r| &r.values)
            .filter(|v| v.is_some())
            .count();

        info!(
            sink = %self.name,
            rows = table.row_count(),
            columns = table.columns.len(),
            cells = filled,
            first = first.as_deref().unwrap_or("-"),
            last = last.as_deref().unwrap_or("-"),
            "SensorTable received"
        );
    }
}

impl TableSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_write", skip(self, table), fields(sink = %self.name))]
    async fn write(&mut self, table: &SensorTable) -> Result<(), ContractError> {
        self.tables += 1;
        self.log_table_summary(table);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, tables = self.tables, "LogSink closed");
        Ok(())
    }
}
