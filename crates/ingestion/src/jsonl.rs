//! JSON Lines log reader
//!
//! One tagged `DeviceEvent` per line, e.g.
//! `{"type":"data","timestamp":"2024-05-01T10:00:01Z","sensor_kind":"speed","fields":{"speed":4.2}}`.
//! Blank lines are ignored; anything else that fails to parse makes the
//! whole log corrupt.

use std::io::BufRead;
use std::path::Path;

use contracts::{has_extension, ContractError, DeviceEvent, LogRecordReader};
use tracing::instrument;

use crate::error::{IngestionError, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonlLogReader;

impl JsonlLogReader {
    pub fn parse<R: BufRead>(input: R) -> Result<Vec<DeviceEvent>> {
        let mut events = Vec::new();
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line).map_err(|source| IngestionError::JsonLine {
                line: index + 1,
                source,
            })?;
            events.push(event);
        }
        Ok(events)
    }
}

impl LogRecordReader for JsonlLogReader {
    fn format(&self) -> &str {
        "jsonl"
    }

    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, "jsonl") || has_extension(path, "ndjson")
    }

    #[instrument(level = "debug", name = "jsonl_read", skip(self), fields(path = %path.display()))]
    fn read(&self, path: &Path) -> std::result::Result<Vec<DeviceEvent>, ContractError> {
        let file = std::fs::File::open(path).map_err(|source| ContractError::LogRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(std::io::BufReader::new(file)).map_err(|e| e.into_corrupt_log(path))
    }
}
