//! Garmin FIT log reader

mod decoder;
mod header;
pub mod profile;

pub use decoder::{decode_file, FieldValue, FitMessage};
pub use header::{crc16, FitHeader};

use std::path::Path;

use contracts::{has_extension, ContractError, DeviceEvent, LogRecordReader};
use tracing::{debug, instrument};

use crate::adapters::{default_adapters, MessageAdapter};

/// `LogRecordReader` for `.fit` files
pub struct FitReader {
    verify_crc: bool,
    adapters: Vec<Box<dyn MessageAdapter>>,
}

impl FitReader {
    pub fn new(verify_crc: bool) -> Self {
        Self {
            verify_crc,
            adapters: default_adapters(),
        }
    }

    /// Decode an in-memory FIT file into device events.
    ///
    /// Camera events carry sub-second timestamps and are interleaved with
    /// whole-second records, so the output is stably sorted by time.
    pub fn decode(&self, data: &[u8]) -> crate::Result<Vec<DeviceEvent>> {
        let messages = decode_file(data, self.verify_crc)?;

        let mut events = Vec::with_capacity(messages.len());
        for message in &messages {
            if let Some(adapter) = self.adapters.iter().find(|a| a.global() == message.global) {
                adapter.adapt(message, &mut events);
            }
        }
        events.sort_by_key(DeviceEvent::timestamp);

        debug!(
            messages = messages.len(),
            events = events.len(),
            "Decoded FIT messages"
        );
        Ok(events)
    }
}

impl Default for FitReader {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LogRecordReader for FitReader {
    fn format(&self) -> &str {
        "fit"
    }

    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, "fit")
    }

    #[instrument(level = "debug", name = "fit_read", skip(self), fields(path = %path.display()))]
    fn read(&self, path: &Path) -> Result<Vec<DeviceEvent>, ContractError> {
        let data = std::fs::read(path).map_err(|source| ContractError::LogRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.decode(&data).map_err(|e| e.into_corrupt_log(path))
    }
}
