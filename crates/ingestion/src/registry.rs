//! Reader lookup by file type

use std::path::Path;
use std::sync::Arc;

use contracts::LogRecordReader;

use crate::fit::FitReader;
use crate::jsonl::JsonlLogReader;

/// Ordered set of log readers; the first reader accepting a path wins.
#[derive(Clone, Default)]
pub struct ReaderRegistry {
    readers: Vec<Arc<dyn LogRecordReader>>,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// FIT and JSON Lines readers
    pub fn with_defaults(verify_crc: bool) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FitReader::new(verify_crc)));
        registry.register(Arc::new(JsonlLogReader));
        registry
    }

    pub fn register(&mut self, reader: Arc<dyn LogRecordReader>) -> &mut Self {
        self.readers.push(reader);
        self
    }

    pub fn reader_for(&self, path: &Path) -> Option<Arc<dyn LogRecordReader>> {
        self.readers.iter().find(|r| r.accepts(path)).cloned()
    }

    pub fn formats(&self) -> Vec<&str> {
        self.readers.iter().map(|r| r.format()).collect()
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl std::fmt::Debug for ReaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookup() {
        let registry = ReaderRegistry::with_defaults(true);
        assert_eq!(registry.formats(), vec!["fit", "jsonl"]);
        assert_eq!(
            registry.reader_for(Path::new("ride.FIT")).unwrap().format(),
            "fit"
        );
        assert_eq!(
            registry.reader_for(Path::new("ride.jsonl")).unwrap().format(),
            "jsonl"
        );
        assert!(registry.reader_for(Path::new("ride.gpx")).is_none());
    }

    #[test]
    fn test_first_registered_wins() {
        let mut registry = ReaderRegistry::new();
        registry
            .register(Arc::new(JsonlLogReader))
            .register(Arc::new(crate::mock::MockLogReader::new("jsonl")));
        assert_eq!(
            registry.reader_for(Path::new("a.jsonl")).unwrap().format(),
            "jsonl"
        );
        assert_eq!(registry.len(), 2);
    }
}
