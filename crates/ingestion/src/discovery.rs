//! Candidate log discovery

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use contracts::{has_extension, ContractError, IngestionConfig};
use tracing::{debug, info};

/// Log files directly inside `dir` whose extension is configured.
///
/// Not recursive. Sorted by path so candidate order is stable.
pub fn discover(dir: &Path, config: &IngestionConfig) -> Result<Vec<PathBuf>, ContractError> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_candidate(&path, config) {
            found.push(path);
        }
    }
    found.sort();
    debug!(dir = %dir.display(), count = found.len(), "Scanned log directory");
    Ok(found)
}

/// Expand a mix of files and directories into the candidate set.
///
/// Explicit files are kept whatever their extension. The result is
/// de-duplicated, sorted and capped at `max_candidates`.
pub fn collect_candidates(
    inputs: &[PathBuf],
    config: &IngestionConfig,
) -> Result<Vec<PathBuf>, ContractError> {
    let mut candidates = BTreeSet::new();
    for input in inputs {
        if input.is_dir() {
            candidates.extend(discover(input, config)?);
        } else if input.is_file() {
            candidates.insert(input.clone());
        } else {
            return Err(ContractError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("log input '{}' does not exist", input.display()),
            )));
        }
    }

    let mut candidates: Vec<PathBuf> = candidates.into_iter().collect();
    if let Some(limit) = config.max_candidates {
        if candidates.len() > limit {
            info!(
                found = candidates.len(),
                limit, "Candidate set truncated to max_candidates"
            );
            candidates.truncate(limit);
        }
    }
    Ok(candidates)
}

fn is_candidate(path: &Path, config: &IngestionConfig) -> bool {
    config.extensions.iter().any(|ext| has_extension(path, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.fit");
        touch(dir.path(), "a.FIT");
        touch(dir.path(), "c.jsonl");
        touch(dir.path(), "notes.txt");
        std::fs::create_dir(dir.path().join("nested.fit")).unwrap();

        let found = discover(dir.path(), &IngestionConfig::default()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.FIT", "b.fit", "c.jsonl"]);
    }

    #[test]
    fn test_collect_caps_candidates() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["1.fit", "2.fit", "3.fit"] {
            touch(dir.path(), name);
        }
        let config = IngestionConfig {
            max_candidates: Some(2),
            ..Default::default()
        };

        let found = collect_candidates(&[dir.path().to_path_buf()], &config).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("1.fit"));
    }

    #[test]
    fn test_collect_keeps_explicit_files_once() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = touch(dir.path(), "ride.fit");
        let odd = touch(dir.path(), "export.log");

        let inputs = vec![dir.path().to_path_buf(), explicit.clone(), odd.clone()];
        let found = collect_candidates(&inputs, &IngestionConfig::default()).unwrap();
        assert_eq!(found, vec![odd, explicit]);
    }

    #[test]
    fn test_collect_missing_input() {
        let err = collect_candidates(
            &[PathBuf::from("/definitely/not/here")],
            &IngestionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::Io(_)));
    }
}
