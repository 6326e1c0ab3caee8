//! `validate` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{has_extension, MatcherConfig, SessionBoundary};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Extensions the built-in readers decode
const KNOWN_EXTENSIONS: [&str; 3] = ["fit", "jsonl", "ndjson"];

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    boundary: String,
    min_records: usize,
    use_camera_uuid: bool,
    fill: String,
    extensions: Vec<String>,
    workers: usize,
    max_candidates: Option<usize>,
    verify_crc: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs, global_config: Option<&Path>) -> Result<()> {
    let path = args
        .path
        .as_deref()
        .or(global_config)
        .ok_or(CliError::MissingConfigPath)?;
    info!(config = %path.display(), "Validating configuration");

    let result = validate_config(path);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(path: &Path) -> ValidationResult {
    let config_path = path.display().to_string();

    if !path.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(CliError::config_not_found(path).to_string()),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(path) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(summarize(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(config: &MatcherConfig) -> ConfigSummary {
    ConfigSummary {
        version: format!("{:?}", config.version),
        boundary: match config.session.boundary {
            SessionBoundary::DeviceEvents => "device_events".to_string(),
            SessionBoundary::Whole => "whole".to_string(),
            SessionBoundary::TimeGap { max_gap_s } => format!("time_gap ({max_gap_s}s)"),
        },
        min_records: config.session.min_records,
        use_camera_uuid: config.matching.use_camera_uuid,
        fill: format!("{:?}", config.extraction.fill).to_lowercase(),
        extensions: config.ingestion.extensions.clone(),
        workers: config.ingestion.workers,
        max_candidates: config.ingestion.max_candidates,
        verify_crc: config.ingestion.verify_crc,
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &MatcherConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    for ext in &config.ingestion.extensions {
        let probe = Path::new("probe").with_extension(ext);
        if !KNOWN_EXTENSIONS.iter().any(|known| has_extension(&probe, known)) {
            warnings.push(format!(
                "No built-in reader for '.{}' files - they will be skipped",
                ext
            ));
        }
    }

    if !config.ingestion.verify_crc {
        warnings.push("ingestion.verify_crc is off - damaged FIT files may decode".to_string());
    }

    if config.session.boundary == SessionBoundary::Whole && config.session.min_records > 1 {
        warnings.push(
            "session.min_records applies to the whole log with boundary 'whole'".to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Session boundary: {}", summary.boundary);
            println!("  Min records: {}", summary.min_records);
            println!("  Camera UUID matching: {}", summary.use_camera_uuid);
            println!("  Fill: {}", summary.fill);
            println!("  Extensions: {}", summary.extensions.join(", "));
            println!("  Workers: {}", summary.workers);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitclip.toml");
        std::fs::write(
            &path,
            "[ingestion]\nextensions = [\"fit\", \"gpx\"]\nverify_crc = false\n",
        )
        .unwrap();

        let result = validate_config(&path);
        assert!(result.valid, "{:?}", result.error);
        let warnings = result.warnings.unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains(".gpx"));
    }

    #[test]
    fn test_validate_missing_file() {
        let result = validate_config(Path::new("/nope/fitclip.toml"));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitclip.json");
        std::fs::write(&path, r#"{"session":{"min_records":0}}"#).unwrap();
        assert!(!validate_config(&path).valid);
    }
}
