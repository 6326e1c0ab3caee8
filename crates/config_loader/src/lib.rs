//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `MatcherConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("fitclip.toml")).unwrap();
//! println!("Workers: {}", config.ingestion.workers);
//! ```

mod parser;
mod validator;

pub use contracts::MatcherConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<MatcherConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MatcherConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already-built configuration (e.g. defaults with CLI
    /// overrides applied)
    pub fn validate(config: &MatcherConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize MatcherConfig to TOML string
    pub fn to_toml(config: &MatcherConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize MatcherConfig to JSON string
    pub fn to_json(config: &MatcherConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MatcherConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FillPolicy, SessionBoundary};

    const FULL_TOML: &str = r#"
[session]
min_records = 5
[session.boundary]
kind = "time_gap"
max_gap_s = 120.0

[matching]
use_camera_uuid = true

[extraction]
fill = "forward"

[ingestion]
extensions = ["fit"]
max_candidates = 50
workers = 2
verify_crc = false
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(
            config.session.boundary,
            SessionBoundary::TimeGap { max_gap_s: 120.0 }
        );
        assert_eq!(config.session.min_records, 5);
        assert!(config.matching.use_camera_uuid);
        assert_eq!(config.extraction.fill, FillPolicy::Forward);
        assert_eq!(config.ingestion.max_candidates, Some(50));
        assert!(!config.ingestion.verify_crc);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(config.session.boundary, SessionBoundary::DeviceEvents);
        assert_eq!(config.ingestion.extensions, vec!["fit", "jsonl"]);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let again = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.session.boundary, again.session.boundary);
        assert_eq!(config.ingestion.extensions, again.ingestion.extensions);
        assert_eq!(config.ingestion.workers, again.ingestion.workers);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let again = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.extraction.fill, again.extraction.fill);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[session.boundary]
kind = "time_gap"
max_gap_s = 0.0
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_gap_s"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ConfigLoader::load_from_path(Path::new("fitclip.yaml")).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
