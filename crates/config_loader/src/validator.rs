//! Configuration validation
//!
//! Rules:
//! - field ranges declared on the config types (`validator` derive)
//! - time-gap boundary: `max_gap_s` finite and > 0
//! - extensions: non-empty, no leading dot, no duplicates

use std::collections::HashSet;

use contracts::{ContractError, MatcherConfig, SessionBoundary};
use validator::Validate;

/// Validate a MatcherConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &MatcherConfig) -> Result<(), ContractError> {
    config
        .validate()
        .map_err(|e| ContractError::config_validation("config", e.to_string()))?;
    validate_boundary(config)?;
    validate_extensions(config)?;
    Ok(())
}

fn validate_boundary(config: &MatcherConfig) -> Result<(), ContractError> {
    if let SessionBoundary::TimeGap { max_gap_s } = config.session.boundary {
        if !max_gap_s.is_finite() || max_gap_s <= 0.0 {
            return Err(ContractError::config_validation(
                "session.boundary.max_gap_s",
                format!("max_gap_s must be a positive number of seconds, got {max_gap_s}"),
            ));
        }
    }
    Ok(())
}

fn validate_extensions(config: &MatcherConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, ext) in config.ingestion.extensions.iter().enumerate() {
        let field = || format!("ingestion.extensions[{idx}]");
        if ext.trim().is_empty() {
            return Err(ContractError::config_validation(
                field(),
                "extension cannot be empty",
            ));
        }
        if ext.starts_with('.') {
            return Err(ContractError::config_validation(
                field(),
                format!("extension '{ext}' must not start with '.'"),
            ));
        }
        if !seen.insert(ext.to_lowercase()) {
            return Err(ContractError::config_validation(
                field(),
                format!("duplicate extension '{ext}'"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate(&MatcherConfig::default()).is_ok());
    }

    #[test]
    fn test_negative_gap() {
        let mut config = MatcherConfig::default();
        config.session.boundary = SessionBoundary::TimeGap { max_gap_s: -1.0 };
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_nan_gap() {
        let mut config = MatcherConfig::default();
        config.session.boundary = SessionBoundary::TimeGap {
            max_gap_s: f64::NAN,
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_leading_dot_extension() {
        let mut config = MatcherConfig::default();
        config.ingestion.extensions = vec![".fit".to_string()];
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("must not start with"));
    }

    #[test]
    fn test_duplicate_extension_case_insensitive() {
        let mut config = MatcherConfig::default();
        config.ingestion.extensions = vec!["fit".to_string(), "FIT".to_string()];
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_zero_workers() {
        let mut config = MatcherConfig::default();
        config.ingestion.workers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_max_candidates() {
        let mut config = MatcherConfig::default();
        config.ingestion.max_candidates = Some(0);
        assert!(validate(&config).is_err());
    }
}
