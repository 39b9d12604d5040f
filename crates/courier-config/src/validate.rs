//! Configuration validation rules.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] for the first invalid field.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;

    if logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: "must not be empty".to_owned(),
        });
    }

    logging
        .validate()
        .map_err(|e| ConfigError::ValidationError {
            field: "logging.directives".to_owned(),
            message: e.to_string(),
        })?;

    if logging.file.prefix.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.file.prefix".to_owned(),
            message: "must not be empty".to_owned(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "  ".to_owned();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "logging.level"));
    }

    #[test]
    fn test_bad_directive_rejected() {
        let mut config = Config::default();
        config.logging.directives.push("[broken".to_owned());
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("[broken"));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let mut config = Config::default();
        config.logging.file.prefix = String::new();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "logging.file.prefix"));
    }
}
