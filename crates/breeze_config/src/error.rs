//! Error types for configuration loading and validation.

use breeze_common::LayerOrderError;

/// Errors that can occur when loading or validating a `breeze.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The layer layout does not fit in a sort key.
    #[error("invalid [layers] section: {0}")]
    LayerOrder(#[from] LayerOrderError),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_layer_order_error() {
        let err = ConfigError::from(LayerOrderError::EmptyVariant);
        assert_eq!(
            format!("{err}"),
            "invalid [layers] section: variant names must not be empty"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("cache_capacity must be positive".to_string());
        assert_eq!(
            format!("{err}"),
            "validation error: cache_capacity must be positive"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
