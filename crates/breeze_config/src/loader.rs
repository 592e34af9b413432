//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::JitConfig;
use std::path::Path;

/// File name of the project configuration.
pub const CONFIG_FILE_NAME: &str = "breeze.toml";

/// Loads and validates `breeze.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<JitConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates a `breeze.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<JitConfig, ConfigError> {
    let config: JitConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks values that deserialization alone cannot enforce.
fn validate_config(config: &JitConfig) -> Result<(), ConfigError> {
    if config.content.cache_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "content.cache_capacity must be positive".to_string(),
        ));
    }
    for (table, map) in [
        ("extractors", &config.content.extractors),
        ("transformers", &config.content.transformers),
    ] {
        if let Some((ext, _)) = map.iter().find(|(_, name)| name.is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "content.{table}.{ext} names no {}",
                table.trim_end_matches('s')
            )));
        }
    }
    config.layers.layer_order()?;
    for code in config.diagnostics.allow.iter().chain(&config.diagnostics.deny) {
        code.parse::<breeze_diagnostics::DiagnosticCode>()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert!(!config.debug);
        assert!(config.content.extractors.is_empty());
        assert_eq!(config.layers.variants.len(), 5);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
debug = true

[content]
extractors = { md = "markdown", DEFAULT = "default" }
transformers = { svelte = "svelte" }
cache_capacity = 100

[layers]
sub_order_bits = 32
variants = ["sm", "md", "print"]

[diagnostics]
allow = ["C001"]
deny = ["L001"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(config.debug);
        assert_eq!(config.content.extractors["md"], "markdown");
        assert_eq!(config.content.extractors["DEFAULT"], "default");
        assert_eq!(config.content.transformers["svelte"], "svelte");
        assert_eq!(config.content.cache_capacity, 100);
        assert_eq!(config.layers.sub_order_bits, 32);
        assert_eq!(config.layers.variants, vec!["sm", "md", "print"]);
        assert_eq!(config.diagnostics.allow, vec!["C001"]);
        assert_eq!(config.diagnostics.deny, vec!["L001"]);
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_field_errors() {
        let err = load_config_from_str("[content]\npurge = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn zero_capacity_errors() {
        let err = load_config_from_str("[content]\ncache_capacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_extractor_name_errors() {
        let err = load_config_from_str("[content]\nextractors = { md = \"\" }\n").unwrap_err();
        match err {
            ConfigError::ValidationError(msg) => {
                assert_eq!(msg, "content.extractors.md names no extractor")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_layout_errors() {
        let variants: Vec<String> = (0..40).map(|i| format!("\"v{i}\"")).collect();
        let toml = format!(
            "[layers]\nsub_order_bits = 100\nvariants = [{}]\n",
            variants.join(", ")
        );
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::LayerOrder(_)));
    }

    #[test]
    fn malformed_diagnostic_code_errors() {
        let err = load_config_from_str("[diagnostics]\nallow = [\"content-problems\"]\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "debug = true\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(config.debug);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
