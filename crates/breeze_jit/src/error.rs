//! Error types for build passes.

use breeze_common::InternalError;
use breeze_config::ConfigError;
use breeze_css::CssError;

/// An error raised by a user-supplied extractor, transformer or rule generator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a build pass.
///
/// Content and layout problems are not errors; they are reported through the
/// diagnostic sink and the pass continues.
#[derive(Debug, thiserror::Error)]
pub enum JitError {
    /// An extractor failed on content with the given extension.
    #[error("extractor '{extractor}' failed on .{extension} content: {source}")]
    Extractor {
        /// Registered name of the extractor.
        extractor: String,
        /// Extension of the content being scanned.
        extension: String,
        /// The extractor's error.
        source: CollaboratorError,
    },

    /// A transformer failed on content with the given extension.
    #[error("transformer '{transformer}' failed on .{extension} content: {source}")]
    Transformer {
        /// Registered name of the transformer.
        transformer: String,
        /// Extension of the content being normalized.
        extension: String,
        /// The transformer's error.
        source: CollaboratorError,
    },

    /// The rule generator failed.
    #[error("rule generator '{generator}' failed: {source}")]
    Generator {
        /// Name reported by the generator.
        generator: String,
        /// The generator's error.
        source: CollaboratorError,
    },

    /// Configuration selects an extractor that was never registered.
    #[error("no extractor named '{name}' is registered (selected for '{extension}')")]
    UnknownExtractor {
        /// The configured name.
        name: String,
        /// The configuration key that selected it.
        extension: String,
    },

    /// Configuration selects a transformer that was never registered.
    #[error("no transformer named '{name}' is registered (selected for '{extension}')")]
    UnknownTransformer {
        /// The configured name.
        name: String,
        /// The configuration key that selected it.
        extension: String,
    },

    /// A tree edit failed.
    #[error(transparent)]
    Css(#[from] CssError),

    /// The configuration could not be turned into a build context.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A broken internal invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use breeze_css::NodeId;

    #[test]
    fn display_extractor_error() {
        let err = JitError::Extractor {
            extractor: "markdown".to_string(),
            extension: "md".to_string(),
            source: "bad front matter".into(),
        };
        assert_eq!(
            err.to_string(),
            "extractor 'markdown' failed on .md content: bad front matter"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn display_unknown_extractor() {
        let err = JitError::UnknownExtractor {
            name: "pug".to_string(),
            extension: "DEFAULT".to_string(),
        };
        assert!(err.to_string().contains("'pug'"));
    }

    #[test]
    fn css_errors_convert() {
        let err: JitError = CssError::Detached(NodeId::from_raw(2)).into();
        assert!(matches!(err, JitError::Css(CssError::Detached(_))));
    }
}
