//! The long-lived state shared by successive build passes.

use crate::collect::{collect_with_stats, CandidateSet, ChangedContent, CollectStats};
use crate::error::JitError;
use crate::extract::ExtractorRegistry;
use crate::generator::RuleGenerator;
use crate::stylesheet::{RuleCache, Stylesheet};
use breeze_common::LayerOrder;
use breeze_config::{ConfigError, JitConfig};
use breeze_diagnostics::DiagnosticSink;
use std::sync::Arc;

/// Caches and pending content for one configuration.
///
/// Passes take `&mut BuildContext`, so callers serialize them. Every cache
/// only grows, except for LRU eviction inside extraction caches.
pub struct BuildContext {
    pub(crate) order: LayerOrder,
    pub(crate) registry: ExtractorRegistry,
    pub(crate) generator: Box<dyn RuleGenerator>,
    pub(crate) rule_cache: RuleCache,
    pub(crate) stylesheet: Option<Arc<Stylesheet>>,
    pub(crate) stylesheet_builds: usize,
    changed_content: Vec<ChangedContent>,
    debug: bool,
}

impl BuildContext {
    /// Creates a context for `config` that generates rules with `generator`.
    ///
    /// The generator must build its keys with the layout of `[layers]`.
    pub fn new(config: &JitConfig, generator: Box<dyn RuleGenerator>) -> Result<Self, JitError> {
        let order = config.layers.layer_order().map_err(ConfigError::from)?;
        if generator.layer_order() != &order {
            return Err(ConfigError::ValidationError(format!(
                "rule generator '{}' uses a sort-key layout that differs from [layers]",
                generator.name()
            ))
            .into());
        }
        Ok(Self {
            order,
            registry: ExtractorRegistry::from_config(&config.content)?,
            generator,
            rule_cache: RuleCache::new(),
            stylesheet: None,
            stylesheet_builds: 0,
            changed_content: Vec::new(),
            debug: config.debug,
        })
    }

    /// Queues content for the next pass that finds a directive.
    pub fn push_content(&mut self, content: ChangedContent) {
        self.changed_content.push(content);
    }

    /// Content queued since the last pass that found a directive.
    pub fn changed_content(&self) -> &[ChangedContent] {
        &self.changed_content
    }

    /// Drops all queued content.
    pub fn clear_changed_content(&mut self) {
        self.changed_content.clear();
    }

    /// Collects the candidates of the queued content.
    pub fn collect_candidates(&mut self) -> Result<(CandidateSet, CollectStats), JitError> {
        collect_with_stats(&self.changed_content, &mut self.registry)
    }

    /// The sort-key layout in use.
    pub fn layer_order(&self) -> &LayerOrder {
        &self.order
    }

    /// The extractor registry, for inspecting caches.
    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// The extractor registry, for registering extractors and transformers.
    pub fn registry_mut(&mut self) -> &mut ExtractorRegistry {
        &mut self.registry
    }

    /// The rule generator.
    pub fn generator(&self) -> &dyn RuleGenerator {
        self.generator.as_ref()
    }

    /// Every rule generated so far.
    pub fn rule_cache(&self) -> &RuleCache {
        &self.rule_cache
    }

    /// The most recently built stylesheet, if any.
    pub fn stylesheet(&self) -> Option<&Arc<Stylesheet>> {
        self.stylesheet.as_ref()
    }

    /// How many times the stylesheet has been rebuilt.
    pub fn stylesheet_builds(&self) -> usize {
        self.stylesheet_builds
    }

    /// Whether debug instrumentation is enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }
}

/// Creates a sink applying the `[diagnostics]` allow and deny lists.
pub fn diagnostic_sink(config: &JitConfig) -> Result<DiagnosticSink, JitError> {
    let invalid = |e: breeze_diagnostics::ParseCodeError| {
        JitError::from(ConfigError::ValidationError(e.to_string()))
    };
    let allow = config.diagnostics.allowed_codes().map_err(invalid)?;
    let deny = config.diagnostics.denied_codes().map_err(invalid)?;
    Ok(DiagnosticSink::with_policy(allow, deny))
}
