//! Configuration types deserialized from `breeze.toml`.

use breeze_common::{LayerOrder, LayerOrderError};
use breeze_diagnostics::{DiagnosticCode, ParseCodeError};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Extension key that applies to every file without a more specific entry.
pub const DEFAULT_KEY: &str = "DEFAULT";

/// Default capacity of each per-extractor line cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 25_000;

/// The JIT compiler configuration parsed from `breeze.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JitConfig {
    /// Emit debug-level timing and count instrumentation.
    #[serde(default)]
    pub debug: bool,
    /// Content scanning: extractor and transformer selection.
    #[serde(default)]
    pub content: ContentConfig,
    /// Sort-key layout: sub-order width and variant order.
    #[serde(default)]
    pub layers: LayerConfig,
    /// Diagnostic suppression and promotion.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Per-extension selection of registered extractors and transformers.
///
/// Values name entries registered with the extractor registry; the
/// [`DEFAULT_KEY`] entry applies to extensions without their own entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// Extension to extractor name.
    #[serde(default)]
    pub extractors: BTreeMap<String, String>,
    /// Extension to transformer name.
    #[serde(default)]
    pub transformers: BTreeMap<String, String>,
    /// Maximum number of lines memoized per extractor.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            extractors: BTreeMap::new(),
            transformers: BTreeMap::new(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

/// Layout of rule sort keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
    /// Width in bits of the per-rule sub-order field.
    #[serde(default = "default_sub_order_bits")]
    pub sub_order_bits: u32,
    /// Variant names, lowest precedence first.
    #[serde(default = "default_variants")]
    pub variants: Vec<String>,
}

impl LayerConfig {
    /// Builds the sort-key layout described by this section.
    pub fn layer_order(&self) -> Result<LayerOrder, LayerOrderError> {
        LayerOrder::new(self.sub_order_bits, self.variants.clone())
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            sub_order_bits: default_sub_order_bits(),
            variants: default_variants(),
        }
    }
}

fn default_sub_order_bits() -> u32 {
    LayerOrder::DEFAULT_SUB_ORDER_BITS
}

fn default_variants() -> Vec<String> {
    LayerOrder::default().variants().to_vec()
}

/// Diagnostic policy, by code (e.g. `"C001"`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Codes that are never reported.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Codes reported with error severity.
    #[serde(default)]
    pub deny: Vec<String>,
}

impl DiagnosticsConfig {
    /// Parses the `allow` list.
    pub fn allowed_codes(&self) -> Result<Vec<DiagnosticCode>, ParseCodeError> {
        self.allow.iter().map(|c| c.parse()).collect()
    }

    /// Parses the `deny` list.
    pub fn denied_codes(&self) -> Result<Vec<DiagnosticCode>, ParseCodeError> {
        self.deny.iter().map(|c| c.parse()).collect()
    }
}
