//! Cascade layers and the bit layout of rule sort keys.

use crate::sort_key::SortKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of flag bits reserved for layers inside a sort key.
const LAYER_BITS: u32 = 5;

/// Total width of a sort key in bits.
const KEY_BITS: u32 = 128;

/// A cascade layer a non-variant rule can belong to.
///
/// Declaration order is the order of the layer flag bits inside a
/// [`SortKey`], lowest first. This is also the output precedence of the
/// layers relative to one another.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Universal defaults emitted ahead of base styles.
    Defaults,
    /// Element resets and base styles.
    Base,
    /// Component classes.
    Components,
    /// Single-purpose utility classes.
    Utilities,
    /// Author CSS that passed through the tool untouched.
    User,
}

impl Layer {
    /// All layers in flag-bit order.
    pub const ALL: [Layer; 5] = [
        Layer::Defaults,
        Layer::Base,
        Layer::Components,
        Layer::Utilities,
        Layer::User,
    ];

    /// The order in which a rule's flags are tested when routing it to a bucket.
    pub const ROUTING_ORDER: [Layer; 5] = [
        Layer::Base,
        Layer::Defaults,
        Layer::Components,
        Layer::Utilities,
        Layer::User,
    ];

    /// Returns the lowercase name used in directives and configuration.
    pub fn name(self) -> &'static str {
        match self {
            Layer::Defaults => "defaults",
            Layer::Base => "base",
            Layer::Components => "components",
            Layer::Utilities => "utilities",
            Layer::User => "user",
        }
    }

    fn bit_offset(self) -> u32 {
        match self {
            Layer::Defaults => 0,
            Layer::Base => 1,
            Layer::Components => 2,
            Layer::Utilities => 3,
            Layer::User => 4,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.name() == s)
            .ok_or_else(|| format!("unknown layer '{s}'"))
    }
}

/// Errors produced when a layer layout cannot be represented in a [`SortKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerOrderError {
    /// The sub-order field must be between 1 and 100 bits wide.
    #[error("sub-order width must be between 1 and 100 bits, got {0}")]
    SubOrderWidth(u32),

    /// Sub-order, layer flags and variant flags together exceed 128 bits.
    #[error("layout needs {required} bits but sort keys hold 128")]
    TooWide {
        /// Bits required by the requested layout.
        required: u32,
    },

    /// A variant name was listed twice.
    #[error("variant '{0}' is listed more than once")]
    DuplicateVariant(String),

    /// A variant name was empty.
    #[error("variant names must not be empty")]
    EmptyVariant,
}

/// The bit assignment used to build and classify rule sort keys.
///
/// Layout, from least to most significant bit:
///
/// ```text
/// [ sub-order (sub_order_bits) | defaults base components utilities user | variant flags... ]
/// ```
///
/// The flag of the first variant is the minimum variant threshold: every key
/// at or above it belongs to the variants bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerOrder {
    sub_order_bits: u32,
    variants: Vec<String>,
}

impl LayerOrder {
    /// Sub-order width used when configuration does not specify one.
    pub const DEFAULT_SUB_ORDER_BITS: u32 = 64;

    /// Creates a layout with the given sub-order width and variant order.
    pub fn new(sub_order_bits: u32, variants: Vec<String>) -> Result<Self, LayerOrderError> {
        if !(1..=100).contains(&sub_order_bits) {
            return Err(LayerOrderError::SubOrderWidth(sub_order_bits));
        }
        let required = sub_order_bits + LAYER_BITS + variants.len() as u32;
        if required > KEY_BITS {
            return Err(LayerOrderError::TooWide { required });
        }
        for (i, name) in variants.iter().enumerate() {
            if name.is_empty() {
                return Err(LayerOrderError::EmptyVariant);
            }
            if variants[..i].contains(name) {
                return Err(LayerOrderError::DuplicateVariant(name.clone()));
            }
        }
        Ok(Self {
            sub_order_bits,
            variants,
        })
    }

    /// Returns the width of the sub-order field.
    pub fn sub_order_bits(&self) -> u32 {
        self.sub_order_bits
    }

    /// Returns the configured variant names in flag order.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Returns the flag bit of a layer.
    pub fn flag(&self, layer: Layer) -> SortKey {
        SortKey::from_raw(1u128 << (self.sub_order_bits + layer.bit_offset()))
    }

    /// Returns the flag bit of a named variant.
    pub fn variant_flag(&self, variant: &str) -> Option<SortKey> {
        let index = self.variants.iter().position(|v| v == variant)?;
        Some(SortKey::from_raw(
            1u128 << (self.variant_base() + index as u32),
        ))
    }

    /// Returns the lowest key that routes a rule to the variants bucket.
    pub fn minimum_variant_threshold(&self) -> SortKey {
        SortKey::from_raw(1u128 << self.variant_base())
    }

    /// Builds the key of a non-variant rule.
    ///
    /// Returns `None` if `sub_order` does not fit in the sub-order field.
    pub fn rule_key(&self, layer: Layer, sub_order: u128) -> Option<SortKey> {
        self.fits(sub_order)
            .then(|| self.flag(layer) | SortKey::from_raw(sub_order))
    }

    /// Builds the key of a rule generated under `variant` in `layer`.
    ///
    /// Returns `None` for an unknown variant or an oversized `sub_order`.
    pub fn variant_key(&self, variant: &str, layer: Layer, sub_order: u128) -> Option<SortKey> {
        let flag = self.variant_flag(variant)?;
        Some(flag | self.rule_key(layer, sub_order)?)
    }

    fn variant_base(&self) -> u32 {
        self.sub_order_bits + LAYER_BITS
    }

    fn fits(&self, sub_order: u128) -> bool {
        sub_order >> self.sub_order_bits == 0
    }
}

impl Default for LayerOrder {
    fn default() -> Self {
        Self {
            sub_order_bits: Self::DEFAULT_SUB_ORDER_BITS,
            variants: ["sm", "md", "lg", "xl", "2xl"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screens() -> Vec<String> {
        vec!["sm".to_string(), "md".to_string()]
    }

    #[test]
    fn layer_names_roundtrip() {
        for layer in Layer::ALL {
            assert_eq!(layer.name().parse::<Layer>().unwrap(), layer);
        }
        assert!("variants".parse::<Layer>().is_err());
    }

    #[test]
    fn flags_are_distinct_single_bits() {
        let order = LayerOrder::new(8, screens()).unwrap();
        let mut seen = SortKey::ZERO;
        for layer in Layer::ALL {
            let flag = order.flag(layer);
            assert_eq!(flag.as_raw().count_ones(), 1);
            assert!(!seen.intersects(flag));
            seen = seen | flag;
        }
    }

    #[test]
    fn defaults_sort_before_base_and_user_last() {
        let order = LayerOrder::new(8, screens()).unwrap();
        assert!(order.flag(Layer::Defaults) < order.flag(Layer::Base));
        assert!(order.flag(Layer::Base) < order.flag(Layer::Components));
        assert!(order.flag(Layer::Utilities) < order.flag(Layer::User));
    }

    #[test]
    fn variants_sit_above_every_layer() {
        let order = LayerOrder::new(8, screens()).unwrap();
        let threshold = order.minimum_variant_threshold();
        let max_plain = order.rule_key(Layer::User, 255).unwrap();
        assert!(max_plain < threshold);
        assert_eq!(order.variant_flag("sm"), Some(threshold));
        assert!(order.variant_flag("md").unwrap() > threshold);
        assert_eq!(order.variant_flag("xl"), None);
    }

    #[test]
    fn variant_key_keeps_layer_flag() {
        let order = LayerOrder::new(8, screens()).unwrap();
        let key = order.variant_key("md", Layer::Utilities, 3).unwrap();
        assert!(key >= order.minimum_variant_threshold());
        assert!(key.intersects(order.flag(Layer::Utilities)));
    }

    #[test]
    fn oversized_sub_order_rejected() {
        let order = LayerOrder::new(8, screens()).unwrap();
        assert!(order.rule_key(Layer::Base, 256).is_none());
        assert!(order.rule_key(Layer::Base, 255).is_some());
    }

    #[test]
    fn layout_width_validation() {
        assert_eq!(
            LayerOrder::new(0, vec![]).unwrap_err(),
            LayerOrderError::SubOrderWidth(0)
        );
        let many: Vec<String> = (0..60).map(|i| format!("v{i}")).collect();
        assert_eq!(
            LayerOrder::new(64, many).unwrap_err(),
            LayerOrderError::TooWide { required: 129 }
        );
    }

    #[test]
    fn duplicate_and_empty_variants_rejected() {
        let dup = vec!["sm".to_string(), "sm".to_string()];
        assert_eq!(
            LayerOrder::new(8, dup).unwrap_err(),
            LayerOrderError::DuplicateVariant("sm".to_string())
        );
        assert_eq!(
            LayerOrder::new(8, vec![String::new()]).unwrap_err(),
            LayerOrderError::EmptyVariant
        );
    }

    #[test]
    fn default_layout() {
        let order = LayerOrder::default();
        assert_eq!(order.sub_order_bits(), 64);
        assert_eq!(order.variants().len(), 5);
        assert!(order.variant_flag("2xl").is_some());
    }
}
