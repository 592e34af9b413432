//! The long-lived rule cache and its partition into layer buckets.

use crate::collect::CandidateSet;
use crate::context::BuildContext;
use crate::error::JitError;
use crate::generator::GeneratedRule;
use breeze_common::{Layer, LayerOrder, SortKey};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Every rule generated so far, ordered by sort key.
///
/// Append-only. When two rules share a key the first one inserted is kept.
#[derive(Debug, Default)]
pub struct RuleCache {
    rules: BTreeMap<SortKey, Arc<GeneratedRule>>,
}

impl RuleCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rule unless its key is taken. Returns `true` if inserted.
    pub fn insert(&mut self, rule: GeneratedRule) -> bool {
        match self.rules.entry(rule.sort) {
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(rule));
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Inserts every rule, returning how many were new.
    pub fn merge(&mut self, rules: impl IntoIterator<Item = GeneratedRule>) -> usize {
        rules
            .into_iter()
            .fold(0, |added, rule| added + usize::from(self.insert(rule)))
    }

    /// Number of cached rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rule was cached yet.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates the rules in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<GeneratedRule>> {
        self.rules.values()
    }
}

/// One of the six disjoint output buckets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Bucket {
    /// Base styles.
    Base,
    /// Universal defaults, injected right after base styles.
    Defaults,
    /// Component classes.
    Components,
    /// Utility classes.
    Utilities,
    /// Rules at or above the minimum variant threshold.
    Variants,
    /// Pass-through author CSS.
    User,
}

impl From<Layer> for Bucket {
    fn from(layer: Layer) -> Self {
        match layer {
            Layer::Defaults => Bucket::Defaults,
            Layer::Base => Bucket::Base,
            Layer::Components => Bucket::Components,
            Layer::Utilities => Bucket::Utilities,
            Layer::User => Bucket::User,
        }
    }
}

/// The rule cache partitioned into buckets, each in ascending key order.
#[derive(Debug, Default)]
pub struct Stylesheet {
    base: Vec<Arc<GeneratedRule>>,
    defaults: Vec<Arc<GeneratedRule>>,
    components: Vec<Arc<GeneratedRule>>,
    utilities: Vec<Arc<GeneratedRule>>,
    variants: Vec<Arc<GeneratedRule>>,
    user: Vec<Arc<GeneratedRule>>,
}

impl Stylesheet {
    /// Routes every cached rule to exactly one bucket.
    ///
    /// Keys at or above the minimum variant threshold go to variants.
    /// Otherwise the first layer flag set, testing base, defaults,
    /// components, utilities and user in that order, picks the bucket. Rules
    /// with no flag are dropped.
    pub fn build(rules: &RuleCache, order: &LayerOrder) -> Self {
        let threshold = order.minimum_variant_threshold();
        let mut sheet = Stylesheet::default();
        for rule in rules.iter() {
            let bucket = if rule.sort >= threshold {
                Some(Bucket::Variants)
            } else {
                Layer::ROUTING_ORDER
                    .into_iter()
                    .find(|&layer| rule.sort.intersects(order.flag(layer)))
                    .map(Bucket::from)
            };
            if let Some(bucket) = bucket {
                sheet.bucket_mut(bucket).push(Arc::clone(rule));
            }
        }
        sheet
    }

    /// Returns the rules of one bucket.
    pub fn bucket(&self, bucket: Bucket) -> &[Arc<GeneratedRule>] {
        match bucket {
            Bucket::Base => &self.base,
            Bucket::Defaults => &self.defaults,
            Bucket::Components => &self.components,
            Bucket::Utilities => &self.utilities,
            Bucket::Variants => &self.variants,
            Bucket::User => &self.user,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Arc<GeneratedRule>> {
        match bucket {
            Bucket::Base => &mut self.base,
            Bucket::Defaults => &mut self.defaults,
            Bucket::Components => &mut self.components,
            Bucket::Utilities => &mut self.utilities,
            Bucket::Variants => &mut self.variants,
            Bucket::User => &mut self.user,
        }
    }

    /// Base rules followed by defaults, the content of `@tailwind base`.
    pub fn base_with_defaults(&self) -> impl Iterator<Item = &Arc<GeneratedRule>> {
        self.base.iter().chain(&self.defaults)
    }

    /// Total number of routed rules.
    pub fn len(&self) -> usize {
        self.base.len()
            + self.defaults.len()
            + self.components.len()
            + self.utilities.len()
            + self.variants.len()
            + self.user.len()
    }

    /// Returns `true` if no rule was routed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generates rules for `candidates` and returns the current stylesheet.
///
/// The stylesheet is rebuilt from the whole rule cache when none exists yet
/// or when the generator's class cache grew during this call. Otherwise the
/// previous stylesheet is returned as is, and the rules of this call are not
/// merged.
pub fn assemble(
    candidates: &CandidateSet,
    context: &mut BuildContext,
) -> Result<Arc<Stylesheet>, JitError> {
    let before = context.generator.class_cache_len();
    let generated = context
        .generator
        .generate_rules(candidates)
        .map_err(|source| JitError::Generator {
            generator: context.generator.name().to_string(),
            source,
        })?;
    let after = context.generator.class_cache_len();

    if let Some(sheet) = &context.stylesheet {
        if before == after {
            tracing::trace!(class_cache = after, "reusing stylesheet");
            return Ok(Arc::clone(sheet));
        }
    }

    let added = context.rule_cache.merge(generated);
    let sheet = Arc::new(Stylesheet::build(&context.rule_cache, &context.order));
    context.stylesheet = Some(Arc::clone(&sheet));
    context.stylesheet_builds += 1;
    tracing::trace!(
        added,
        rules = context.rule_cache.len(),
        routed = sheet.len(),
        "rebuilt stylesheet"
    );
    Ok(sheet)
}
