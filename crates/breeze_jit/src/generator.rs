//! The rule-generation interface and a table-driven implementation.

use crate::collect::{CandidateSet, WILDCARD};
use crate::error::CollaboratorError;
use breeze_common::{Layer, LayerOrder, SortKey};
use breeze_css::CssNode;
use std::collections::{HashMap, HashSet};

/// A rule produced for a candidate, with the key that orders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRule {
    /// Position of the rule in the output.
    pub sort: SortKey,
    /// The rule itself.
    pub node: CssNode,
    /// For variant rules, the layer of the rule the variant wraps.
    pub parent_layer: Option<Layer>,
}

impl GeneratedRule {
    /// Creates a rule without a parent layer.
    pub fn new(sort: SortKey, node: CssNode) -> Self {
        Self {
            sort,
            node,
            parent_layer: None,
        }
    }

    /// Tags a variant rule with the layer of the rule it wraps.
    pub fn with_parent_layer(mut self, layer: Layer) -> Self {
        self.parent_layer = Some(layer);
        self
    }
}

/// Maps candidates to rules, remembering what it generated.
///
/// The class cache is owned by the generator; callers only observe its size,
/// which must never shrink.
pub trait RuleGenerator: Send {
    /// Returns the rules of every candidate that produces any, including
    /// candidates generated in earlier calls.
    fn generate_rules(
        &mut self,
        candidates: &CandidateSet,
    ) -> Result<Vec<GeneratedRule>, CollaboratorError>;

    /// Number of candidates in the class cache.
    fn class_cache_len(&self) -> usize;

    /// The sort-key layout the generated keys are built with.
    fn layer_order(&self) -> &LayerOrder;

    /// Name used in error messages.
    fn name(&self) -> &str {
        "generator"
    }
}

#[derive(Debug, Clone)]
struct ClassDef {
    layer: Layer,
    selector: Option<String>,
    declarations: Vec<(String, String)>,
    index: u128,
}

/// Screens used when a generator is built without explicit variants.
const DEFAULT_SCREENS: [(&str, &str); 5] = [
    ("sm", "640px"),
    ("md", "768px"),
    ("lg", "1024px"),
    ("xl", "1280px"),
    ("2xl", "1536px"),
];

/// A rule generator backed by a fixed table of classes and variants.
///
/// A candidate is either a class name from the table or `variant:class`,
/// where the variant wraps the class's rule in an at-rule. Sub-orders follow
/// table registration order, so output order does not depend on the order
/// candidates were discovered in.
pub struct LookupGenerator {
    order: LayerOrder,
    classes: HashMap<String, ClassDef>,
    variants: HashMap<String, (String, String)>,
    class_cache: HashMap<String, Vec<GeneratedRule>>,
    misses: HashSet<String>,
    next_index: u128,
}

impl LookupGenerator {
    /// Creates an empty table using `order` to build sort keys.
    pub fn new(order: LayerOrder) -> Self {
        Self {
            order,
            classes: HashMap::new(),
            variants: HashMap::new(),
            class_cache: HashMap::new(),
            misses: HashSet::new(),
            next_index: 0,
        }
    }

    /// Creates a table with a `min-width` media variant for every default
    /// screen that `order` knows about.
    pub fn with_default_screens(order: LayerOrder) -> Self {
        let mut generator = Self::new(order);
        for (name, width) in DEFAULT_SCREENS {
            if generator.order.variant_flag(name).is_some() {
                generator.add_variant(name, "media", format!("(min-width: {width})"));
            }
        }
        generator
    }

    /// Adds a class whose rule selects `.class`.
    pub fn add_class<'a>(
        &mut self,
        class: impl Into<String>,
        layer: Layer,
        declarations: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> &mut Self {
        self.insert_class(class.into(), layer, None, declarations)
    }

    /// Adds a class whose rule uses a custom selector, e.g. the wildcard
    /// candidate selecting `*, ::before, ::after`.
    pub fn add_class_with_selector<'a>(
        &mut self,
        class: impl Into<String>,
        layer: Layer,
        selector: impl Into<String>,
        declarations: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> &mut Self {
        self.insert_class(class.into(), layer, Some(selector.into()), declarations)
    }

    /// Adds a variant that wraps rules in `@at_rule params { ... }`.
    ///
    /// Variants unknown to the layer order never match.
    pub fn add_variant(
        &mut self,
        name: impl Into<String>,
        at_rule: impl Into<String>,
        params: impl Into<String>,
    ) -> &mut Self {
        self.variants
            .insert(name.into(), (at_rule.into(), params.into()));
        self
    }

    /// Returns `true` if `candidate` is known not to produce rules.
    pub fn is_miss(&self, candidate: &str) -> bool {
        self.misses.contains(candidate)
    }

    fn insert_class<'a>(
        &mut self,
        class: String,
        layer: Layer,
        selector: Option<String>,
        declarations: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> &mut Self {
        let index = self.next_index;
        self.next_index += 1;
        self.classes.insert(
            class,
            ClassDef {
                layer,
                selector,
                declarations: declarations
                    .into_iter()
                    .map(|(p, v)| (p.to_string(), v.to_string()))
                    .collect(),
                index,
            },
        );
        self
    }

    fn rule_node(selector: String, def: &ClassDef) -> CssNode {
        def.declarations
            .iter()
            .fold(CssNode::rule(selector), |rule, (prop, value)| {
                rule.with_decl(prop.as_str(), value.as_str())
            })
    }

    fn generate_candidate(&self, candidate: &str) -> Result<Vec<GeneratedRule>, CollaboratorError> {
        if let Some(def) = self.classes.get(candidate) {
            let key = self
                .order
                .rule_key(def.layer, def.index)
                .ok_or_else(|| format!("sub-order of '{candidate}' does not fit in the sort key"))?;
            let selector = def
                .selector
                .clone()
                .unwrap_or_else(|| class_selector(candidate));
            return Ok(vec![GeneratedRule::new(key, Self::rule_node(selector, def))]);
        }

        let Some((variant, class)) = candidate.split_once(':') else {
            return Ok(Vec::new());
        };
        let (Some(def), Some((at_rule, params))) = (self.classes.get(class), self.variants.get(variant))
        else {
            return Ok(Vec::new());
        };
        if !matches!(def.layer, Layer::Components | Layer::Utilities) || def.selector.is_some() {
            return Ok(Vec::new());
        }
        let Some(key) = self.order.variant_key(variant, def.layer, def.index) else {
            return Ok(Vec::new());
        };
        let node = CssNode::at_rule(at_rule.as_str(), params.as_str())
            .with_child(Self::rule_node(class_selector(candidate), def));
        Ok(vec![GeneratedRule::new(key, node).with_parent_layer(def.layer)])
    }
}

impl RuleGenerator for LookupGenerator {
    fn generate_rules(
        &mut self,
        candidates: &CandidateSet,
    ) -> Result<Vec<GeneratedRule>, CollaboratorError> {
        let mut rules = Vec::new();
        for candidate in candidates.iter() {
            if self.misses.contains(candidate) {
                continue;
            }
            if let Some(cached) = self.class_cache.get(candidate) {
                rules.extend(cached.iter().cloned());
                continue;
            }
            let generated = self.generate_candidate(candidate)?;
            if generated.is_empty() {
                self.misses.insert(candidate.to_string());
            } else {
                rules.extend(generated.iter().cloned());
                self.class_cache.insert(candidate.to_string(), generated);
            }
        }
        Ok(rules)
    }

    fn class_cache_len(&self) -> usize {
        self.class_cache.len()
    }

    fn layer_order(&self) -> &LayerOrder {
        &self.order
    }

    fn name(&self) -> &str {
        "lookup"
    }
}

/// Builds `.class` with every character outside `[A-Za-z0-9_-]` escaped.
fn class_selector(class: &str) -> String {
    if class == WILDCARD {
        return WILDCARD.to_string();
    }
    let mut selector = String::with_capacity(class.len() + 1);
    selector.push('.');
    for c in class.chars() {
        if !(c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            selector.push('\\');
        }
        selector.push(c);
    }
    selector
}
