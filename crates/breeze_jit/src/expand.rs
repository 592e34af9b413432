//! Expansion of `@tailwind` directives.
//!
//! One call handles one stylesheet tree: it finds the directives, generates
//! and assembles rules for the queued content, replaces each directive with
//! its bucket, places variant rules, and removes the `@layer` markers the
//! directives stand for.

use crate::context::BuildContext;
use crate::error::JitError;
use crate::generator::GeneratedRule;
use crate::stylesheet::{assemble, Bucket, Stylesheet};
use breeze_common::{Layer, SourceLocation};
use breeze_css::{CssTree, NodeId, NodeKind};
use breeze_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use std::sync::Arc;
use std::time::Instant;

/// A `@tailwind utilities` directive produced no rules.
pub const NO_UTILITIES_GENERATED: DiagnosticCode = DiagnosticCode::new(Category::Content, 1);

/// No root of a multi-root document holds a components or utilities directive.
pub const NO_INJECTION_ROOT: DiagnosticCode = DiagnosticCode::new(Category::Layout, 1);

/// A directive appears more than once; the last occurrence is used.
pub const DUPLICATE_DIRECTIVE: DiagnosticCode = DiagnosticCode::new(Category::Directive, 1);

/// Names accepted as `@tailwind` params and removed as `@layer` params.
const DIRECTIVE_NAMES: [&str; 4] = ["base", "components", "utilities", "variants"];

/// The last directive node found for each recognized name.
#[derive(Debug, Default)]
struct LayerNodes {
    base: Option<NodeId>,
    components: Option<NodeId>,
    utilities: Option<NodeId>,
    variants: Option<NodeId>,
}

impl LayerNodes {
    fn slot(&mut self, name: &str) -> Option<&mut Option<NodeId>> {
        match name {
            "base" => Some(&mut self.base),
            "components" => Some(&mut self.components),
            "utilities" => Some(&mut self.utilities),
            "variants" => Some(&mut self.variants),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.base.is_none()
            && self.components.is_none()
            && self.utilities.is_none()
            && self.variants.is_none()
    }

    fn has_parent_layer(&self, layer: Option<Layer>) -> bool {
        match layer {
            Some(Layer::Components) => self.components.is_some(),
            Some(Layer::Utilities) => self.utilities.is_some(),
            _ => true,
        }
    }
}

/// Rule counts injected into the tree by one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectedCounts {
    /// Base and defaults rules.
    pub base: usize,
    /// Component rules.
    pub components: usize,
    /// Utility rules.
    pub utilities: usize,
    /// Variant rules that survived filtering.
    pub variants: usize,
}

/// What one expansion pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionReport {
    /// `false` when the tree held no directive and nothing ran.
    pub touched: bool,
    /// Candidates collected, the wildcard included.
    pub candidates: usize,
    /// Rules injected per bucket.
    pub injected: InjectedCounts,
    /// Whether the stylesheet was rebuilt rather than reused.
    pub rebuilt: bool,
}

/// Expands the `@tailwind` directives of `tree`.
///
/// A tree without any recognized directive is left untouched and the queued
/// content stays queued. Otherwise the queued content is consumed, every
/// recognized directive is replaced by its rules, recognized `@layer`
/// markers are removed, and warnings go to `sink`.
pub fn expand_tailwind_at_rules(
    context: &mut BuildContext,
    tree: &mut CssTree,
    sink: &DiagnosticSink,
) -> Result<ExpansionReport, JitError> {
    let started = Instant::now();
    let nodes = scan_directives(tree, sink)?;
    if nodes.is_empty() {
        return Ok(ExpansionReport::default());
    }

    let append_root = resolve_append_root(tree, &nodes, sink)?;

    let (candidates, stats) = context.collect_candidates()?;
    let builds_before = context.stylesheet_builds();
    let sheet = assemble(&candidates, context)?;
    let mut report = ExpansionReport {
        touched: true,
        candidates: candidates.len(),
        rebuilt: context.stylesheet_builds() != builds_before,
        ..ExpansionReport::default()
    };
    if context.debug() {
        tracing::debug!(
            candidates = report.candidates,
            lines = stats.lines,
            cache_hits = stats.cache_hits,
            rules = context.rule_cache().len(),
            rebuilt = report.rebuilt,
            "assembled stylesheet"
        );
    }

    let utilities_location = match nodes.utilities {
        Some(id) => tree.source(id)?,
        None => None,
    };

    report.injected.base = replace_directive(tree, nodes.base, sheet.base_with_defaults())?;
    report.injected.components = replace_directive(
        tree,
        nodes.components,
        sheet.bucket(Bucket::Components).iter(),
    )?;
    report.injected.utilities = replace_directive(
        tree,
        nodes.utilities,
        sheet.bucket(Bucket::Utilities).iter(),
    )?;

    let variants: Vec<&Arc<GeneratedRule>> = sheet
        .bucket(Bucket::Variants)
        .iter()
        .filter(|rule| nodes.has_parent_layer(rule.parent_layer))
        .collect();
    report.injected.variants = place_variants(tree, nodes.variants, append_root, &variants)?;

    if nodes.utilities.is_some() && no_utilities(&sheet, &variants) {
        sink.emit(
            Diagnostic::warning(
                NO_UTILITIES_GENERATED,
                "no utility classes were generated for this stylesheet",
            )
            .at(utilities_location)
            .with_help("check that the [content] configuration matches your template files"),
        );
    }

    remove_layer_markers(tree)?;
    context.clear_changed_content();

    if context.debug() {
        tracing::debug!(
            base = report.injected.base,
            components = report.injected.components,
            utilities = report.injected.utilities,
            variants = report.injected.variants,
            elapsed_us = started.elapsed().as_micros() as u64,
            "expanded directives"
        );
    }
    Ok(report)
}

/// Records the last `@tailwind` directive per recognized name.
fn scan_directives(tree: &CssTree, sink: &DiagnosticSink) -> Result<LayerNodes, JitError> {
    let mut nodes = LayerNodes::default();
    for id in tree.walk_at_rules("tailwind") {
        let NodeKind::AtRule { params, .. } = tree.kind(id)? else {
            continue;
        };
        let Some(slot) = nodes.slot(params.trim()) else {
            continue;
        };
        if let Some(earlier) = slot.replace(id) {
            sink.emit(
                Diagnostic::warning(
                    DUPLICATE_DIRECTIVE,
                    format!("`@tailwind {}` appears more than once", params.trim()),
                )
                .at(tree.source(id)?)
                .with_note(earlier_note(tree.source(earlier)?)),
            );
        }
    }
    Ok(nodes)
}

fn earlier_note(location: Option<SourceLocation>) -> String {
    match location {
        Some(loc) => format!(
            "the occurrence at {} is left in place and not expanded",
            loc.start
        ),
        None => "the earlier occurrence is left in place and not expanded".to_string(),
    }
}

/// Picks where variant rules go when there is no `variants` directive.
///
/// In a multi-root document this is the last root holding the components or
/// utilities directive, falling back to the document itself with a warning.
fn resolve_append_root(
    tree: &CssTree,
    nodes: &LayerNodes,
    sink: &DiagnosticSink,
) -> Result<NodeId, JitError> {
    let document = tree.root();
    if !tree.is_document() || nodes.variants.is_some() {
        return Ok(document);
    }
    let anchors: Vec<NodeId> = [nodes.components, nodes.utilities]
        .into_iter()
        .flatten()
        .collect();
    let mut found = None;
    for &root in tree.children(document)?.iter().rev() {
        if matches!(tree.kind(root)?, NodeKind::Root)
            && anchors.iter().any(|&anchor| tree.contains(root, anchor))
        {
            found = Some(root);
            break;
        }
    }
    match found {
        Some(root) => Ok(root),
        None => {
            sink.emit(
                Diagnostic::warning(
                    NO_INJECTION_ROOT,
                    "no stylesheet in this document has a components or utilities directive",
                )
                .at(tree.source(document)?)
                .with_note("variant rules are appended to the end of the document"),
            );
            Ok(document)
        }
    }
}

/// Inserts copies of `rules` before the directive and removes it.
fn replace_directive<'a>(
    tree: &mut CssTree,
    directive: Option<NodeId>,
    rules: impl Iterator<Item = &'a Arc<GeneratedRule>>,
) -> Result<usize, JitError> {
    let Some(directive) = directive else {
        return Ok(0);
    };
    let source = tree.source(directive)?;
    let inserted = tree.insert_copies_before(directive, rules.map(|rule| &rule.node), source)?;
    tree.remove(directive)?;
    Ok(inserted.len())
}

fn place_variants(
    tree: &mut CssTree,
    directive: Option<NodeId>,
    append_root: NodeId,
    variants: &[&Arc<GeneratedRule>],
) -> Result<usize, JitError> {
    if directive.is_some() {
        return replace_directive(tree, directive, variants.iter().copied());
    }
    if variants.is_empty() {
        return Ok(0);
    }
    let source = tree.source(append_root)?;
    let appended = tree.append_copies(append_root, variants.iter().map(|rule| &rule.node), source)?;
    Ok(appended.len())
}

fn no_utilities(sheet: &Stylesheet, variants: &[&Arc<GeneratedRule>]) -> bool {
    sheet.bucket(Bucket::Utilities).is_empty()
        && !variants
            .iter()
            .any(|rule| rule.parent_layer == Some(Layer::Utilities))
}

/// Removes `@layer` at-rules named after a recognized directive.
fn remove_layer_markers(tree: &mut CssTree) -> Result<(), JitError> {
    for id in tree.walk_at_rules("layer") {
        if !tree.is_attached(id) {
            continue;
        }
        let recognized = matches!(
            tree.kind(id)?,
            NodeKind::AtRule { params, .. } if DIRECTIVE_NAMES.contains(&params.trim())
        );
        if recognized {
            tree.remove(id)?;
        }
    }
    Ok(())
}
