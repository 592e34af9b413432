//! Integration tests for whole build passes: parse a stylesheet, expand its
//! directives against queued content, print the result.
//!
//! These tests exercise caching across passes, bucket routing, variant
//! placement in single- and multi-root trees, and the diagnostics a pass
//! emits.

use breeze_common::{InputId, Layer, LayerOrder, SourceInputs};
use breeze_config::{load_config, load_config_from_str, ConfigError, JitConfig, CONFIG_FILE_NAME};
use breeze_css::{parse, parse_document, to_css, CssTree};
use breeze_diagnostics::{DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use breeze_jit::{
    diagnostic_sink, expand_tailwind_at_rules, BuildContext, Bucket, CandidateSet,
    ChangedContent, CollaboratorError, ExpansionReport, GeneratedRule, JitError, LookupGenerator,
    RuleGenerator, NO_UTILITIES_GENERATED,
};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lookup(order: LayerOrder) -> LookupGenerator {
    let mut generator = LookupGenerator::with_default_screens(order);
    generator
        .add_class_with_selector(
            "*",
            Layer::Defaults,
            "*, ::before, ::after",
            [("--tw-ring-inset", "var(--tw-empty,/*!*/ /*!*/)")],
        )
        .add_class_with_selector("html", Layer::Base, "html", [("line-height", "1.5")])
        .add_class("btn", Layer::Components, [("padding", "0.5rem 1rem")])
        .add_class("p-4", Layer::Utilities, [("padding", "1rem")])
        .add_class("m-2", Layer::Utilities, [("margin", "0.5rem")])
        .add_class("flex", Layer::Utilities, [("display", "flex")]);
    generator
}

fn context() -> BuildContext {
    let config = JitConfig::default();
    BuildContext::new(&config, Box::new(lookup(LayerOrder::default()))).unwrap()
}

fn input(n: u32) -> InputId {
    InputId::from_raw(n)
}

fn pass(context: &mut BuildContext, tree: &mut CssTree) -> (ExpansionReport, DiagnosticSink) {
    let sink = DiagnosticSink::new();
    let report = expand_tailwind_at_rules(context, tree, &sink).unwrap();
    (report, sink)
}

fn expand_css(context: &mut BuildContext, css: &str) -> String {
    let mut tree = parse(input(0), css).unwrap();
    pass(context, &mut tree);
    to_css(&tree)
}

const DIRECTIVES: &str = "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n";

// ===========================================================================
// Idempotence and cache growth
// ===========================================================================

#[test]
fn repeated_pass_is_byte_identical_and_reuses_stylesheet() {
    let mut context = context();
    context.push_content(ChangedContent::new("<div class=\"btn p-4 md:p-4\">", "html"));
    let first = expand_css(&mut context, DIRECTIVES);
    let sheet = Arc::clone(context.stylesheet().unwrap());
    let builds = context.stylesheet_builds();

    let mut tree = parse(input(0), DIRECTIVES).unwrap();
    let (report, _) = pass(&mut context, &mut tree);
    assert_eq!(to_css(&tree), first);
    assert!(!report.rebuilt);
    assert_eq!(context.stylesheet_builds(), builds);
    assert!(Arc::ptr_eq(&sheet, context.stylesheet().unwrap()));
}

#[test]
fn resubmitting_known_content_reuses_stylesheet() {
    let mut context = context();
    context.push_content(ChangedContent::new("flex p-4", "html"));
    let first = expand_css(&mut context, DIRECTIVES);
    context.push_content(ChangedContent::new("p-4 flex", "vue"));
    let second = expand_css(&mut context, DIRECTIVES);
    assert_eq!(first, second);
    assert_eq!(context.stylesheet_builds(), 1);
}

#[test]
fn rule_cache_only_grows_across_passes() {
    let mut context = context();
    context.push_content(ChangedContent::new("p-4", "html"));
    let first = expand_css(&mut context, DIRECTIVES);
    let rules_after_first = context.rule_cache().len();

    context.push_content(ChangedContent::new("m-2", "html"));
    let second = expand_css(&mut context, DIRECTIVES);
    assert!(context.rule_cache().len() > rules_after_first);
    assert!(first.contains(".p-4"));
    assert!(second.contains(".p-4"));
    assert!(second.contains(".m-2"));
    assert_eq!(context.stylesheet_builds(), 2);
}

#[test]
fn unknown_candidates_do_not_rebuild() {
    let mut context = context();
    context.push_content(ChangedContent::new("p-4", "html"));
    expand_css(&mut context, DIRECTIVES);
    context.push_content(ChangedContent::new("not-a-class", "html"));
    let mut tree = parse(input(0), DIRECTIVES).unwrap();
    let (report, _) = pass(&mut context, &mut tree);
    assert!(!report.rebuilt);
}

// ===========================================================================
// Ordering and routing
// ===========================================================================

#[test]
fn utilities_are_injected_in_key_order() {
    let order = LayerOrder::default();
    let mut generator = LookupGenerator::new(order.clone());
    generator
        .add_class("r1", Layer::Utilities, [("order", "1")])
        .add_class("r2", Layer::Utilities, [("order", "2")]);
    let mut context = BuildContext::new(&JitConfig::default(), Box::new(generator)).unwrap();
    context.push_content(ChangedContent::new("r2 r1", "html"));
    let out = expand_css(&mut context, "@tailwind utilities;");
    assert_eq!(out, ".r1 {\n  order: 1;\n}\n.r2 {\n  order: 2;\n}\n");
}

#[test]
fn every_flagged_rule_lands_in_exactly_one_bucket() {
    let mut context = context();
    context.push_content(ChangedContent::new("<html> btn p-4 m-2 flex sm:flex lg:btn", "html"));
    expand_css(&mut context, DIRECTIVES);
    let sheet = context.stylesheet().unwrap();
    let buckets = [
        Bucket::Base,
        Bucket::Defaults,
        Bucket::Components,
        Bucket::Utilities,
        Bucket::Variants,
        Bucket::User,
    ];
    let total: usize = buckets.iter().map(|&b| sheet.bucket(b).len()).sum();
    assert_eq!(total, context.rule_cache().len());
    for rule in context.rule_cache().iter() {
        let homes = buckets
            .iter()
            .filter(|&&b| sheet.bucket(b).iter().any(|r| Arc::ptr_eq(r, rule)))
            .count();
        assert_eq!(homes, 1);
    }
    let threshold = context.layer_order().minimum_variant_threshold();
    assert!(sheet.bucket(Bucket::Variants).iter().all(|r| r.sort >= threshold));
    assert!(sheet.bucket(Bucket::Utilities).iter().all(|r| r.sort < threshold));
}

#[test]
fn base_directive_receives_base_then_defaults() {
    let mut context = context();
    context.push_content(ChangedContent::new("<html>", "html"));
    let out = expand_css(&mut context, "@tailwind base;");
    let html = out.find("html {").unwrap();
    let star = out.find("*, ::before, ::after {").unwrap();
    assert!(html < star);
}

// ===========================================================================
// Variant placement
// ===========================================================================

#[test]
fn component_variants_dropped_without_components_directive() {
    let mut context = context();
    context.push_content(ChangedContent::new("md:btn md:p-4", "html"));
    let out = expand_css(&mut context, "@tailwind utilities;");
    assert!(out.contains(".md\\:p-4"));
    assert!(!out.contains(".md\\:btn"));
}

#[test]
fn variants_append_to_root_holding_utilities() {
    let mut context = context();
    context.push_content(ChangedContent::new("p-4 md:p-4", "html"));
    let mut tree = parse_document(&[
        (input(0), "@tailwind base;"),
        (input(1), ".first { color: red; }\n@tailwind utilities;\n.last { color: blue; }"),
        (input(2), ".other { color: green; }"),
    ])
    .unwrap();
    let (report, sink) = pass(&mut context, &mut tree);
    assert_eq!(report.injected.variants, 1);
    assert!(sink.diagnostics().is_empty());

    let roots = tree.children(tree.root()).unwrap().to_vec();
    let second_root = tree.children(roots[1]).unwrap().to_vec();
    let appended = *second_root.last().unwrap();
    assert_eq!(
        tree.to_fragment(appended).unwrap().to_css(),
        "@media (min-width: 768px) {\n  .md\\:p-4 {\n    padding: 1rem;\n  }\n}\n"
    );
    assert_eq!(tree.source(appended).unwrap(), tree.source(roots[1]).unwrap());
    assert_eq!(tree.children(roots[2]).unwrap().len(), 1);
}

#[test]
fn last_anchor_root_wins() {
    let mut context = context();
    context.push_content(ChangedContent::new("btn md:btn", "html"));
    let mut tree = parse_document(&[
        (input(0), "@tailwind components;"),
        (input(1), "@tailwind components;"),
    ])
    .unwrap();
    pass(&mut context, &mut tree);
    let roots = tree.children(tree.root()).unwrap().to_vec();
    let first = tree.to_fragment(roots[0]).unwrap().to_css();
    let second = tree.to_fragment(roots[1]).unwrap().to_css();
    assert!(!first.contains("@media"));
    assert!(second.contains("@media"));
}

// ===========================================================================
// Diagnostics
// ===========================================================================

#[test]
fn empty_utilities_warns_once() {
    let mut context = context();
    context.push_content(ChangedContent::new("<p>nothing here</p>", "html"));
    let mut tree = parse(input(0), "@tailwind utilities;").unwrap();
    let (_, sink) = pass(&mut context, &mut tree);
    assert_eq!(sink.count(NO_UTILITIES_GENERATED), 1);
    let diags = sink.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Severity::Warning);
    assert!(diags[0].location.is_some());
}

#[test]
fn warnings_render_with_input_names() {
    let mut inputs = SourceInputs::new();
    inputs.add("reset.css");
    let app = inputs.add("app.css");
    let mut context = context();
    let mut tree = parse(app, "/* app */\n@tailwind utilities;\n").unwrap();
    let (_, sink) = pass(&mut context, &mut tree);
    let rendered = TerminalRenderer::new(false).render(&sink.take_all()[0], &inputs);
    assert!(rendered.starts_with("warning[C001]: "));
    assert!(rendered.contains("  --> app.css:2:1\n"));
    assert!(rendered.contains("   = help: "));
}

#[test]
fn utility_variant_suppresses_empty_warning() {
    let mut context = context();
    context.push_content(ChangedContent::new("md:p-4", "html"));
    let mut tree = parse(input(0), "@tailwind utilities;").unwrap();
    let (_, sink) = pass(&mut context, &mut tree);
    assert_eq!(sink.count(NO_UTILITIES_GENERATED), 0);
}

#[test]
fn configured_policy_promotes_and_suppresses() {
    let mut config = JitConfig::default();
    config.diagnostics.deny.push("C001".to_string());
    let sink = diagnostic_sink(&config).unwrap();
    let mut context = BuildContext::new(&config, Box::new(lookup(LayerOrder::default()))).unwrap();
    let mut tree = parse(input(0), "@tailwind utilities;").unwrap();
    expand_tailwind_at_rules(&mut context, &mut tree, &sink).unwrap();
    assert!(sink.has_errors());

    config.diagnostics.deny.clear();
    config.diagnostics.allow.push("C001".to_string());
    let sink = diagnostic_sink(&config).unwrap();
    let mut tree = parse(input(0), "@tailwind utilities;").unwrap();
    expand_tailwind_at_rules(&mut context, &mut tree, &sink).unwrap();
    assert!(sink.diagnostics().is_empty());
}

// ===========================================================================
// Collaborator failures and configuration
// ===========================================================================

struct FailingGenerator {
    order: LayerOrder,
}

impl RuleGenerator for FailingGenerator {
    fn generate_rules(
        &mut self,
        _candidates: &CandidateSet,
    ) -> Result<Vec<GeneratedRule>, CollaboratorError> {
        Err("plugin crashed".into())
    }

    fn class_cache_len(&self) -> usize {
        0
    }

    fn layer_order(&self) -> &LayerOrder {
        &self.order
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[test]
fn generator_failure_aborts_pass() {
    let generator = FailingGenerator {
        order: LayerOrder::default(),
    };
    let mut context = BuildContext::new(&JitConfig::default(), Box::new(generator)).unwrap();
    context.push_content(ChangedContent::new("p-4", "html"));
    let mut tree = parse(input(0), "@tailwind utilities;").unwrap();
    let err = expand_tailwind_at_rules(&mut context, &mut tree, &DiagnosticSink::new()).unwrap_err();
    assert_eq!(err.to_string(), "rule generator 'failing' failed: plugin crashed");
    assert_eq!(context.changed_content().len(), 1);
    assert_eq!(tree.walk_at_rules("tailwind").len(), 1);
}

#[test]
fn context_from_project_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[layers]\nvariants = [\"md\"]\n\n[content]\ncache_capacity = 10\n",
    )
    .unwrap();
    let config = load_config(dir.path()).unwrap();
    let order = config.layers.layer_order().unwrap();
    let mut context = BuildContext::new(&config, Box::new(lookup(order))).unwrap();
    context.push_content(ChangedContent::new("sm:p-4 md:p-4", "html"));
    let out = expand_css(&mut context, "@tailwind utilities;");
    assert!(out.contains(".md\\:p-4"));
    assert!(!out.contains(".sm\\:p-4"));
}

#[test]
fn generator_with_foreign_layout_is_rejected() {
    let config = load_config_from_str("[layers]\nsub_order_bits = 8\n").unwrap();
    let generator = lookup(LayerOrder::default());
    let err = BuildContext::new(&config, Box::new(generator)).err().unwrap();
    assert!(matches!(err, JitError::Config(ConfigError::ValidationError(_))));

    let order = config.layers.layer_order().unwrap();
    let mut context = BuildContext::new(&config, Box::new(lookup(order))).unwrap();
    context.push_content(ChangedContent::new("p-4", "html"));
    let sink = DiagnosticSink::new();
    let mut tree = parse(input(0), ".a {}\n@tailwind utilities;\n.z {}\n").unwrap();
    expand_tailwind_at_rules(&mut context, &mut tree, &sink).unwrap();
    let out = to_css(&tree);
    let utility = out.find(".p-4").unwrap();
    assert!(out.find(".a").unwrap() < utility);
    assert!(utility < out.find(".z").unwrap());
    assert_eq!(sink.count(NO_UTILITIES_GENERATED), 0);
}
