//! Integration tests for candidate extraction and the per-extractor caches.

use breeze_config::{ContentConfig, DEFAULT_CACHE_CAPACITY};
use breeze_jit::{collect, collect_with_stats, ChangedContent, CollaboratorError, ExtractorRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn registry() -> ExtractorRegistry {
    ExtractorRegistry::from_config(&ContentConfig::default()).unwrap()
}

#[test]
fn class_attribute_yields_its_classes() {
    let mut registry = registry();
    let changed = [ChangedContent::new("<div class=\"p-4 text-center\">", "html")];
    let candidates = collect(&changed, &mut registry).unwrap();
    assert!(candidates.contains("p-4"));
    assert!(candidates.contains("text-center"));
    assert!(candidates.contains("*"));
}

#[test]
fn duplicate_line_is_extracted_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut registry = registry();
    registry.register_extractor(
        "counting",
        move |line: &str| -> Result<Vec<String>, CollaboratorError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(line.split_whitespace().map(String::from).collect())
        },
    );
    registry.set_extractor("html", "counting");
    let line = "<div class=\"p-4 text-center\">";
    let changed = [ChangedContent::new(format!("{line}\n{line}"), "html")];
    collect(&changed, &mut registry).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn lru_evicts_oldest_line_past_capacity() {
    let mut registry = registry();
    let text = (0..=DEFAULT_CACHE_CAPACITY)
        .map(|i| format!("class-{i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let (_, stats) = collect_with_stats(&[ChangedContent::new(text, "html")], &mut registry).unwrap();
    assert_eq!(stats.extracted, DEFAULT_CACHE_CAPACITY + 1);

    let extractor = registry.resolve("html").unwrap().extractor;
    let cache = registry.cache(extractor).unwrap();
    assert_eq!(cache.len(), DEFAULT_CACHE_CAPACITY);
    assert!(!cache.contains("class-0"));
    assert!(cache.contains("class-1"));
    assert!(cache.contains(&format!("class-{DEFAULT_CACHE_CAPACITY}")));
}

#[test]
fn recently_used_line_survives_eviction() {
    let mut registry = ExtractorRegistry::new(3).unwrap();
    collect(&[ChangedContent::new("a\nb\nc", "html")], &mut registry).unwrap();
    collect(&[ChangedContent::new("a", "html")], &mut registry).unwrap();
    collect(&[ChangedContent::new("d", "html")], &mut registry).unwrap();

    let extractor = registry.resolve("html").unwrap().extractor;
    let cache = registry.cache(extractor).unwrap();
    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert!(cache.contains("d"));
}

#[test]
fn each_extractor_has_its_own_cache() {
    let mut registry = registry();
    let words = registry.register_extractor(
        "words",
        |line: &str| -> Result<Vec<String>, CollaboratorError> {
            Ok(line.split_whitespace().map(String::from).collect())
        },
    );
    registry.set_extractor("md", "words");
    collect(
        &[
            ChangedContent::new("flex grid", "md"),
            ChangedContent::new("block", "html"),
        ],
        &mut registry,
    )
    .unwrap();
    let default = registry.resolve("html").unwrap().extractor;
    assert_ne!(default, words);
    assert!(registry.cache(words).unwrap().contains("flex grid"));
    assert!(!registry.cache(words).unwrap().contains("block"));
    assert!(registry.cache(default).unwrap().contains("block"));
}

#[test]
fn svelte_class_directives_become_candidates() {
    let mut registry = registry();
    let changed = [ChangedContent::new(
        "<button class:hidden={closed} class=\"btn\">",
        "svelte",
    )];
    let candidates = collect(&changed, &mut registry).unwrap();
    assert!(candidates.contains("hidden"));
    assert!(candidates.contains("btn"));
    assert!(!candidates.contains("class:hidden"));
}
