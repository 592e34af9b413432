//! Candidate collection over changed template content.

use crate::error::JitError;
use crate::extract::ExtractorRegistry;
use std::collections::{BTreeSet, HashSet};

/// Candidate that matches rules applying to every element.
pub const WILDCARD: &str = "*";

/// Token some extractors emit for unparseable input; never a candidate.
pub const NOISE: &str = "!*";

/// A unit of template content that changed since the last pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedContent {
    /// Raw file text.
    pub content: String,
    /// File extension without the dot, used to pick a transformer and extractor.
    pub extension: String,
}

impl ChangedContent {
    /// Creates a content unit.
    pub fn new(content: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            extension: extension.into(),
        }
    }
}

/// The deduplicated candidate class names of one pass.
///
/// Always contains [`WILDCARD`]. Iteration is in lexical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    candidates: BTreeSet<String>,
}

impl CandidateSet {
    /// Creates a set holding only the wildcard.
    pub fn new() -> Self {
        Self {
            candidates: BTreeSet::from([WILDCARD.to_string()]),
        }
    }

    /// Adds a candidate. Returns `false` if it was already present.
    pub fn insert(&mut self, candidate: impl Into<String>) -> bool {
        self.candidates.insert(candidate.into())
    }

    /// Returns `true` if the set contains `candidate`.
    pub fn contains(&self, candidate: &str) -> bool {
        self.candidates.contains(candidate)
    }

    /// Number of candidates, the wildcard included.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always `false`: the wildcard is never removed.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Iterates the candidates in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(String::as_str)
    }
}

impl Default for CandidateSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<String> for CandidateSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.candidates.extend(iter);
    }
}

impl<S: Into<String>> FromIterator<S> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter.into_iter().map(Into::into));
        set
    }
}

/// Counters describing one collection call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Content units scanned.
    pub units: usize,
    /// Distinct trimmed lines looked up.
    pub lines: usize,
    /// Lines answered by an extraction cache.
    pub cache_hits: usize,
    /// Lines that ran an extractor.
    pub extracted: usize,
}

/// Collects the candidates of `changed` using the registry's extractors.
pub fn collect(
    changed: &[ChangedContent],
    registry: &mut ExtractorRegistry,
) -> Result<CandidateSet, JitError> {
    collect_with_stats(changed, registry).map(|(candidates, _)| candidates)
}

/// Like [`collect`], also returning cache counters.
///
/// A line seen earlier in the same call is skipped, whichever unit it came
/// from. Lines seen in earlier calls are answered by the extractor's cache.
pub fn collect_with_stats(
    changed: &[ChangedContent],
    registry: &mut ExtractorRegistry,
) -> Result<(CandidateSet, CollectStats), JitError> {
    let mut candidates = CandidateSet::new();
    let mut stats = CollectStats::default();
    let mut seen: HashSet<String> = HashSet::new();

    for unit in changed {
        stats.units += 1;
        let selection = registry.resolve(&unit.extension)?;
        let text = registry.transform(selection.transformer, &unit.extension, &unit.content)?;
        for line in text.split('\n') {
            let line = line.trim();
            if seen.contains(line) {
                continue;
            }
            stats.lines += 1;
            if registry.extract_line(selection.extractor, &unit.extension, line, &mut candidates)? {
                stats.cache_hits += 1;
            } else {
                stats.extracted += 1;
            }
            seen.insert(line.to_string());
        }
    }
    tracing::trace!(
        units = stats.units,
        lines = stats.lines,
        cache_hits = stats.cache_hits,
        candidates = candidates.len(),
        "collected candidates"
    );
    Ok((candidates, stats))
}
