//! Extractors, transformers and the registry that owns their line caches.
//!
//! Every registered extractor gets a stable [`ExtractorId`] and its own
//! bounded [`ExtractionCache`]. Selection per file extension walks the chain
//! `configured[ext] -> configured[DEFAULT] -> builtin[ext] -> builtin[DEFAULT]`
//! once and remembers the answer.

use crate::error::{CollaboratorError, JitError};
use breeze_common::{BreezeResult, InternalError};
use breeze_config::{ConfigError, ContentConfig, DEFAULT_KEY};
use lru::LruCache;
use regex::Regex;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Name of the built-in default extractor.
pub const DEFAULT_EXTRACTOR: &str = "default";

/// Name of the built-in pass-through transformer.
pub const IDENTITY_TRANSFORMER: &str = "identity";

/// Name of the built-in Svelte transformer.
pub const SVELTE_TRANSFORMER: &str = "svelte";

/// Turns one line of normalized template text into candidate class names.
///
/// Implementations must be pure: the same line always yields the same
/// candidates, since results are cached per line.
pub trait Extractor: Send + Sync {
    /// Returns the candidates found in `line`, possibly with duplicates.
    fn extract(&self, line: &str) -> Result<Vec<String>, CollaboratorError>;
}

impl<F> Extractor for F
where
    F: Fn(&str) -> Result<Vec<String>, CollaboratorError> + Send + Sync,
{
    fn extract(&self, line: &str) -> Result<Vec<String>, CollaboratorError> {
        self(line)
    }
}

/// Normalizes raw template text before extraction.
pub trait Transformer: Send + Sync {
    /// Returns the normalized text, borrowing the input when nothing changed.
    fn transform<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, CollaboratorError>;
}

impl<F> Transformer for F
where
    F: Fn(&str) -> Result<String, CollaboratorError> + Send + Sync,
{
    fn transform<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, CollaboratorError> {
        self(text).map(Cow::Owned)
    }
}

/// The built-in extractor: every run of characters that can appear in a class
/// attribute, plus the inner tokens of those runs.
pub struct DefaultExtractor {
    broad: Regex,
    inner: Regex,
}

impl DefaultExtractor {
    /// Compiles the extractor's patterns.
    pub fn new() -> BreezeResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| InternalError::new(format!("default extractor pattern: {e}")))
        };
        Ok(Self {
            broad: compile(r#"[^<>"'`\s]*\[[^<>"'`\s]*\]|[^<>"'`\s]*[^<>"'`\s:]"#)?,
            inner: compile(r#"[^<>"'`\s.(){}\[\]#=%]*[^<>"'`\s.(){}\[\]#=%:]"#)?,
        })
    }
}

impl Extractor for DefaultExtractor {
    fn extract(&self, line: &str) -> Result<Vec<String>, CollaboratorError> {
        Ok(self
            .broad
            .find_iter(line)
            .chain(self.inner.find_iter(line))
            .map(|m| m.as_str().to_string())
            .collect())
    }
}

/// Built-in transformer for `.svelte` files: rewrites `class:name={...}`
/// directives so the class name stands alone.
pub struct SvelteTransformer {
    directive: Regex,
}

impl SvelteTransformer {
    /// Compiles the transformer's pattern.
    pub fn new() -> BreezeResult<Self> {
        let directive = Regex::new(r"(?:^|\s)class:")
            .map_err(|e| InternalError::new(format!("svelte transformer pattern: {e}")))?;
        Ok(Self { directive })
    }
}

impl Transformer for SvelteTransformer {
    fn transform<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, CollaboratorError> {
        Ok(self.directive.replace_all(text, " "))
    }
}

struct IdentityTransformer;

impl Transformer for IdentityTransformer {
    fn transform<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, CollaboratorError> {
        Ok(Cow::Borrowed(text))
    }
}

/// Stable handle of a registered extractor and its cache.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ExtractorId(u32);

impl ExtractorId {
    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// Stable handle of a registered transformer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TransformerId(u32);

impl TransformerId {
    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// Bounded least-recently-used map from a trimmed line to its candidates.
pub struct ExtractionCache {
    lines: LruCache<String, Vec<String>>,
}

impl ExtractionCache {
    /// Creates a cache holding at most `capacity` lines.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            lines: LruCache::new(capacity),
        }
    }

    /// Returns the cached candidates of a line and marks it recently used.
    pub fn get(&mut self, line: &str) -> Option<&[String]> {
        self.lines.get(line).map(Vec::as_slice)
    }

    /// Stores the candidates of a line, evicting the least recently used
    /// line when full.
    pub fn insert(&mut self, line: String, candidates: Vec<String>) {
        self.lines.put(line, candidates);
    }

    /// Returns `true` if the line is cached, without touching its recency.
    pub fn contains(&self, line: &str) -> bool {
        self.lines.contains(line)
    }

    /// Number of cached lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of cached lines.
    pub fn capacity(&self) -> usize {
        self.lines.cap().get()
    }
}

struct ExtractorEntry {
    name: String,
    extractor: Arc<dyn Extractor>,
    cache: ExtractionCache,
}

struct TransformerEntry {
    name: String,
    transformer: Arc<dyn Transformer>,
}

/// What the fallback chain chose for one extension.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Selection {
    /// Transformer applied before extraction.
    pub transformer: TransformerId,
    /// Extractor run on each unseen line.
    pub extractor: ExtractorId,
}

/// Registered extractors and transformers, per-extension selection, and the
/// per-extractor line caches.
pub struct ExtractorRegistry {
    extractors: Vec<ExtractorEntry>,
    transformers: Vec<TransformerEntry>,
    extractor_names: HashMap<String, ExtractorId>,
    transformer_names: HashMap<String, TransformerId>,
    configured_extractors: BTreeMap<String, String>,
    configured_transformers: BTreeMap<String, String>,
    builtin_extractors: HashMap<String, ExtractorId>,
    builtin_transformers: HashMap<String, TransformerId>,
    resolved: HashMap<String, Selection>,
    cache_capacity: NonZeroUsize,
}

impl ExtractorRegistry {
    /// Creates a registry holding only the built-ins, with per-extractor
    /// caches of `cache_capacity` lines. A zero capacity is rejected.
    pub fn new(cache_capacity: usize) -> Result<Self, JitError> {
        let cache_capacity = NonZeroUsize::new(cache_capacity).ok_or_else(|| {
            ConfigError::ValidationError("content.cache_capacity must be positive".to_string())
        })?;
        let mut registry = Self {
            extractors: Vec::new(),
            transformers: Vec::new(),
            extractor_names: HashMap::new(),
            transformer_names: HashMap::new(),
            configured_extractors: BTreeMap::new(),
            configured_transformers: BTreeMap::new(),
            builtin_extractors: HashMap::new(),
            builtin_transformers: HashMap::new(),
            resolved: HashMap::new(),
            cache_capacity,
        };
        let default = registry.register_extractor(DEFAULT_EXTRACTOR, DefaultExtractor::new()?);
        registry
            .builtin_extractors
            .insert(DEFAULT_KEY.to_string(), default);

        let identity = registry.register_transformer(IDENTITY_TRANSFORMER, IdentityTransformer);
        let svelte = registry.register_transformer(SVELTE_TRANSFORMER, SvelteTransformer::new()?);
        registry
            .builtin_transformers
            .insert(DEFAULT_KEY.to_string(), identity);
        registry
            .builtin_transformers
            .insert("svelte".to_string(), svelte);
        Ok(registry)
    }

    /// Creates a registry with the built-ins and the per-extension selection
    /// of a `[content]` section.
    ///
    /// Names are checked when an extension first resolves to them, so
    /// extractors registered after construction may still be selected.
    pub fn from_config(content: &ContentConfig) -> Result<Self, JitError> {
        let mut registry = Self::new(content.cache_capacity)?;
        registry.configured_extractors = content.extractors.clone();
        registry.configured_transformers = content.transformers.clone();
        Ok(registry)
    }

    /// Registers an extractor under `name` with a fresh cache.
    ///
    /// Registering an existing name replaces it for future selections; the
    /// old id and its cache stay valid.
    pub fn register_extractor(
        &mut self,
        name: impl Into<String>,
        extractor: impl Extractor + 'static,
    ) -> ExtractorId {
        let name = name.into();
        let id = ExtractorId(self.extractors.len() as u32);
        self.extractors.push(ExtractorEntry {
            name: name.clone(),
            extractor: Arc::new(extractor),
            cache: ExtractionCache::new(self.cache_capacity),
        });
        self.extractor_names.insert(name, id);
        self.resolved.clear();
        id
    }

    /// Registers a transformer under `name`.
    pub fn register_transformer(
        &mut self,
        name: impl Into<String>,
        transformer: impl Transformer + 'static,
    ) -> TransformerId {
        let name = name.into();
        let id = TransformerId(self.transformers.len() as u32);
        self.transformers.push(TransformerEntry {
            name: name.clone(),
            transformer: Arc::new(transformer),
        });
        self.transformer_names.insert(name, id);
        self.resolved.clear();
        id
    }

    /// Selects the extractor named `name` for `extension` (or [`DEFAULT_KEY`]).
    pub fn set_extractor(&mut self, extension: impl Into<String>, name: impl Into<String>) {
        self.configured_extractors
            .insert(extension.into(), name.into());
        self.resolved.clear();
    }

    /// Selects the transformer named `name` for `extension` (or [`DEFAULT_KEY`]).
    pub fn set_transformer(&mut self, extension: impl Into<String>, name: impl Into<String>) {
        self.configured_transformers
            .insert(extension.into(), name.into());
        self.resolved.clear();
    }

    /// Returns the id currently registered under `name`.
    pub fn extractor_id(&self, name: &str) -> Option<ExtractorId> {
        self.extractor_names.get(name).copied()
    }

    /// Returns the id currently registered under `name`.
    pub fn transformer_id(&self, name: &str) -> Option<TransformerId> {
        self.transformer_names.get(name).copied()
    }

    /// Returns the registered name of an extractor.
    pub fn extractor_name(&self, id: ExtractorId) -> Option<&str> {
        self.extractors.get(id.0 as usize).map(|e| e.name.as_str())
    }

    /// Returns the registered name of a transformer.
    pub fn transformer_name(&self, id: TransformerId) -> Option<&str> {
        self.transformers.get(id.0 as usize).map(|t| t.name.as_str())
    }

    /// Returns the line cache of an extractor.
    pub fn cache(&self, id: ExtractorId) -> Option<&ExtractionCache> {
        self.extractors.get(id.0 as usize).map(|e| &e.cache)
    }

    /// Resolves the transformer and extractor for `extension`.
    pub fn resolve(&mut self, extension: &str) -> Result<Selection, JitError> {
        if let Some(selection) = self.resolved.get(extension) {
            return Ok(*selection);
        }
        let selection = Selection {
            transformer: self.resolve_transformer(extension)?,
            extractor: self.resolve_extractor(extension)?,
        };
        self.resolved.insert(extension.to_string(), selection);
        Ok(selection)
    }

    fn resolve_extractor(&self, extension: &str) -> Result<ExtractorId, JitError> {
        for key in [extension, DEFAULT_KEY] {
            if let Some(name) = self.configured_extractors.get(key) {
                return self
                    .extractor_id(name)
                    .ok_or_else(|| JitError::UnknownExtractor {
                        name: name.clone(),
                        extension: key.to_string(),
                    });
            }
        }
        self.builtin_extractors
            .get(extension)
            .or_else(|| self.builtin_extractors.get(DEFAULT_KEY))
            .copied()
            .ok_or_else(|| InternalError::new("built-in default extractor missing").into())
    }

    fn resolve_transformer(&self, extension: &str) -> Result<TransformerId, JitError> {
        for key in [extension, DEFAULT_KEY] {
            if let Some(name) = self.configured_transformers.get(key) {
                return self
                    .transformer_id(name)
                    .ok_or_else(|| JitError::UnknownTransformer {
                        name: name.clone(),
                        extension: key.to_string(),
                    });
            }
        }
        self.builtin_transformers
            .get(extension)
            .or_else(|| self.builtin_transformers.get(DEFAULT_KEY))
            .copied()
            .ok_or_else(|| InternalError::new("built-in default transformer missing").into())
    }

    /// Runs a transformer over raw content.
    pub(crate) fn transform<'a>(
        &self,
        id: TransformerId,
        extension: &str,
        text: &'a str,
    ) -> Result<Cow<'a, str>, JitError> {
        let entry = self.transformer_entry(id)?;
        entry
            .transformer
            .transform(text)
            .map_err(|source| JitError::Transformer {
                transformer: entry.name.clone(),
                extension: extension.to_string(),
                source,
            })
    }

    /// Adds the candidates of one trimmed line to `out`, consulting and
    /// filling the extractor's cache. Returns `true` on a cache hit.
    pub(crate) fn extract_line(
        &mut self,
        id: ExtractorId,
        extension: &str,
        line: &str,
        out: &mut impl Extend<String>,
    ) -> Result<bool, JitError> {
        let entry = self
            .extractors
            .get_mut(id.0 as usize)
            .ok_or_else(|| InternalError::new(format!("unknown extractor id {}", id.0)))?;
        if let Some(cached) = entry.cache.get(line) {
            out.extend(cached.iter().cloned());
            return Ok(true);
        }
        let mut candidates = entry
            .extractor
            .extract(line)
            .map_err(|source| JitError::Extractor {
                extractor: entry.name.clone(),
                extension: extension.to_string(),
                source,
            })?;
        candidates.retain(|c| c != crate::collect::NOISE);
        candidates.sort_unstable();
        candidates.dedup();
        out.extend(candidates.iter().cloned());
        entry.cache.insert(line.to_string(), candidates);
        Ok(false)
    }

    fn transformer_entry(&self, id: TransformerId) -> Result<&TransformerEntry, InternalError> {
        self.transformers
            .get(id.0 as usize)
            .ok_or_else(|| InternalError::new(format!("unknown transformer id {}", id.0)))
    }
}
