//! Just-in-time stylesheet expansion.
//!
//! A build pass scans changed template content for candidate class names,
//! asks a [`RuleGenerator`] for the matching rules, partitions every rule
//! generated so far into layer buckets, and splices those buckets into the
//! stylesheet at its `@tailwind` directives. All long-lived state (extraction
//! caches, the rule cache and the memoized stylesheet) lives in a
//! [`BuildContext`] that callers keep across passes.

#![warn(missing_docs)]

pub mod collect;
pub mod context;
pub mod error;
pub mod expand;
pub mod extract;
pub mod generator;
pub mod stylesheet;

pub use collect::{collect, collect_with_stats, CandidateSet, ChangedContent, CollectStats};
pub use context::{diagnostic_sink, BuildContext};
pub use error::{CollaboratorError, JitError};
pub use expand::{
    expand_tailwind_at_rules, ExpansionReport, InjectedCounts, DUPLICATE_DIRECTIVE, NO_INJECTION_ROOT,
    NO_UTILITIES_GENERATED,
};
pub use extract::{
    DefaultExtractor, ExtractionCache, Extractor, ExtractorId, ExtractorRegistry,
    Selection, SvelteTransformer, Transformer, TransformerId,
};
pub use generator::{GeneratedRule, LookupGenerator, RuleGenerator};
pub use stylesheet::{assemble, Bucket, RuleCache, Stylesheet};
