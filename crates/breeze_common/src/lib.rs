//! Shared foundational types used across the Breeze CSS toolchain.
//!
//! This crate provides rule sort keys and the layer bit layout they encode,
//! source locations for stylesheet inputs, and common result types.

#![warn(missing_docs)]

pub mod layer;
pub mod result;
pub mod sort_key;
pub mod source;

pub use layer::{Layer, LayerOrder, LayerOrderError};
pub use result::{BreezeResult, InternalError};
pub use sort_key::SortKey;
pub use source::{InputId, Position, SourceInputs, SourceLocation};
