//! A small CSS node tree with the editing primitives used by the JIT expander.
//!
//! [`CssNode`] is a detached, owned subtree (what rule generators produce and
//! caches store). [`CssTree`] is an arena-backed stylesheet that supports
//! walking at-rules, inserting copies before a node, appending, and removal.
//! A [`Document`](NodeKind::Document) tree holds several roots, one per
//! embedded stylesheet.
//!
//! The parser and printer cover at-rules, style rules, declarations and
//! comments. They are not a complete CSS grammar.

#![warn(missing_docs)]

pub mod error;
pub mod node;
pub mod parser;
pub mod printer;
pub mod tree;

pub use error::CssError;
pub use node::{CssNode, NodeKind};
pub use parser::{parse, parse_document};
pub use printer::to_css;
pub use tree::{CssTree, NodeId};
