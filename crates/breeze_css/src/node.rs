//! Detached CSS nodes.

use breeze_common::SourceLocation;
use serde::{Deserialize, Serialize};

/// The kind of a CSS node together with its own (non-child) data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A container of several stylesheet roots (e.g. the `<style>` blocks of
    /// one component file).
    Document,
    /// A single stylesheet.
    Root,
    /// An at-rule such as `@tailwind base;` or `@media (...) { ... }`.
    AtRule {
        /// Name without the leading `@`.
        name: String,
        /// Everything between the name and the `;` or `{`, trimmed.
        params: String,
        /// Whether the at-rule has a `{ ... }` block (possibly empty).
        block: bool,
    },
    /// A style rule.
    Rule {
        /// The selector list, trimmed.
        selector: String,
    },
    /// A declaration.
    Decl {
        /// Property name.
        prop: String,
        /// Value without `!important`.
        value: String,
        /// Whether the declaration was marked `!important`.
        important: bool,
    },
    /// A comment, without the `/*` `*/` delimiters.
    Comment {
        /// Comment text.
        text: String,
    },
}

impl NodeKind {
    /// Returns `true` for kinds that may hold children.
    pub fn is_container(&self) -> bool {
        match self {
            NodeKind::Document | NodeKind::Root | NodeKind::Rule { .. } => true,
            NodeKind::AtRule { block, .. } => *block,
            NodeKind::Decl { .. } | NodeKind::Comment { .. } => false,
        }
    }

    /// Returns the at-rule name and params, if this is an at-rule.
    pub fn as_at_rule(&self) -> Option<(&str, &str)> {
        match self {
            NodeKind::AtRule { name, params, .. } => Some((name.as_str(), params.as_str())),
            _ => None,
        }
    }
}

/// An owned CSS subtree that is not attached to any [`CssTree`](crate::CssTree).
///
/// Rule generators return these and caches hold them. Inserting one into a
/// tree always copies it, so a cached node is never shared with the output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssNode {
    /// What this node is.
    pub kind: NodeKind,
    /// Child nodes in source order.
    pub children: Vec<CssNode>,
    /// Where the node came from, if it was parsed or copied from a source.
    pub source: Option<SourceLocation>,
}

impl CssNode {
    /// Creates a childless node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            source: None,
        }
    }

    /// Creates an empty stylesheet root.
    pub fn root() -> Self {
        Self::new(NodeKind::Root)
    }

    /// Creates a style rule with no declarations.
    pub fn rule(selector: impl Into<String>) -> Self {
        Self::new(NodeKind::Rule {
            selector: selector.into(),
        })
    }

    /// Creates a block-less at-rule such as `@tailwind utilities;`.
    pub fn at_rule(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self::new(NodeKind::AtRule {
            name: name.into(),
            params: params.into(),
            block: false,
        })
    }

    /// Creates an at-rule with an empty block, such as `@media print {}`.
    pub fn at_rule_block(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self::new(NodeKind::AtRule {
            name: name.into(),
            params: params.into(),
            block: true,
        })
    }

    /// Creates a declaration.
    pub fn decl(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(NodeKind::Decl {
            prop: prop.into(),
            value: value.into(),
            important: false,
        })
    }

    /// Creates a comment.
    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Comment { text: text.into() })
    }

    /// Appends a child, turning a block-less at-rule into a block at-rule.
    pub fn with_child(mut self, child: CssNode) -> Self {
        if let NodeKind::AtRule { block, .. } = &mut self.kind {
            *block = true;
        }
        self.children.push(child);
        self
    }

    /// Appends a declaration child.
    pub fn with_decl(self, prop: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_child(CssNode::decl(prop, value))
    }

    /// Sets the source location of this node only.
    pub fn with_source(mut self, source: Option<SourceLocation>) -> Self {
        self.source = source;
        self
    }

    /// Counts this node and all of its descendants.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(CssNode::subtree_len).sum::<usize>()
    }
}
