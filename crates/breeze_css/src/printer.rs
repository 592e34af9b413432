//! Serializes trees and fragments back to CSS text.

use crate::node::{CssNode, NodeKind};
use crate::tree::{CssTree, NodeId};

const INDENT: &str = "  ";

/// Prints a whole tree. Top-level nodes are separated by a newline; the roots
/// of a document are printed one after another.
pub fn to_css(tree: &CssTree) -> String {
    let mut out = String::new();
    print_tree_node(tree, tree.root(), 0, &mut out);
    out
}

impl CssNode {
    /// Prints this fragment on its own.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        print_fragment(self, 0, &mut out);
        out
    }
}

fn print_tree_node(tree: &CssTree, id: NodeId, depth: usize, out: &mut String) {
    let (Ok(kind), Ok(children)) = (tree.kind(id), tree.children(id)) else {
        return;
    };
    match kind {
        NodeKind::Document | NodeKind::Root => {
            for &child in children {
                print_tree_node(tree, child, depth, out);
            }
        }
        _ => {
            open(kind, depth, out);
            if kind.is_container() {
                for &child in children {
                    print_tree_node(tree, child, depth + 1, out);
                }
                close(depth, out);
            }
        }
    }
}

fn print_fragment(node: &CssNode, depth: usize, out: &mut String) {
    match &node.kind {
        NodeKind::Document | NodeKind::Root => {
            for child in &node.children {
                print_fragment(child, depth, out);
            }
        }
        kind => {
            open(kind, depth, out);
            if kind.is_container() {
                for child in &node.children {
                    print_fragment(child, depth + 1, out);
                }
                close(depth, out);
            }
        }
    }
}

/// Writes a node's own text: the full line for leaves, the header for blocks.
fn open(kind: &NodeKind, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    match kind {
        NodeKind::AtRule {
            name,
            params,
            block,
        } => {
            let head = if params.is_empty() {
                format!("@{name}")
            } else {
                format!("@{name} {params}")
            };
            if *block {
                out.push_str(&format!("{pad}{head} {{\n"));
            } else {
                out.push_str(&format!("{pad}{head};\n"));
            }
        }
        NodeKind::Rule { selector } => out.push_str(&format!("{pad}{selector} {{\n")),
        NodeKind::Decl {
            prop,
            value,
            important,
        } => {
            let bang = if *important { " !important" } else { "" };
            out.push_str(&format!("{pad}{prop}: {value}{bang};\n"));
        }
        NodeKind::Comment { text } => out.push_str(&format!("{pad}/*{text}*/\n")),
        NodeKind::Document | NodeKind::Root => {}
    }
}

fn close(depth: usize, out: &mut String) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str("}\n");
}
