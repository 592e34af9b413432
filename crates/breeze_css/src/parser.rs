//! A small recursive-descent CSS parser.
//!
//! Recognizes comments, at-rules (with or without a block), style rules and
//! declarations, recording a [`SourceLocation`] for every node. Selector,
//! media-query and value syntax are kept as opaque trimmed text.

use crate::error::CssError;
use crate::node::{CssNode, NodeKind};
use crate::tree::{CssTree, NodeId};
use breeze_common::{InputId, Position, SourceLocation};

/// Parses one stylesheet into a tree with a [`NodeKind::Root`] top node.
pub fn parse(input: InputId, css: &str) -> Result<CssTree, CssError> {
    let mut tree = CssTree::new();
    let root = tree.root();
    let mut parser = Parser::new(input, css);
    parser.parse_items(&mut tree, root, None)?;
    tree.set_source(root, Some(parser.span(0, css.len())))?;
    Ok(tree)
}

/// Parses several stylesheets into one [`NodeKind::Document`] tree, one root
/// per input, in the given order.
pub fn parse_document(inputs: &[(InputId, &str)]) -> Result<CssTree, CssError> {
    let mut tree = CssTree::new_document();
    let doc = tree.root();
    for &(input, css) in inputs {
        let root = tree.append(doc, &CssNode::root())?;
        let mut parser = Parser::new(input, css);
        parser.parse_items(&mut tree, root, None)?;
        tree.set_source(root, Some(parser.span(0, css.len())))?;
    }
    Ok(tree)
}

/// What ended a statement prelude.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Semicolon,
    OpenBrace,
    CloseBrace,
    Eof,
}

struct Parser<'a> {
    input: InputId,
    src: &'a str,
    pos: usize,
    line_starts: Vec<usize>,
}

impl<'a> Parser<'a> {
    fn new(input: InputId, src: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            input,
            src,
            pos: 0,
            line_starts,
        }
    }

    /// Parses statements into `parent` until EOF or, inside a block, the
    /// matching `}`. `open` is the offset of the block's `{`, if any.
    fn parse_items(
        &mut self,
        tree: &mut CssTree,
        parent: NodeId,
        open: Option<usize>,
    ) -> Result<(), CssError> {
        loop {
            self.skip_whitespace();
            let Some(&byte) = self.src.as_bytes().get(self.pos) else {
                return match open {
                    Some(offset) => Err(self.error(offset, "unclosed block")),
                    None => Ok(()),
                };
            };
            match byte {
                b'}' => {
                    if open.is_none() {
                        return Err(self.error(self.pos, "unexpected '}'"));
                    }
                    self.pos += 1;
                    return Ok(());
                }
                b';' => self.pos += 1,
                b'/' if self.src[self.pos..].starts_with("/*") => self.parse_comment(tree, parent)?,
                b'@' => self.parse_at_rule(tree, parent)?,
                _ => self.parse_rule_or_decl(tree, parent)?,
            }
        }
    }

    fn parse_comment(&mut self, tree: &mut CssTree, parent: NodeId) -> Result<(), CssError> {
        let src = self.src;
        let start = self.pos;
        let body = start + 2;
        let end = src[body..]
            .find("*/")
            .map(|i| body + i)
            .ok_or_else(|| self.error(start, "unclosed comment"))?;
        self.pos = end + 2;
        let node = CssNode::comment(&src[body..end]).with_source(Some(self.span(start, self.pos)));
        tree.append(parent, &node)?;
        Ok(())
    }

    fn parse_at_rule(&mut self, tree: &mut CssTree, parent: NodeId) -> Result<(), CssError> {
        let src = self.src;
        let start = self.pos;
        let name_start = start + 1;
        let name_len = src[name_start..]
            .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(src.len() - name_start);
        if name_len == 0 {
            return Err(self.error(start, "expected at-rule name after '@'"));
        }
        let name = &src[name_start..name_start + name_len];
        let (end, terminator) = self.scan_prelude(name_start + name_len);
        let params = src[name_start + name_len..end].trim();

        match terminator {
            Terminator::OpenBrace => {
                let id = tree.append(parent, &CssNode::at_rule_block(name, params))?;
                self.pos = end + 1;
                self.parse_items(tree, id, Some(end))?;
                tree.set_source(id, Some(self.span(start, self.pos)))?;
            }
            Terminator::Semicolon | Terminator::CloseBrace | Terminator::Eof => {
                self.pos = if terminator == Terminator::Semicolon { end + 1 } else { end };
                let node = CssNode::at_rule(name, params).with_source(Some(self.span(start, self.pos)));
                tree.append(parent, &node)?;
            }
        }
        Ok(())
    }

    fn parse_rule_or_decl(&mut self, tree: &mut CssTree, parent: NodeId) -> Result<(), CssError> {
        let src = self.src;
        let start = self.pos;
        let (end, terminator) = self.scan_prelude(start);
        let text = src[start..end].trim();

        if terminator == Terminator::OpenBrace {
            let id = tree.append(parent, &CssNode::rule(text))?;
            self.pos = end + 1;
            self.parse_items(tree, id, Some(end))?;
            tree.set_source(id, Some(self.span(start, self.pos)))?;
            return Ok(());
        }

        let (prop, value) = text
            .split_once(':')
            .ok_or_else(|| self.error(start, "expected ':' in declaration"))?;
        let value = value.trim();
        let (value, important) = match value.len().checked_sub("!important".len()) {
            Some(cut) if value.is_char_boundary(cut) && value[cut..].eq_ignore_ascii_case("!important") => {
                (value[..cut].trim_end(), true)
            }
            _ => (value, false),
        };
        self.pos = if terminator == Terminator::Semicolon { end + 1 } else { end };
        let node = CssNode::new(NodeKind::Decl {
            prop: prop.trim().to_string(),
            value: value.to_string(),
            important,
        })
        .with_source(Some(self.span(start, self.pos)));
        tree.append(parent, &node)?;
        Ok(())
    }

    /// Finds the end of a statement prelude starting at `from`, skipping over
    /// strings, escapes and parenthesized groups.
    fn scan_prelude(&self, from: usize) -> (usize, Terminator) {
        let bytes = self.src.as_bytes();
        let mut quote: Option<u8> = None;
        let mut depth = 0usize;
        let mut i = from;
        while i < bytes.len() {
            let b = bytes[i];
            match (quote, b) {
                (_, b'\\') => i += 1,
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'(') => depth += 1,
                (None, b')') => depth = depth.saturating_sub(1),
                (None, b';') if depth == 0 => return (i, Terminator::Semicolon),
                (None, b'{') if depth == 0 => return (i, Terminator::OpenBrace),
                (None, b'}') if depth == 0 => return (i, Terminator::CloseBrace),
                _ => {}
            }
            i += 1;
        }
        (bytes.len(), Terminator::Eof)
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn position(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&s| s <= offset);
        let line_start = self.line_starts[line - 1];
        Position::new(line as u32, (offset - line_start + 1) as u32, offset as u32)
    }

    fn span(&self, start: usize, end: usize) -> SourceLocation {
        SourceLocation::new(self.input, self.position(start), self.position(end))
    }

    fn error(&self, offset: usize, message: &str) -> CssError {
        CssError::Parse {
            position: self.position(offset),
            message: message.to_string(),
        }
    }
}
