//! Source locations for stylesheet inputs.
//!
//! Generated nodes copy the location of the directive they replace so that
//! source maps keep pointing at the author's `@tailwind` line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a stylesheet input registered in [`SourceInputs`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct InputId(u32);

impl InputId {
    /// Creates an `InputId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A 1-based line/column position with its byte offset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// 0-based byte offset into the input.
    pub offset: u32,
}

impl Position {
    /// Creates a position.
    pub fn new(line: u32, column: u32, offset: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// The source range a CSS node was parsed from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SourceLocation {
    /// The input the node came from.
    pub input: InputId,
    /// Start of the node (inclusive).
    pub start: Position,
    /// End of the node (exclusive).
    pub end: Position,
}

impl SourceLocation {
    /// Creates a source location.
    pub fn new(input: InputId, start: Position, end: Position) -> Self {
        Self { input, start, end }
    }
}

/// Names of the stylesheet inputs seen by a build, indexed by [`InputId`].
#[derive(Debug, Default, Clone)]
pub struct SourceInputs {
    names: Vec<String>,
}

impl SourceInputs {
    /// Creates an empty input table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an input name and returns its id.
    pub fn add(&mut self, name: impl Into<String>) -> InputId {
        let id = InputId(self.names.len() as u32);
        self.names.push(name.into());
        id
    }

    /// Returns the name of an input, if it was registered here.
    pub fn name(&self, id: InputId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// Formats a location as `name:line:column`.
    pub fn display(&self, loc: &SourceLocation) -> String {
        let name = self.name(loc.input).unwrap_or("<unknown>");
        format!("{name}:{}", loc.start)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
