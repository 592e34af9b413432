//! Stable diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Problems with scanned template content, prefixed with `C`.
    Content,
    /// Problems placing generated CSS in the stylesheet, prefixed with `L`.
    Layout,
    /// Problems with `@tailwind` / `@layer` directive usage, prefixed with `D`.
    Directive,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Content => 'C',
            Category::Layout => 'L',
            Category::Directive => 'D',
        }
    }

    fn from_prefix(c: char) -> Option<Self> {
        match c {
            'C' => Some(Category::Content),
            'L' => Some(Category::Layout),
            'D' => Some(Category::Directive),
            _ => None,
        }
    }
}

/// A stable diagnostic code combining a category prefix and a number.
///
/// Displayed as the prefix followed by a zero-padded 3-digit number, e.g.
/// `C001`. Callers deduplicate and suppress diagnostics by code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

/// Error returned when a string is not a valid diagnostic code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCodeError {
    /// The input that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid diagnostic code: '{}'", self.input)
    }
}

impl std::error::Error for ParseCodeError {}

impl FromStr for DiagnosticCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCodeError {
            input: s.to_string(),
        };
        let mut chars = s.chars();
        let category = chars.next().and_then(Category::from_prefix).ok_or_else(err)?;
        let digits = chars.as_str();
        if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let number = digits.parse().map_err(|_| err())?;
        Ok(DiagnosticCode::new(category, number))
    }
}
