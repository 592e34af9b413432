//! Diagnostic severity levels ordered from least to most severe.

use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic message.
///
/// Ordered from least severe (`Note`) to most severe (`Error`). None of the
/// levels stop a build pass; an `Error` only means the caller asked for the
/// code to be denied.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Additional context, not a problem on its own.
    Note,
    /// Likely misconfiguration that the build worked around.
    Warning,
    /// A warning promoted by a `deny` entry.
    Error,
}

impl Severity {
    /// Returns `true` if this severity is [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// Returns the label styled for a color terminal.
    pub fn colored(self) -> String {
        let label = self.to_string();
        match self {
            Severity::Note => label.cyan().to_string(),
            Severity::Warning => label.yellow().to_string(),
            Severity::Error => label.red().bold().to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}
