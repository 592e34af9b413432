//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use breeze_common::SourceInputs;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, inputs: &SourceInputs) -> String;
}

/// Renders diagnostics in a compact rustc-like format.
///
/// ```text
/// warning[C001]: no utility classes were detected in your source files
///   --> app.css:3:1
///    = note: ...
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, inputs: &SourceInputs) -> String {
        let severity = if self.color {
            diag.severity.colored()
        } else {
            diag.severity.to_string()
        };
        let mut out = format!("{severity}[{}]: {}\n", diag.code, diag.message);

        if let Some(loc) = &diag.location {
            out.push_str(&format!("  --> {}\n", inputs.display(loc)));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}
