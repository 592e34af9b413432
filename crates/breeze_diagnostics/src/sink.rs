//! Thread-safe diagnostic accumulator with allow/deny policy.

use crate::code::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A thread-safe accumulator for diagnostics emitted during build passes.
///
/// Codes in the allow set are dropped on emission; codes in the deny set are
/// promoted to [`Severity::Error`]. Neither changes the control flow of the
/// pass that emitted them.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
    allowed: HashSet<DiagnosticCode>,
    denied: HashSet<DiagnosticCode>,
}

impl DiagnosticSink {
    /// Creates a new empty sink that records every diagnostic.
    pub fn new() -> Self {
        Self::with_policy(Vec::new(), Vec::new())
    }

    /// Creates a sink that suppresses `allow` codes and promotes `deny` codes.
    pub fn with_policy(
        allow: impl IntoIterator<Item = DiagnosticCode>,
        deny: impl IntoIterator<Item = DiagnosticCode>,
    ) -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
            allowed: allow.into_iter().collect(),
            denied: deny.into_iter().collect(),
        }
    }

    /// Emits a diagnostic into the sink.
    ///
    /// Returns `false` if the code is allowed and the diagnostic was dropped.
    pub fn emit(&self, mut diag: Diagnostic) -> bool {
        if self.allowed.contains(&diag.code) {
            return false;
        }
        if self.denied.contains(&diag.code) {
            diag.severity = Severity::Error;
        }
        if diag.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        let mut diagnostics = self.diagnostics.lock().unwrap_or_else(|e| e.into_inner());
        diagnostics.push(diag);
        true
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Returns how many recorded diagnostics carry `code`.
    pub fn count(&self, code: DiagnosticCode) -> usize {
        let diagnostics = self.diagnostics.lock().unwrap_or_else(|e| e.into_inner());
        diagnostics.iter().filter(|d| d.code == code).count()
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *diagnostics)
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let diagnostics = self.diagnostics.lock().unwrap_or_else(|e| e.into_inner());
        diagnostics.clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
