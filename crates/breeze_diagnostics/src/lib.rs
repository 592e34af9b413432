//! Advisory diagnostics emitted while expanding stylesheets.
//!
//! This crate provides structured [`Diagnostic`] messages with a stable
//! [`DiagnosticCode`], the thread-safe [`DiagnosticSink`] that accumulates them
//! (honoring allow/deny policy), and a [`TerminalRenderer`] for human output.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode, ParseCodeError};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
