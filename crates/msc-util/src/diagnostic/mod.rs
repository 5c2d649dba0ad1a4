//! Diagnostic reporting for the assembler (§7: `AssemblyError` / `ResolveError`).
//!
//! ```
//! use msc_util::diagnostic::{DiagnosticBuilder, Span};
//!
//! let diag = DiagnosticBuilder::error("unknown opcode `FOO`")
//!     .span(Span::DUMMY)
//!     .help("see the opcode table in the VM docs")
//!     .build();
//! assert_eq!(diag.message, "unknown opcode `FOO`");
//! ```

mod builder;

pub use builder::DiagnosticBuilder;

use crate::Span;
use std::fmt;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
            Level::Help => write!(f, "help"),
        }
    }
}

/// A single diagnostic message with severity, location, and optional help.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)?;
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

/// Accumulates diagnostics across an assembly run; the CLI checks
/// `has_errors()` to decide its exit code (§6.3).
#[derive(Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
