//! Fluent builder for [`Diagnostic`](super::Diagnostic) construction.

use super::{Diagnostic, Level};
use crate::Span;

/// Builds a [`Diagnostic`] one field at a time.
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
    help: Option<String>,
}

impl DiagnosticBuilder {
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: Span::DUMMY,
            help: None,
        }
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic {
            level: self.level,
            message: self.message,
            span: self.span,
            help: self.help,
        }
    }
}
