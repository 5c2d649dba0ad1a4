//! Registry of source files, for turning a [`Span`] into `file:line` text.

use std::sync::Arc;

use super::{FileId, Span};
use crate::error::SourceMapError;

/// A single registered source file.
#[derive(Clone)]
pub struct SourceFile {
    id: FileId,
    name: String,
    content: Arc<str>,
}

impl SourceFile {
    pub fn new(id: FileId, name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the 1-based `line`'s text, without the trailing newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        self.content.lines().nth(line.saturating_sub(1) as usize)
    }
}

/// Owns every source file registered during a run, for diagnostic printing.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Register a new file, returning its [`FileId`].
    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<Arc<str>>) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(SourceFile::new(id, name, content));
        id
    }

    pub fn file(&self, id: FileId) -> Result<&SourceFile, SourceMapError> {
        self.files
            .get(id.index())
            .ok_or_else(|| SourceMapError::FileNotFound(format!("file id {}", id.index())))
    }

    /// Render `file:line` the way the CLI prints assembler diagnostics.
    pub fn describe(&self, span: Span) -> String {
        match self.file(span.file) {
            Ok(file) => format!("{}:{}", file.name(), span.line),
            Err(_) => format!("<unknown>:{}", span.line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_formats_file_and_line() {
        let mut map = SourceMap::new();
        let id = map.add_file("main.msvm", "MOVE r0, r1\nRETURN\n");
        let span = Span::line(id, 2);
        assert_eq!(map.describe(span), "main.msvm:2");
    }

    #[test]
    fn line_text_is_one_based() {
        let mut map = SourceMap::new();
        let id = map.add_file("f.msvm", "first\nsecond\n");
        let file = map.file(id).unwrap();
        assert_eq!(file.line_text(1), Some("first"));
        assert_eq!(file.line_text(2), Some("second"));
    }
}
