//! Core error types shared by assembler and diagnostic code.

use thiserror::Error;

/// Error type for index vector operations.
#[derive(Debug, Error)]
pub enum IndexVecError {
    /// Index out of bounds.
    #[error("index out of bounds: index {index}, length {length}")]
    OutOfBounds { index: usize, length: usize },
}

/// Error type for source map operations.
#[derive(Debug, Error)]
pub enum SourceMapError {
    /// File not found in the source map.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Invalid span range.
    #[error("invalid span: start {start} > end {end}")]
    InvalidSpan { start: usize, end: usize },

    /// Span out of bounds for file.
    #[error("span out of bounds: file has {file_len} bytes, span is {span_start}..{span_end}")]
    SpanOutOfBounds {
        file_len: usize,
        span_start: usize,
        span_end: usize,
    },
}

/// Umbrella error type returned by `msc-util` itself.
#[derive(Debug, Error)]
pub enum UtilError {
    #[error(transparent)]
    IndexVec(#[from] IndexVecError),

    #[error(transparent)]
    SourceMap(#[from] SourceMapError),
}

/// Result type alias used across `msc-util`.
pub type UtilResult<T> = std::result::Result<T, UtilError>;
