use thiserror::Error;

/// Errors produced while turning assembly text into function prototypes.
/// Every variant carries the 1-based source line so a host can report
/// `file:line: message` without the assembler needing to know about files.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AsmError {
    #[error("{line}: instruction outside of a function: {text}")]
    NoCurrentFunction { line: usize, text: String },

    #[error("{line}: duplicate function @{name}")]
    DuplicateFunction { line: usize, name: String },

    #[error("{line}: invalid instruction: {text}")]
    InvalidInstruction { line: usize, text: String },

    #[error("{line}: expected a register (r0..r255), found `{token}`")]
    InvalidRegister { line: usize, token: String },

    #[error("{line}: expected an integer, found `{token}`")]
    InvalidImmediate { line: usize, token: String },

    #[error("{line}: expected a constant (int, double, string, or null), found `{token}`")]
    InvalidConstant { line: usize, token: String },

    #[error("{line}: value out of range for a {bits}-bit field: {token}")]
    ImmediateOutOfRange { line: usize, token: String, bits: &'static str },

    #[error("{line}: unterminated string literal: {text}")]
    UnterminatedString { line: usize, text: String },

    #[error("too many constants in function @{name} (max 65536)")]
    TooManyConstants { name: String },

    #[error("undefined label `{label}` in function @{function}")]
    UndefinedLabel { function: String, label: String },

    #[error("branch offset to label `{label}` in function @{function} overflows its {bits}-bit field")]
    OffsetOverflow {
        function: String,
        label: String,
        bits: &'static str,
    },

    #[error("no @main function defined")]
    NoMainFunction,
}

pub type AsmResult<T> = Result<T, AsmError>;
