//! Error type for the `msc` CLI: wraps the assembler and VM error
//! types plus the handful of failures that belong to the CLI itself
//! (reading the source, finding `@main`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    ReadSource { path: String, #[source] source: std::io::Error },

    #[error("assembly failed: {0}")]
    Assembly(#[from] msc_asm::AsmError),

    #[error("{0}")]
    Vm(#[from] msc_vm::VmError),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
