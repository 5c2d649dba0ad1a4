use thiserror::Error;

/// Errors that halt `vm_exec` outright, as opposed to soft outcomes
/// (incompatible-type arithmetic, out-of-range list/map access) which
/// the bytecode observes as `null` and which never reach this type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VmError {
    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),

    #[error("LOADN: constant index {index} out of range (have {len})")]
    BadConstantIndex { index: u16, len: usize },

    #[error("CALLF to null function slot {0}")]
    CallToNullFunction(u8),

    #[error("call stack overflow (limit {0})")]
    CallStackOverflow(usize),

    #[error("hit cycle limit of {0}")]
    BudgetExhausted(u32),
}

pub type VmResult<T> = Result<T, VmError>;
