//! Error conditions raised by the collector itself (allocation exhaustion,
//! stale handle dereferences). Runtime-level errors such as "index out of
//! range" belong to higher crates; this is just the GC's own contract.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GcError {
    #[error("heap exhausted: {requested} bytes requested, {limit} byte limit in effect")]
    HeapExhausted { requested: usize, limit: usize },

    #[error("handle {index}#{generation} does not refer to a live object")]
    StaleHandle { index: u32, generation: u16 },

    #[error("scope stack underflow: gc_pop_scope called with no matching gc_push_scope")]
    ScopeUnderflow,
}

pub type GcResult<T> = Result<T, GcError>;
