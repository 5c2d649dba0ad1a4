//! msc-util - shared infrastructure for the MiniScript runtime crates.
//!
//! This crate carries the utilities that every other crate in the workspace
//! needs but that belong to none of them specifically: typed indices
//! ([`IndexVec`]), source locations and diagnostics for the assembler
//! front end, and the common error-result plumbing.
//!
//! None of this module implements VM, GC, or value semantics; see
//! `msc-value`, `msc-gc`, and `msc-vm` for those.

pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;

pub use error::{UtilError, UtilResult};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, Span};

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
