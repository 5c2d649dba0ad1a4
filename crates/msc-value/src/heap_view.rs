//! The capability a [`Value`](crate::Value) operation needs in order to
//! look at or allocate heap-resident data, without `msc-value` itself
//! depending on the string/list/map crates that would create a cycle.
//!
//! Per the design note that callers should receive a `Runtime` handle
//! explicitly rather than reaching into global state, every operation
//! that touches heap strings, lists, or maps takes `&dyn HeapView` (or
//! `&mut dyn HeapView` when it may allocate) instead of assuming a
//! singleton. `msc-vm::Runtime` is the concrete implementation used at
//! the top of the stack.

use msc_gc::Handle;

use crate::Value;

pub trait HeapView {
    fn string_bytes(&self, handle: Handle) -> &[u8];

    /// Cached FNV-1a hash of the string, computed and cached on first
    /// use; zero is never a valid cached hash (see `value_hash`).
    fn string_hash(&self, handle: Handle) -> u32;

    fn list_len(&self, handle: Handle) -> usize;

    fn list_get(&self, handle: Handle, index: usize) -> Value;

    fn map_capacity(&self, handle: Handle) -> usize;

    /// `Some((key, value))` if probe slot `slot` is occupied, else
    /// `None`. Iterating `0..map_capacity(handle)` visits every entry.
    fn map_entry(&self, handle: Handle, slot: usize) -> Option<(Value, Value)>;

    /// Allocates a new heap (or tiny, if short enough) string holding
    /// `bytes` and returns a [`Value`] for it.
    fn alloc_string(&mut self, bytes: &[u8]) -> Value;
}
