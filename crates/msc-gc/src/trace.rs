//! The tracing contract every heap-allocated object must satisfy.
//!
//! The collector never needs to know what a `StringStorage`, `List`, or
//! `Map` actually is; it only needs each object to report the handles it
//! holds onto, the same way a bump-allocator GC separates "how to find
//! pointers inside an object" from "how to walk the heap".

use std::any::Any;

use crate::handle::Handle;

/// Implemented by every type the heap can own.
pub trait Trace: Any {
    /// Invoke `mark` once per child handle reachable from `self`.
    ///
    /// Leaf objects (interned/heap strings) have no children and may
    /// leave this empty; containers (lists, maps) call `mark` for every
    /// element or entry that is itself a heap handle.
    fn trace(&self, mark: &mut dyn FnMut(Handle));

    /// Approximate size in bytes, used for threshold accounting.
    fn byte_size(&self) -> usize;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
