//! The mark-and-sweep collector: threshold policy, mark phase, sweep
//! phase, and the enable/disable gate used around sections of host code
//! that cannot tolerate a collection (e.g. while rehashing a map).

use tracing::{debug, trace};

use crate::config::GcConfig;
use crate::error::GcResult;
use crate::handle::Handle;
use crate::heap::Heap;
use crate::roots::RootSet;
use crate::trace::Trace;

pub struct GarbageCollector {
    heap: Heap,
    roots: RootSet,
    config: GcConfig,
    threshold: usize,
    disable_count: u32,
    collections: u64,
}

impl GarbageCollector {
    pub fn new(config: GcConfig) -> Self {
        let threshold = config.initial_threshold;
        Self {
            heap: Heap::new(),
            roots: RootSet::new(),
            config,
            threshold,
            disable_count: 0,
            collections: 0,
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn bytes_allocated(&self) -> usize {
        self.heap.bytes_allocated()
    }

    pub fn collections(&self) -> u64 {
        self.collections
    }

    pub fn is_enabled(&self) -> bool {
        self.disable_count == 0
    }

    pub fn disable(&mut self) {
        self.disable_count += 1;
    }

    pub fn enable(&mut self) {
        self.disable_count = self.disable_count.saturating_sub(1);
    }

    pub fn protect(&mut self, handle: Handle) {
        self.roots.protect(handle);
    }

    pub fn unprotect(&mut self) -> Option<Handle> {
        self.roots.unprotect()
    }

    pub fn push_scope(&mut self) {
        self.roots.push_scope();
    }

    pub fn pop_scope(&mut self) -> GcResult<()> {
        self.roots.pop_scope()
    }

    /// Allocates `object`, triggering a collection first if the heap is
    /// over threshold and collection is currently enabled. Extra roots
    /// the caller wants protected across that collection (e.g. operands
    /// not yet reachable from any register) are passed via `extra_roots`.
    pub fn allocate(&mut self, object: Box<dyn Trace>, extra_roots: &[Handle]) -> Handle {
        if self.is_enabled() && self.heap.bytes_allocated() >= self.threshold {
            self.collect(extra_roots);
        }
        self.heap.allocate(object)
    }

    /// Runs a full mark-and-sweep collection regardless of threshold.
    /// `extra_roots` lets a caller protect handles that are not yet on
    /// the shadow stack (e.g. a freshly popped VM register value).
    pub fn collect(&mut self, extra_roots: &[Handle]) -> usize {
        let mut worklist: Vec<Handle> = self.roots.iter().chain(extra_roots.iter().copied()).collect();
        while let Some(handle) = worklist.pop() {
            if self.heap.mark(handle) {
                worklist.extend(self.heap.children_of(handle));
            }
        }
        let collected = self.heap.sweep();
        self.collections += 1;
        self.threshold = self
            .config
            .initial_threshold
            .max(self.heap.bytes_allocated() * self.config.growth_factor);
        if self.config.verbose {
            debug!(
                collected,
                bytes_allocated = self.heap.bytes_allocated(),
                next_threshold = self.threshold,
                "gc collection complete"
            );
        } else {
            trace!(collected, "gc collection complete");
        }
        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::RefCell;

    struct Cons {
        child: RefCell<Option<Handle>>,
    }
    impl Trace for Cons {
        fn trace(&self, mark: &mut dyn FnMut(Handle)) {
            if let Some(h) = *self.child.borrow() {
                mark(h);
            }
        }
        fn byte_size(&self) -> usize {
            16
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn protected_value_survives_collection() {
        let mut gc = GarbageCollector::new(GcConfig {
            initial_threshold: 1,
            ..GcConfig::default()
        });
        let h = gc.allocate(
            Box::new(Cons {
                child: RefCell::new(None),
            }),
            &[],
        );
        gc.protect(h);
        gc.collect(&[]);
        assert!(gc.heap().get(h).is_some());
    }

    #[test]
    fn unreachable_value_is_collected() {
        let mut gc = GarbageCollector::new(GcConfig::default());
        let _h = gc.allocate(
            Box::new(Cons {
                child: RefCell::new(None),
            }),
            &[],
        );
        gc.collect(&[]);
        assert_eq!(gc.bytes_allocated(), 0);
    }

    #[test]
    fn cyclic_reference_does_not_hang_mark_phase() {
        let mut gc = GarbageCollector::new(GcConfig::default());
        let a = gc.allocate(
            Box::new(Cons {
                child: RefCell::new(None),
            }),
            &[],
        );
        let b = gc.allocate(
            Box::new(Cons {
                child: RefCell::new(Some(a)),
            }),
            &[],
        );
        if let Some(obj) = gc.heap_mut().get_mut(a) {
            if let Some(cons) = obj.as_any_mut().downcast_mut::<Cons>() {
                *cons.child.borrow_mut() = Some(b);
            }
        }
        gc.protect(a);
        gc.collect(&[]);
        assert!(gc.heap().get(a).is_some());
        assert!(gc.heap().get(b).is_some());
    }

    #[test]
    fn scope_pop_releases_roots_and_next_collect_frees_them() {
        let mut gc = GarbageCollector::new(GcConfig::default());
        gc.push_scope();
        let h = gc.allocate(
            Box::new(Cons {
                child: RefCell::new(None),
            }),
            &[],
        );
        gc.protect(h);
        gc.pop_scope().unwrap();
        gc.collect(&[]);
        assert_eq!(gc.bytes_allocated(), 0);
    }
}
