//! `Runtime`: the `Value`-agnostic GC, the string pool, and the
//! function table bundled behind one handle, so code that might
//! intern or allocate takes a `&mut Runtime` explicitly rather than
//! reaching into process-global state.

use std::rc::Rc;

use msc_collections::{List, Map};
use msc_gc::{GarbageCollector, GcConfig, Handle};
use msc_strings::{StringPool, StringStorage};
use msc_value::{HeapView, Value};

use crate::proto::Proto;

const MAX_FUNCS: usize = 256;

pub struct Runtime {
    pub gc: GarbageCollector,
    pub pool: StringPool,
    funcs: Vec<Option<Rc<Proto>>>,
    /// Registers of every active VM frame, refreshed by the executor
    /// before any instruction that might allocate. Playing the role of
    /// the frame-wide GC root convention without the executor having
    /// to reach into GC internals directly.
    frame_roots: Vec<Handle>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(GcConfig::default())
    }
}

impl Runtime {
    pub fn new(config: GcConfig) -> Self {
        Self {
            gc: GarbageCollector::new(config),
            pool: StringPool::new(),
            funcs: (0..MAX_FUNCS).map(|_| None).collect(),
            frame_roots: Vec::new(),
        }
    }

    pub fn install(&mut self, index: u8, proto: Proto) {
        self.funcs[index as usize] = Some(Rc::new(proto));
    }

    pub fn function(&self, index: u8) -> Option<Rc<Proto>> {
        self.funcs[index as usize].clone()
    }

    pub fn set_frame_roots(&mut self, roots: Vec<Handle>) {
        self.frame_roots = roots;
    }

    pub fn make_list(&mut self, list: List) -> Value {
        let handle = self.gc.allocate(Box::new(list), &self.frame_roots.clone());
        Value::make_list(handle)
    }

    pub fn make_map(&mut self, map: Map) -> Value {
        let handle = self.gc.allocate(Box::new(map), &self.frame_roots.clone());
        Value::make_map(handle)
    }

    fn string_storage(&self, handle: Handle) -> &StringStorage {
        self.gc
            .heap()
            .get(handle)
            .and_then(|t| t.as_any().downcast_ref::<StringStorage>())
            .expect("Value carried a heap-string handle that does not resolve to a StringStorage")
    }

    fn list_storage(&self, handle: Handle) -> &List {
        self.gc
            .heap()
            .get(handle)
            .and_then(|t| t.as_any().downcast_ref::<List>())
            .expect("Value carried a list handle that does not resolve to a List")
    }

    fn map_storage(&self, handle: Handle) -> &Map {
        self.gc
            .heap()
            .get(handle)
            .and_then(|t| t.as_any().downcast_ref::<Map>())
            .expect("Value carried a map handle that does not resolve to a Map")
    }

    pub fn list_mut(&mut self, handle: Handle) -> Option<&mut List> {
        self.gc.heap_mut().get_mut(handle)?.as_any_mut().downcast_mut::<List>()
    }

    pub fn map_mut(&mut self, handle: Handle) -> Option<&mut Map> {
        self.gc.heap_mut().get_mut(handle)?.as_any_mut().downcast_mut::<Map>()
    }
}

impl HeapView for Runtime {
    fn string_bytes(&self, handle: Handle) -> &[u8] {
        self.string_storage(handle).bytes()
    }

    fn string_hash(&self, handle: Handle) -> u32 {
        self.string_storage(handle).hash()
    }

    fn list_len(&self, handle: Handle) -> usize {
        self.list_storage(handle).len()
    }

    fn list_get(&self, handle: Handle, index: usize) -> Value {
        self.list_storage(handle).get(index as i64).unwrap_or_else(Value::make_null)
    }

    fn map_capacity(&self, handle: Handle) -> usize {
        self.map_storage(handle).capacity()
    }

    fn map_entry(&self, handle: Handle, slot: usize) -> Option<(Value, Value)> {
        self.map_storage(handle).entry_at(slot)
    }

    fn alloc_string(&mut self, bytes: &[u8]) -> Value {
        if let Some(v) = Value::make_tiny_string(bytes) {
            return v;
        }
        let handle = self.gc.allocate(Box::new(StringStorage::new(bytes)), &self.frame_roots.clone());
        Value::make_heap_string(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msc_value::{to_string, value_equal};

    #[test]
    fn alloc_string_prefers_tiny_representation() {
        let mut rt = Runtime::default();
        let v = rt.alloc_string(b"hi");
        assert!(v.is_tiny_string());
        let v2 = rt.alloc_string(b"hello world");
        assert!(v2.is_heap_string());
        assert_eq!(to_string(v2, &rt), "hello world");
    }

    #[test]
    fn list_round_trips_through_the_heap() {
        let mut rt = Runtime::default();
        let mut list = List::new();
        list.push(Value::make_int(1));
        list.push(Value::make_int(2));
        let v = rt.make_list(list);
        let handle = v.as_list_handle().unwrap();
        assert_eq!(rt.list_len(handle), 2);
        assert!(value_equal(rt.list_get(handle, 0), Value::make_int(1), &rt));
    }
}
