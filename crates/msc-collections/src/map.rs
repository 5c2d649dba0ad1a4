//! `Map`: an open-addressed hash table from [`Value`] to [`Value`].
//!
//! Linear probing with a 0.75 load-factor resize threshold, matching
//! the design this is grounded on bit for bit; removal differs in one
//! respect. The source deletes in place and then walks forward
//! re-inserting every entry in the probe chain after the hole, which
//! is necessary there because probing stops at the first unoccupied
//! slot. The same correctness requirement holds here, so `remove`
//! takes the same re-insert-chain approach rather than a tombstone.

use std::any::Any;

use msc_gc::{Handle, Trace};
use msc_value::{value_equal, value_hash, HeapView, Value};

const DEFAULT_CAPACITY: usize = 8;
const LOAD_FACTOR_THRESHOLD: f64 = 0.75;

#[derive(Clone, Copy)]
struct Slot {
    key: Value,
    value: Value,
    hash: u32,
    occupied: bool,
}

impl Slot {
    fn empty() -> Self {
        Self {
            key: Value::make_null(),
            value: Value::make_null(),
            hash: 0,
            occupied: false,
        }
    }
}

pub struct Map {
    entries: Vec<Slot>,
    count: usize,
}

impl Default for Map {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: vec![Slot::empty(); capacity],
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn find_slot(&self, key: Value, hash: u32, heap: &dyn HeapView) -> Option<usize> {
        let capacity = self.entries.len();
        if capacity == 0 {
            return None;
        }
        let start = (hash as usize) % capacity;
        let mut index = start;
        loop {
            let slot = &self.entries[index];
            if !slot.occupied {
                return Some(index);
            }
            if slot.hash == hash && value_equal(slot.key, key, heap) {
                return Some(index);
            }
            index = (index + 1) % capacity;
            if index == start {
                return None;
            }
        }
    }

    pub fn get(&self, key: Value, heap: &dyn HeapView) -> Option<Value> {
        let hash = value_hash(key, heap);
        let index = self.find_slot(key, hash, heap)?;
        let slot = &self.entries[index];
        slot.occupied.then_some(slot.value)
    }

    pub fn has_key(&self, key: Value, heap: &dyn HeapView) -> bool {
        let hash = value_hash(key, heap);
        self.find_slot(key, hash, heap)
            .map(|i| self.entries[i].occupied)
            .unwrap_or(false)
    }

    fn needs_expansion(&self) -> bool {
        self.count as f64 / self.entries.len() as f64 > LOAD_FACTOR_THRESHOLD
    }

    fn expand(&mut self, heap: &dyn HeapView) {
        let old = std::mem::replace(&mut self.entries, vec![Slot::empty(); self.entries.len() * 2]);
        self.count = 0;
        for slot in old.into_iter().filter(|s| s.occupied) {
            self.insert_known_new(slot.key, slot.value, slot.hash, heap);
        }
    }

    fn insert_known_new(&mut self, key: Value, value: Value, hash: u32, heap: &dyn HeapView) {
        let index = self.find_slot(key, hash, heap).expect("table has an empty slot after expansion");
        self.entries[index] = Slot {
            key,
            value,
            hash,
            occupied: true,
        };
        self.count += 1;
    }

    pub fn set(&mut self, key: Value, value: Value, heap: &dyn HeapView) {
        if self.needs_expansion() {
            self.expand(heap);
        }
        let hash = value_hash(key, heap);
        let index = self
            .find_slot(key, hash, heap)
            .expect("table has an empty slot after expansion check");
        let slot = &mut self.entries[index];
        if !slot.occupied {
            self.count += 1;
        }
        *slot = Slot {
            key,
            value,
            hash,
            occupied: true,
        };
    }

    /// Removes `key`, then re-inserts every entry in its probe chain so
    /// later lookups that were displaced past the removed slot are
    /// still found.
    pub fn remove(&mut self, key: Value, heap: &dyn HeapView) -> bool {
        let hash = value_hash(key, heap);
        let Some(index) = self.find_slot(key, hash, heap) else {
            return false;
        };
        if !self.entries[index].occupied {
            return false;
        }
        self.entries[index] = Slot::empty();
        self.count -= 1;

        let capacity = self.entries.len();
        let mut probe = (index + 1) % capacity;
        while probe != index && self.entries[probe].occupied {
            let displaced = self.entries[probe];
            self.entries[probe] = Slot::empty();
            self.count -= 1;
            self.insert_known_new(displaced.key, displaced.value, displaced.hash, heap);
            probe = (probe + 1) % capacity;
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|s| *s = Slot::empty());
        self.count = 0;
    }

    pub fn copy(&self) -> Map {
        Map {
            entries: self.entries.clone(),
            count: self.count,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Value, Value)> + '_ {
        self.entries.iter().filter(|s| s.occupied).map(|s| (s.key, s.value))
    }

    /// The occupied key/value pair at raw probe slot `index`, or `None`
    /// if that slot is empty or out of range. Lets a `HeapView`
    /// implementation walk `0..capacity()` without exposing the probe
    /// table's layout.
    pub fn entry_at(&self, index: usize) -> Option<(Value, Value)> {
        let slot = self.entries.get(index)?;
        slot.occupied.then_some((slot.key, slot.value))
    }
}

impl Trace for Map {
    fn trace(&self, mark: &mut dyn FnMut(Handle)) {
        for slot in self.entries.iter().filter(|s| s.occupied) {
            for v in [slot.key, slot.value] {
                if let Some(h) = v.as_heap_string_handle() {
                    mark(h);
                } else if let Some(h) = v.as_list_handle() {
                    mark(h);
                } else if let Some(h) = v.as_map_handle() {
                    mark(h);
                }
            }
        }
    }

    fn byte_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.entries.len() * std::mem::size_of::<Slot>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msc_value::Value as V;

    struct NoHeap;
    impl HeapView for NoHeap {
        fn string_bytes(&self, _: Handle) -> &[u8] {
            &[]
        }
        fn string_hash(&self, _: Handle) -> u32 {
            0
        }
        fn list_len(&self, _: Handle) -> usize {
            0
        }
        fn list_get(&self, _: Handle, _: usize) -> V {
            V::make_null()
        }
        fn map_capacity(&self, _: Handle) -> usize {
            0
        }
        fn map_entry(&self, _: Handle, _: usize) -> Option<(V, V)> {
            None
        }
        fn alloc_string(&mut self, _: &[u8]) -> V {
            panic!("not needed for int-key map tests")
        }
    }

    #[test]
    fn set_then_get_roundtrips() {
        let heap = NoHeap;
        let mut m = Map::new();
        m.set(V::make_int(1), V::make_int(100), &heap);
        assert_eq!(m.get(V::make_int(1), &heap).unwrap().as_int(), 100);
        assert!(m.get(V::make_int(2), &heap).is_none());
    }

    #[test]
    fn set_on_existing_key_overwrites_without_growing_count() {
        let heap = NoHeap;
        let mut m = Map::new();
        m.set(V::make_int(1), V::make_int(1), &heap);
        m.set(V::make_int(1), V::make_int(2), &heap);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(V::make_int(1), &heap).unwrap().as_int(), 2);
    }

    #[test]
    fn expansion_preserves_all_entries() {
        let heap = NoHeap;
        let mut m = Map::with_capacity(4);
        for i in 0..20 {
            m.set(V::make_int(i), V::make_int(i * 10), &heap);
        }
        assert_eq!(m.len(), 20);
        for i in 0..20 {
            assert_eq!(m.get(V::make_int(i), &heap).unwrap().as_int(), i * 10);
        }
    }

    #[test]
    fn remove_then_lookup_past_the_hole_still_finds_displaced_entries() {
        let heap = NoHeap;
        let mut m = Map::with_capacity(4);
        for i in 0..4 {
            m.set(V::make_int(i), V::make_int(i), &heap);
        }
        assert!(m.remove(V::make_int(0), &heap));
        assert!(!m.has_key(V::make_int(0), &heap));
        for i in 1..4 {
            assert!(m.has_key(V::make_int(i), &heap));
        }
    }

    #[test]
    fn clear_empties_the_map() {
        let heap = NoHeap;
        let mut m = Map::new();
        m.set(V::make_int(1), V::make_int(1), &heap);
        m.clear();
        assert_eq!(m.len(), 0);
        assert!(!m.has_key(V::make_int(1), &heap));
    }
}
