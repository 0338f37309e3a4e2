//! Open-addressing map from [`Handle`] to resource records.
//!
//! Every resource registry in the state store (textures, buffers, programs, vertex arrays, ...)
//! is one of these. Keys and values live in parallel arrays sized to a power of two; collisions
//! are resolved with linear probing and removal uses back-shift deletion, so there are no
//! tombstones and lookups never degrade after churn.

use std::fmt;

use crate::handle::Handle;

const MIN_SLOTS: usize = 16;

/// Smallest power-of-two slot count that keeps `entries` under a 3/4 load factor.
fn slots_for(entries: usize) -> usize {
    let wanted = entries.saturating_mul(4) / 3 + 1;
    wanted.next_power_of_two().max(MIN_SLOTS)
}

/// splitmix64 finalizer. Handles are sequential, so the low bits alone cluster badly.
fn mix(key: u64) -> u64 {
    let mut z = key;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

pub struct HandleTable<V> {
    keys: Box<[u64]>,
    values: Box<[Option<V>]>,
    len: usize,
}

impl<V> HandleTable<V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let slots = slots_for(capacity);
        Self {
            keys: vec![0u64; slots].into_boxed_slice(),
            values: (0..slots).map(|_| None).collect(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots currently allocated. Only ever grows.
    pub fn slot_count(&self) -> usize {
        self.keys.len()
    }

    fn mask(&self) -> usize {
        self.keys.len() - 1
    }

    fn home(&self, key: u64) -> usize {
        (mix(key) as usize) & self.mask()
    }

    fn find(&self, key: u64) -> Option<usize> {
        if key == 0 {
            return None;
        }
        let mask = self.mask();
        let mut idx = self.home(key);
        loop {
            match self.keys[idx] {
                k if k == key => return Some(idx),
                0 => return None,
                _ => idx = (idx + 1) & mask,
            }
        }
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.find(handle.raw()).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&V> {
        let idx = self.find(handle.raw())?;
        self.values[idx].as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut V> {
        let idx = self.find(handle.raw())?;
        self.values[idx].as_mut()
    }

    /// Insert or replace. Returns the previous value for `handle`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is [`Handle::NONE`]; zero marks empty slots.
    pub fn put(&mut self, handle: Handle, value: V) -> Option<V> {
        let key = handle.raw();
        assert!(key != 0, "HandleTable::put called with the reserved zero handle");

        if let Some(idx) = self.find(key) {
            return self.values[idx].replace(value);
        }

        if (self.len + 1) * 4 > self.keys.len() * 3 {
            self.grow();
        }
        self.insert_new(key, value);
        self.len += 1;
        None
    }

    fn insert_new(&mut self, key: u64, value: V) {
        let mask = self.mask();
        let mut idx = self.home(key);
        while self.keys[idx] != 0 {
            idx = (idx + 1) & mask;
        }
        self.keys[idx] = key;
        self.values[idx] = Some(value);
    }

    fn grow(&mut self) {
        let new_slots = self.keys.len() * 2;
        let old_keys = std::mem::replace(&mut self.keys, vec![0u64; new_slots].into_boxed_slice());
        let old_values = std::mem::replace(
            &mut self.values,
            (0..new_slots).map(|_| None).collect(),
        );
        for (key, value) in old_keys.iter().zip(old_values.into_vec()) {
            if let Some(value) = value {
                self.insert_new(*key, value);
            }
        }
    }

    pub fn remove(&mut self, handle: Handle) -> Option<V> {
        let mut hole = self.find(handle.raw())?;
        let removed = self.values[hole].take();
        self.keys[hole] = 0;
        self.len -= 1;

        // Back-shift: pull later members of the probe chain into the hole whenever the hole lies
        // between their home slot and their current slot.
        let mask = self.mask();
        let mut idx = hole;
        loop {
            idx = (idx + 1) & mask;
            let key = self.keys[idx];
            if key == 0 {
                break;
            }
            let home = self.home(key);
            let dist_to_home = idx.wrapping_sub(home) & mask;
            let dist_to_hole = idx.wrapping_sub(hole) & mask;
            if dist_to_home >= dist_to_hole {
                self.keys[hole] = key;
                self.values[hole] = self.values[idx].take();
                self.keys[idx] = 0;
                hole = idx;
            }
        }
        removed
    }

    /// Drop every entry. Slot storage is kept.
    pub fn clear(&mut self) {
        self.keys.fill(0);
        for value in self.values.iter_mut() {
            *value = None;
        }
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &V)> {
        self.keys
            .iter()
            .zip(self.values.iter())
            .filter_map(|(&key, value)| value.as_ref().map(|v| (Handle::from_raw(key), v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut V)> {
        self.keys
            .iter()
            .zip(self.values.iter_mut())
            .filter_map(|(&key, value)| value.as_mut().map(|v| (Handle::from_raw(key), v)))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.values.iter_mut().filter_map(|v| v.as_mut())
    }
}

impl<V> Default for HandleTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for HandleTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn h(raw: u64) -> Handle {
        Handle::from_raw(raw)
    }

    #[test]
    fn put_get_remove() {
        let mut table = HandleTable::new();
        assert_eq!(table.put(h(7), "seven"), None);
        assert_eq!(table.get(h(7)), Some(&"seven"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.remove(h(7)), Some("seven"));
        assert_eq!(table.get(h(7)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn put_existing_key_replaces_without_growing() {
        let mut table = HandleTable::new();
        table.put(h(1), 10);
        assert_eq!(table.put(h(1), 11), Some(10));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(h(1)), Some(&11));
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut table = HandleTable::new();
        table.put(h(1), ());
        assert_eq!(table.remove(h(2)), None);
        assert_eq!(table.remove(h(1)), Some(()));
        assert_eq!(table.remove(h(1)), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn zero_handle_lookup_misses() {
        let table: HandleTable<u32> = HandleTable::new();
        assert_eq!(table.get(Handle::NONE), None);
        assert!(!table.contains(Handle::NONE));
    }

    #[test]
    #[should_panic(expected = "reserved zero handle")]
    fn put_zero_handle_panics() {
        let mut table = HandleTable::new();
        table.put(Handle::NONE, 1u32);
    }

    #[test]
    fn grows_and_keeps_entries() {
        let mut table = HandleTable::new();
        let initial_slots = table.slot_count();
        for i in 1..=1000u64 {
            table.put(h(i), i * 2);
        }
        assert!(table.slot_count() > initial_slots);
        assert!(table.slot_count().is_power_of_two());
        for i in 1..=1000u64 {
            assert_eq!(table.get(h(i)), Some(&(i * 2)));
        }
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table = HandleTable::new();
        for i in 1..=100u64 {
            table.put(h(i), i);
        }
        let slots = table.slot_count();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.slot_count(), slots);
        assert_eq!(table.get(h(5)), None);
    }

    #[test]
    fn removal_in_the_middle_of_a_probe_chain_keeps_later_entries_reachable() {
        // Force collisions by filling most of a small table.
        let mut table = HandleTable::with_capacity(8);
        for i in 1..=11u64 {
            table.put(h(i), i);
        }
        for i in (1..=11u64).step_by(2) {
            assert_eq!(table.remove(h(i)), Some(i));
        }
        for i in (2..=11u64).step_by(2) {
            assert_eq!(table.get(h(i)), Some(&i), "lost key {i}");
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Put(u64, u32),
        Remove(u64),
        Get(u64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        // A small key space keeps collisions and repeated removals frequent.
        let key = 1u64..64;
        prop_oneof![
            3 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
            2 => key.clone().prop_map(Op::Remove),
            2 => key.prop_map(Op::Get),
        ]
    }

    proptest! {
        #[test]
        fn matches_std_hashmap(ops in prop::collection::vec(op_strategy(), 0..512)) {
            let mut table = HandleTable::new();
            let mut model = HashMap::new();
            for op in ops {
                match op {
                    Op::Put(k, v) => prop_assert_eq!(table.put(h(k), v), model.insert(k, v)),
                    Op::Remove(k) => prop_assert_eq!(table.remove(h(k)), model.remove(&k)),
                    Op::Get(k) => prop_assert_eq!(table.get(h(k)), model.get(&k)),
                }
                prop_assert_eq!(table.len(), model.len());
            }
            let mut seen: Vec<_> = table.iter().map(|(k, v)| (k.raw(), *v)).collect();
            let mut expected: Vec<_> = model.into_iter().collect();
            seen.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(seen, expected);
        }
    }
}
