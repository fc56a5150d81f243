//! Keyed collection with an explicit oldest-first order.
//!
//! Every insert is stamped with a monotonically increasing sequence number and
//! indexed in a `BTreeMap`, so "oldest entry" is a property of the structure
//! rather than of a hash map's iteration order.

use std::collections::{BTreeMap, HashMap};

#[derive(Debug)]
pub(crate) struct InsertionOrdered<V> {
    entries: HashMap<String, (u64, V)>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl<V> Default for InsertionOrdered<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<V> InsertionOrdered<V> {
    /// Insert `value` as the newest entry. Re-inserting an existing key moves
    /// it to the back.
    pub(crate) fn insert(&mut self, key: String, value: V) {
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some((old_seq, _)) = self.entries.insert(key.clone(), (seq, value)) {
            self.order.remove(&old_seq);
        }
        self.order.insert(seq, key);
    }

    pub(crate) fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key).map(|(_, v)| v)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key).map(|(_, v)| v)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<V> {
        let (seq, value) = self.entries.remove(key)?;
        self.order.remove(&seq);
        Some(value)
    }

    /// Key of the oldest entry.
    pub(crate) fn oldest_key(&self) -> Option<&str> {
        self.order.values().next().map(String::as_str)
    }

    pub(crate) fn pop_oldest(&mut self) -> Option<(String, V)> {
        let (_, key) = self.order.pop_first()?;
        let (_, value) = self.entries.remove(&key)?;
        Some((key, value))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Values, oldest first.
    pub(crate) fn values(&self) -> impl Iterator<Item = &V> {
        self.order
            .values()
            .filter_map(|key| self.entries.get(key).map(|(_, v)| v))
    }
}
