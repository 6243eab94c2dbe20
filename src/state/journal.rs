//! Keyed tables with an undo log, so a failed call frame can be rolled back.
//!
//! Every write records the key's previous value. A checkpoint is the current
//! length of the undo log; reverting pops entries back to it and restores the
//! recorded values in reverse order. Committing drops the log.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::hash::Hash;

pub struct JournaledMap<K, V> {
    map: DashMap<K, V>,
    undo: Mutex<Vec<(K, Option<V>)>>,
}

impl<K, V> Default for JournaledMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            map: DashMap::new(),
            undo: Mutex::new(Vec::new()),
        }
    }
}

impl<K, V> JournaledMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Cloned, so no shard guard outlives the read. The authority re-enters
    /// itself through nested calls and would deadlock on a held guard.
    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let previous = self.map.insert(key.clone(), value);
        self.undo.lock().push((key, previous));
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let previous = self.map.remove(key).map(|(_, v)| v);
        if previous.is_some() {
            self.undo.lock().push((key.clone(), previous.clone()));
        }
        previous
    }

    /// Read-modify-write of a single entry, starting from `V::default()` when absent.
    pub fn update<R>(&self, key: K, f: impl FnOnce(&mut V) -> R) -> R
    where
        V: Default,
    {
        let mut value = self.get(&key).unwrap_or_default();
        let out = f(&mut value);
        self.insert(key, value);
        out
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn checkpoint(&self) -> usize {
        self.undo.lock().len()
    }

    pub fn revert_to(&self, checkpoint: usize) {
        let entries: Vec<_> = {
            let mut undo = self.undo.lock();
            let keep = checkpoint.min(undo.len());
            undo.drain(keep..).collect()
        };
        for (key, previous) in entries.into_iter().rev() {
            match previous {
                Some(v) => {
                    self.map.insert(key, v);
                }
                None => {
                    self.map.remove(&key);
                }
            }
        }
    }

    pub fn commit(&self) {
        self.undo.lock().clear();
    }
}

/// A single journaled value.
pub struct JournaledCell<T> {
    value: Mutex<T>,
    undo: Mutex<Vec<T>>,
}

impl<T: Clone> JournaledCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            undo: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self) -> T {
        self.value.lock().clone()
    }

    pub fn set(&self, value: T) {
        let previous = std::mem::replace(&mut *self.value.lock(), value);
        self.undo.lock().push(previous);
    }

    pub fn checkpoint(&self) -> usize {
        self.undo.lock().len()
    }

    pub fn revert_to(&self, checkpoint: usize) {
        let mut undo = self.undo.lock();
        if checkpoint < undo.len() {
            let restored = undo.swap_remove(checkpoint);
            undo.truncate(checkpoint);
            *self.value.lock() = restored;
        }
    }

    pub fn commit(&self) {
        self.undo.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_restores_previous_values() {
        let table: JournaledMap<u8, u32> = JournaledMap::default();
        table.insert(1, 10);
        table.commit();

        let cp = table.checkpoint();
        table.insert(1, 11);
        table.insert(2, 20);
        table.remove(&1);
        assert_eq!(table.get(&1), None);

        table.revert_to(cp);
        assert_eq!(table.get(&1), Some(10));
        assert_eq!(table.get(&2), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_nested_checkpoints() {
        let table: JournaledMap<u8, u32> = JournaledMap::default();
        let outer = table.checkpoint();
        table.insert(1, 1);
        let inner = table.checkpoint();
        table.insert(1, 2);

        table.revert_to(inner);
        assert_eq!(table.get(&1), Some(1));
        table.revert_to(outer);
        assert_eq!(table.get(&1), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_update_starts_from_default() {
        let table: JournaledMap<u8, u32> = JournaledMap::default();
        let seen = table.update(3, |v| {
            *v += 5;
            *v
        });
        assert_eq!(seen, 5);
        assert_eq!(table.get(&3), Some(5));
    }

    #[test]
    fn test_commit_drops_history() {
        let table: JournaledMap<u8, u32> = JournaledMap::default();
        table.insert(1, 1);
        table.commit();
        assert_eq!(table.checkpoint(), 0);
        table.revert_to(0);
        assert_eq!(table.get(&1), Some(1));
    }

    #[test]
    fn test_cell_reverts_to_first_value_after_checkpoint() {
        let cell = JournaledCell::new(1u8);
        let cp = cell.checkpoint();
        cell.set(2);
        cell.set(3);
        assert_eq!(cell.get(), 3);
        cell.revert_to(cp);
        assert_eq!(cell.get(), 1);
    }
}
