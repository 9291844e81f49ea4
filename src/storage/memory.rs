use dashmap::DashMap;
use std::{hash::Hash, sync::Arc};
use tokio::sync::Mutex;

/// Sharded map with one async lock per key.
///
/// Callers hold the per-key guard for a whole read-modify-write, so two tasks
/// working on the same key are serialized while other keys proceed in parallel.
#[derive(Debug)]
pub struct KeyedStore<K: Eq + Hash, V> {
    entries: Arc<DashMap<K, Arc<Mutex<V>>>>,
}

impl<K: Eq + Hash, V> Clone for KeyedStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Default> KeyedStore<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::with_capacity(capacity)),
        }
    }

    /// Returns the lock for `key`, creating a default value on first access.
    #[cfg(test)]
    pub fn entry(&self, key: &K) -> Arc<Mutex<V>> {
        self.entry_with(key, V::default)
    }

    /// Returns the lock for `key`, building the first value with `init`.
    pub fn entry_with(&self, key: &K, init: impl FnOnce() -> V) -> Arc<Mutex<V>> {
        if let Some(value) = self.entries.get(key) {
            return Arc::clone(value.value());
        }
        Arc::clone(
            self.entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(init())))
                .value(),
        )
    }

    #[cfg(test)]
    pub fn get(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        self.entries.get(key).map(|value| Arc::clone(value.value()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entry_is_created_once() {
        let store: KeyedStore<u64, u32> = KeyedStore::new(4);
        assert!(store.get(&1).is_none());

        *store.entry(&1).lock().await += 5;
        *store.entry(&1).lock().await += 1;

        assert_eq!(*store.get(&1).unwrap().lock().await, 6);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_entry_with_only_runs_init_on_first_access() {
        let store: KeyedStore<u64, u32> = KeyedStore::new(4);
        assert_eq!(*store.entry_with(&2, || 40).lock().await, 40);
        assert_eq!(*store.entry_with(&2, || 99).lock().await, 40);
    }

    #[tokio::test]
    async fn test_concurrent_updates_on_one_key_are_serialized() {
        let store: KeyedStore<u64, u32> = KeyedStore::new(4);
        let mut handles = vec![];

        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let entry = store.entry(&9);
                let mut value = entry.lock().await;
                let seen = *value;
                tokio::task::yield_now().await;
                *value = seen + 1;
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*store.entry(&9).lock().await, 50);
    }
}
