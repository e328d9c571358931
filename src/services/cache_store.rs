use async_lock::RwLock;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

struct Entries<K, V> {
    values: HashMap<K, V>,
    insertion_order: VecDeque<K>,
}

/// Bounded cache evicting the oldest inserted key first.
///
/// Reads never refresh an entry, so a frequently hit key is still evicted
/// once enough newer keys were inserted after it.
pub(crate) struct CacheStore<K, V> {
    capacity: usize,
    entries: RwLock<Entries<K, V>>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(Entries {
                values: HashMap::with_capacity(capacity),
                insertion_order: VecDeque::with_capacity(capacity),
            }),
        }
    }

    pub(crate) async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.values.get(key).cloned()
    }

    pub(crate) async fn put(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.write().await;

        // Overwriting keeps the original insertion slot.
        if let Some(existing) = entries.values.get_mut(&key) {
            *existing = value;
            return;
        }

        if entries.values.len() >= self.capacity {
            if let Some(oldest) = entries.insertion_order.pop_front() {
                entries.values.remove(&oldest);
            }
        }

        entries.insertion_order.push_back(key.clone());
        entries.values.insert(key, value);
    }

    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.values.len()
    }
}
