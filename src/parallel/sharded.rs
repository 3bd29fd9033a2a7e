use std::collections::BTreeMap;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::core::types::DocId;

/// Fixed-shard concurrent map for accumulating per-document values.
///
/// The key space is partitioned by `id mod shard_count`; each shard is an
/// ordered map behind its own mutex, so writers on different shards make
/// progress concurrently while writers on the same shard serialize. The map
/// provides no cross-shard atomicity.
pub struct ConcurrentMap<V> {
    shards: Vec<Mutex<BTreeMap<DocId, V>>>,
}

impl<V: Default> ConcurrentMap<V> {
    /// Creates a map with the given shard count (clamped to at least one).
    /// Pass the hardware concurrency when in doubt.
    pub fn new(shard_count: usize) -> Self {
        ConcurrentMap {
            shards: (0..shard_count.max(1))
                .map(|_| Mutex::new(BTreeMap::new()))
                .collect(),
        }
    }

    /// Locks the shard owning `key` and returns a guard to its value,
    /// inserting a default first if the key is absent. The shard stays
    /// locked for the guard's lifetime.
    pub fn at_mut(&self, key: DocId) -> MappedMutexGuard<'_, V> {
        let shard = key.value().rem_euclid(self.shards.len() as i32) as usize;
        MutexGuard::map(self.shards[shard].lock(), |map| {
            map.entry(key).or_default()
        })
    }

    /// Merges every shard, in shard order, into one ordered map, consuming
    /// the accumulator. Call once accumulation is finished.
    pub fn build_ordinary(self) -> BTreeMap<DocId, V> {
        let mut merged = BTreeMap::new();
        for shard in self.shards {
            merged.extend(shard.into_inner());
        }
        merged
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}
