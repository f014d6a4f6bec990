//! Bounded cache with LRU eviction, per-entry expiry and a checksum gate.
//!
//! A lookup hits only when the key exists, the entry has not expired and the
//! checksum supplied with the lookup equals the checksum stored with the
//! entry (both absent counts as equal). Every other outcome is a silent miss;
//! a checksum mismatch neither returns nor evicts the stored entry.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use lru::LruCache;

use crate::checksum::Checksum;
use crate::equality::equal;
use crate::fleeting::FleetingValue;

/// Anything the cache registry can clear.
pub trait ClearCache: Send + Sync {
    fn clear(&self);
}

struct CacheEntry<V, C> {
    value: FleetingValue<V>,
    checksum: Option<C>,
}

/// Capacity-bounded, least-recently-used cache with time-to-live.
///
/// All operations take `&self`; the entry table sits behind a mutex so a
/// cache can be shared between threads through an `Arc`.
pub struct BoundedCache<K, V, C = Checksum> {
    capacity: usize,
    ttl: Duration,
    // `None` when the capacity is zero: storage is disabled.
    entries: Mutex<Option<LruCache<K, CacheEntry<V, C>>>>,
}

impl<K: Hash + Eq, V: Clone, C: PartialEq> BoundedCache<K, V, C> {
    /// Create a cache holding at most `capacity` entries that live for `ttl`.
    ///
    /// A capacity of zero disables storage; `Duration::MAX` never expires.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        BoundedCache {
            capacity,
            ttl,
            entries: Mutex::new(NonZeroUsize::new(capacity).map(LruCache::new)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Option<LruCache<K, CacheEntry<V, C>>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn put(&self, key: K, value: V) {
        self.store(key, value, None);
    }

    pub fn put_with_checksum(&self, key: K, value: V, checksum: C) {
        self.store(key, value, Some(checksum));
    }

    fn store(&self, key: K, value: V, checksum: Option<C>) {
        let mut guard = self.entries();
        let Some(entries) = guard.as_mut() else {
            return;
        };
        let entry = CacheEntry {
            value: FleetingValue::new(value, self.ttl),
            checksum,
        };
        // `push` hands back either the replaced entry of the same key or the evicted one.
        let replacing = entries.contains(&key);
        if entries.push(key, entry).is_some() && !replacing {
            tracing::trace!(
                capacity = self.capacity,
                "evicted least recently used cache entry"
            );
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lookup(key, None)
    }

    pub fn get_with_checksum(&self, key: &K, checksum: &C) -> Option<V> {
        self.lookup(key, Some(checksum))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lookup(key, None).is_some()
    }

    pub fn contains_with_checksum(&self, key: &K, checksum: &C) -> bool {
        self.lookup(key, Some(checksum)).is_some()
    }

    fn lookup(&self, key: &K, checksum: Option<&C>) -> Option<V> {
        let mut guard = self.entries();
        let entry = guard.as_mut()?.get(key)?;
        if !equal(entry.checksum.as_ref(), checksum) {
            return None;
        }
        entry.value.get().cloned()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        if let Some(entries) = self.entries().as_mut() {
            entries.clear();
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries().as_ref().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<K, V, C> ClearCache for BoundedCache<K, V, C>
where
    K: Hash + Eq + Send,
    V: Clone + Send,
    C: PartialEq + Send,
{
    fn clear(&self) {
        BoundedCache::clear(self);
    }
}

impl<K, V, C> fmt::Debug for BoundedCache<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn forever<K: Hash + Eq, V: Clone>(capacity: usize) -> BoundedCache<K, V> {
        BoundedCache::new(capacity, Duration::MAX)
    }

    #[test]
    fn test_put_then_get_round_trip() {
        let cache = forever(10);
        cache.put("k", 1);
        assert_eq!(cache.get(&"k"), Some(1));
        assert!(cache.contains(&"k"));
        assert_eq!(cache.get(&"other"), None);
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let cache: BoundedCache<&str, i32> = BoundedCache::new(10, Duration::from_millis(20));
        cache.put("k", 1);
        assert_eq!(cache.get(&"k"), Some(1));
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&"k"), None);
        assert!(!cache.contains(&"k"));
    }

    #[test]
    fn test_checksum_gate() {
        let cache = forever(10);
        cache.put_with_checksum("k", "v", Checksum::of("c1"));
        assert_eq!(cache.get_with_checksum(&"k", &Checksum::of("c2")), None);
        assert_eq!(cache.get(&"k"), None);
        assert_eq!(cache.get_with_checksum(&"k", &Checksum::of("c1")), Some("v"));
        assert!(cache.contains_with_checksum(&"k", &Checksum::of("c1")));
    }

    #[test]
    fn test_checksum_mismatch_does_not_evict() {
        let cache = forever(10);
        cache.put_with_checksum("k", "v", Checksum::of("c1"));
        for _ in 0..3 {
            assert!(!cache.contains_with_checksum(&"k", &Checksum::of("stale")));
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_with_checksum(&"k", &Checksum::of("c1")), Some("v"));
    }

    #[test]
    fn test_unchecked_entry_misses_checked_lookup() {
        let cache = forever(10);
        cache.put("k", "v");
        assert!(!cache.contains_with_checksum(&"k", &Checksum::of("c1")));
        assert!(cache.contains(&"k"));
    }

    #[test]
    fn test_eviction_drops_least_recently_used() {
        let cache = forever(3);
        for (i, key) in ["a", "b", "c", "d"].into_iter().enumerate() {
            cache.put(key, i);
        }
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&"a"));
        assert!(cache.contains(&"b"));
        assert!(cache.contains(&"c"));
        assert!(cache.contains(&"d"));
    }

    #[test]
    fn test_access_refreshes_recency() {
        let cache = forever(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
        cache.put("c", 3);
        assert!(cache.contains(&"a"));
        assert!(!cache.contains(&"b"));
    }

    #[test]
    fn test_zero_capacity_disables_storage() {
        let cache = forever(0);
        cache.put("k", 1);
        assert_eq!(cache.get(&"k"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn test_clear_empties_the_cache() {
        let cache = forever(4);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains(&"a"));
    }

    #[test]
    fn test_shared_between_threads() {
        let cache = std::sync::Arc::new(forever::<usize, usize>(1000));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = std::sync::Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        cache.put(t * 100 + i, i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 400);
        assert_eq!(cache.get(&301), Some(1));
    }
}
