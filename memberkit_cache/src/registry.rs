//! Process-wide registries of weakly referenced members.
//!
//! A registry never keeps its members alive. Broadcasts snapshot the live
//! handles, release the registry lock, act on every member that is still
//! alive, then purge handles whose member has been dropped. Registration may
//! happen concurrently with a broadcast.

use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::bounded::{BoundedCache, ClearCache};

/// Capacity of caches built by [`create_cache`].
pub const DEFAULT_CAPACITY: usize = 10_000;

/// A list of weak handles supporting a broadcast over the live members.
pub struct WeakRegistry<T: ?Sized> {
    members: Mutex<Vec<Weak<T>>>,
}

impl<T: ?Sized> WeakRegistry<T> {
    pub fn new() -> Self {
        WeakRegistry {
            members: Mutex::new(Vec::new()),
        }
    }

    fn members(&self) -> MutexGuard<'_, Vec<Weak<T>>> {
        self.members
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, member: Weak<T>) {
        self.members().push(member);
    }

    /// Apply `action` to every live member and purge dead handles.
    ///
    /// Returns the number of live members the action was applied to.
    pub fn broadcast(&self, action: impl Fn(&T)) -> usize {
        let snapshot: Vec<Weak<T>> = self.members().clone();
        let mut applied = 0;
        let mut dead = 0;
        for handle in &snapshot {
            match handle.upgrade() {
                Some(member) => {
                    action(&*member);
                    applied += 1;
                }
                None => dead += 1,
            }
        }
        if dead > 0 {
            self.members().retain(|handle| handle.strong_count() > 0);
        }
        tracing::debug!(applied, purged = dead, "registry broadcast");
        applied
    }

    /// Number of registered handles whose member is still alive.
    pub fn live_count(&self) -> usize {
        self.members()
            .iter()
            .filter(|handle| handle.strong_count() > 0)
            .count()
    }

    /// Number of handles currently held, dead ones included.
    pub fn handle_count(&self) -> usize {
        self.members().len()
    }
}

impl<T: ?Sized> Default for WeakRegistry<T> {
    fn default() -> Self {
        WeakRegistry::new()
    }
}

impl<T: ?Sized> fmt::Debug for WeakRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRegistry")
            .field("handles", &self.handle_count())
            .finish()
    }
}

static CACHE_REGISTRY: Lazy<WeakRegistry<dyn ClearCache>> = Lazy::new(WeakRegistry::new);

/// Create a registered cache with 10000 entries that never expire.
pub fn create_cache<K, V>() -> Arc<BoundedCache<K, V>>
where
    K: Hash + Eq + Send + 'static,
    V: Clone + Send + 'static,
{
    create_cache_with(DEFAULT_CAPACITY, Duration::MAX)
}

/// Create a registered cache with the given capacity and time-to-live.
///
/// The process-wide registry only holds a weak handle; dropping every `Arc`
/// to the cache frees it.
pub fn create_cache_with<K, V, C>(capacity: usize, ttl: Duration) -> Arc<BoundedCache<K, V, C>>
where
    K: Hash + Eq + Send + 'static,
    V: Clone + Send + 'static,
    C: PartialEq + Send + 'static,
{
    let cache = Arc::new(BoundedCache::new(capacity, ttl));
    let as_clearable: Arc<dyn ClearCache> = cache.clone();
    CACHE_REGISTRY.register(Arc::downgrade(&as_clearable));
    cache
}

/// Clear every live cache created through the factory.
///
/// Returns the number of caches cleared; caches dropped since their creation
/// are silently removed from the registry.
pub fn clear_all_caches() -> usize {
    CACHE_REGISTRY.broadcast(|cache| cache.clear())
}

/// Number of factory-created caches that are still alive.
pub fn registered_caches() -> usize {
    CACHE_REGISTRY.live_count()
}
