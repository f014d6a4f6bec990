//! Lazily recreated values that expire and rise again on the next read.
//!
//! A `PhoenixValue` starts empty. Reading it while empty or expired runs the
//! rebirth callback on the caller's thread and stores the result for the
//! configured time-to-live. `burn` empties it again; `burn_all` empties every
//! phoenix value in the process, e.g. after the source they were derived from
//! changed.
//!
//! Recreation is not serialized. The slot lock is released while the rebirth
//! callback runs, so readers racing on an empty value may each run it; the
//! last one to finish wins.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::fleeting::FleetingValue;
use crate::registry::WeakRegistry;

/// Anything `burn_all` can invalidate.
pub trait Burn: Send + Sync {
    fn burn(&self);
}

static PHOENIX_REGISTRY: Lazy<WeakRegistry<dyn Burn>> = Lazy::new(WeakRegistry::new);

/// A lazily computed value with a time-to-live.
pub struct PhoenixValue<T> {
    slot: Mutex<FleetingValue<T>>,
    ttl: Duration,
    rebirth: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Clone + Send + 'static> PhoenixValue<T> {
    /// Create a value that lives `ttl` after each recreation.
    pub fn new<F>(ttl: Duration, rebirth: F) -> Arc<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let phoenix = Arc::new(PhoenixValue {
            slot: Mutex::new(FleetingValue::empty()),
            ttl,
            rebirth: Box::new(rebirth),
        });
        let as_burnable: Arc<dyn Burn> = phoenix.clone();
        PHOENIX_REGISTRY.register(Arc::downgrade(&as_burnable));
        phoenix
    }

    /// Create a value that only expires when burned.
    pub fn forever<F>(rebirth: F) -> Arc<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        PhoenixValue::new(Duration::MAX, rebirth)
    }

    fn slot(&self) -> MutexGuard<'_, FleetingValue<T>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The current value, recreating it first if it is empty or expired.
    pub fn get(&self) -> T {
        if let Some(value) = self.slot().get() {
            return value.clone();
        }
        let value = (self.rebirth)();
        self.slot().set(value.clone(), self.ttl);
        value
    }

    /// Whether a read right now would be served without recreation.
    pub fn is_alive(&self) -> bool {
        self.slot().is_valid()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<T: Send> Burn for PhoenixValue<T> {
    fn burn(&self) {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl<T: Send> PhoenixValue<T> {
    /// Empty the value; the next read recreates it.
    pub fn burn(&self) {
        Burn::burn(self);
    }
}

impl<T> fmt::Debug for PhoenixValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhoenixValue")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Burn every live phoenix value in the process.
///
/// Returns the number of values burned; dropped values are purged from the
/// registry.
pub fn burn_all() -> usize {
    PHOENIX_REGISTRY.broadcast(|phoenix| phoenix.burn())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn counting(ttl: Duration) -> (Arc<PhoenixValue<usize>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let phoenix = PhoenixValue::new(ttl, move || counter.fetch_add(1, Ordering::SeqCst) + 1);
        (phoenix, calls)
    }

    #[test]
    fn test_first_get_recreates_once() {
        let (phoenix, calls) = counting(Duration::MAX);
        assert!(!phoenix.is_alive());
        assert_eq!(phoenix.get(), 1);
        assert_eq!(phoenix.get(), 1);
        assert_eq!(phoenix.get(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(phoenix.is_alive());
    }

    #[test]
    fn test_burn_forces_recreation() {
        let (phoenix, calls) = counting(Duration::MAX);
        assert_eq!(phoenix.get(), 1);
        phoenix.burn();
        phoenix.burn();
        assert!(!phoenix.is_alive());
        assert_eq!(phoenix.get(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_expiry_forces_recreation() {
        let (phoenix, calls) = counting(Duration::from_millis(20));
        assert_eq!(phoenix.get(), 1);
        thread::sleep(Duration::from_millis(40));
        assert_eq!(phoenix.get(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_forever_keeps_value() {
        let phoenix = PhoenixValue::forever(|| String::from("risen"));
        assert_eq!(phoenix.get(), "risen");
        assert_eq!(phoenix.ttl(), Duration::MAX);
    }
}
