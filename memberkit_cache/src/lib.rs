//! memberkit cache runtime
//!
//! This crate provides the caching primitives used by `memberkit` to
//! amortize member lookups. It includes:
//!
//! - `CacheKey` for value-semantics keys built from nested argument tuples
//! - `BoundedCache` with LRU eviction, per-entry expiry and a checksum gate
//! - A process-wide weak registry of caches with a `clear_all_caches` broadcast
//! - `FleetingValue` and `PhoenixValue` for expiring and lazily recreated values
//! - `Checksum` and the deep-equality helpers used by the checksum gate

pub mod bounded;
pub mod checksum;
pub mod equality;
pub mod fleeting;
pub mod key;
pub mod phoenix;
pub mod registry;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use memberkit_cache::prelude::*;
/// ```
pub mod prelude {
    pub use super::bounded::{BoundedCache, ClearCache};
    pub use super::checksum::Checksum;
    pub use super::fleeting::FleetingValue;
    pub use super::key::{CacheKey, KeyPart};
    pub use super::phoenix::{burn_all, Burn, PhoenixValue};
    pub use super::registry::{
        clear_all_caches, create_cache, create_cache_with, registered_caches, WeakRegistry,
        DEFAULT_CAPACITY,
    };
}

pub use prelude::*;
