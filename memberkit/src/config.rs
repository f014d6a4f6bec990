//! Configuration of the lookup caches and the overload tie-break.
//!
//! The active configuration is read once from the TOML file named by
//! `MEMBERKIT_CONFIG` (defaults when unset) and can be replaced at runtime
//! with [`reload`]. A reload bumps the configuration generation, which makes
//! every per-thread member cache rebuild itself on its next use, and
//! broadcasts `clear_all_caches` and `burn_all`.
//!
//! ```toml
//! member_cache_capacity = 999
//! cache_capacity = 10000
//! cache_ttl_ms = 60000
//! tie_break = "declaration"
//! ```

use std::env;
use std::fmt;
use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use memberkit_cache::{burn_all, clear_all_caches, create_cache_with, BoundedCache, Checksum};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MEMBERKIT_CONFIG";

/// How equally scored overload candidates are ordered before scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Keep the order members are enumerated in: own members first in
    /// declaration order, then inherited ones in lineage order.
    #[default]
    Declaration,
    /// Sort candidates by name, then parameter type names.
    Lexicographic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Capacity of each per-thread member cache. Zero disables it.
    pub member_cache_capacity: usize,
    /// Capacity of caches built with [`Config::create_cache`].
    pub cache_capacity: usize,
    /// Time-to-live of entries in caches built with [`Config::create_cache`].
    /// Absent means entries never expire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_ms: Option<u64>,
    pub tie_break: TieBreak,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            member_cache_capacity: 999,
            cache_capacity: memberkit_cache::DEFAULT_CAPACITY,
            cache_ttl_ms: None,
            tie_break: TieBreak::Declaration,
        }
    }
}

/// Errors loading a configuration file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading config at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Parse(String),
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.message().to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Config::from_toml_str(&source)
    }

    /// The configuration named by `MEMBERKIT_CONFIG`, or the defaults.
    ///
    /// A file that fails to load is reported with a warning and replaced by
    /// the defaults.
    pub fn from_env() -> Self {
        Config::from_env_var(CONFIG_ENV)
    }

    fn from_env_var(var: &str) -> Self {
        let Ok(path) = env::var(var) else {
            return Config::default();
        };
        if path.trim().is_empty() {
            return Config::default();
        }
        match Config::load(path.trim()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default config");
                Config::default()
            }
        }
    }

    /// Entry time-to-live for [`Config::create_cache`].
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_ms.map_or(Duration::MAX, Duration::from_millis)
    }

    /// SHA-256 of the TOML form of this configuration.
    pub fn checksum(&self) -> Checksum {
        // A flat struct of scalars always serializes; the Debug form is a stand-in.
        let source = toml::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
        Checksum::of(source)
    }

    /// Build a registered cache with the configured capacity and time-to-live.
    pub fn create_cache<K, V>(&self) -> Arc<BoundedCache<K, V>>
    where
        K: Hash + Eq + Send + 'static,
        V: Clone + Send + 'static,
    {
        create_cache_with(self.cache_capacity, self.cache_ttl())
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::Declaration => write!(f, "declaration"),
            TieBreak::Lexicographic => write!(f, "lexicographic"),
        }
    }
}

static CURRENT: Lazy<RwLock<Arc<Config>>> =
    Lazy::new(|| RwLock::new(Arc::new(Config::from_env())));

static GENERATION: AtomicU64 = AtomicU64::new(0);

/// The active configuration.
pub fn current() -> Arc<Config> {
    CURRENT
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Number of reloads so far. Per-thread caches compare it to decide whether
/// to rebuild.
pub fn generation() -> u64 {
    GENERATION.load(Ordering::Acquire)
}

/// Replace the active configuration and invalidate everything derived from it.
pub fn reload(config: Config) {
    let generation = {
        let mut current = CURRENT
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Arc::new(config);
        GENERATION.fetch_add(1, Ordering::AcqRel) + 1
    };
    let cleared = clear_all_caches();
    let burned = burn_all();
    tracing::debug!(generation, cleared, burned, "configuration reloaded");
}
