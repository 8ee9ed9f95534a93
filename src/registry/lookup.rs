//! Registry Snapshots and Token Lookup
//!
//! [`SharedRegistry`] is the process-wide handle to the current registry
//! snapshot. Installing a new snapshot swaps one `Arc` under a lock and
//! bumps a version counter; readers either see the fully old or fully new
//! registry, never a partial update. Observers poll the version counter.
//!
//! [`TokenClassificationCache`] is the derived token-to-classification
//! cache for quick-info callers. It is guarded separately from the registry
//! swap and invalidates itself whenever the observed version changes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::fragments::Classification;
use crate::registry::config::{CommandConfig, ConfigError};
use crate::registry::Registry;

/// Atomically swappable handle to the current registry snapshot.
pub struct SharedRegistry {
    current: RwLock<Arc<Registry>>,
    version: AtomicU64,
}

impl SharedRegistry {
    /// Start from the default registry.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Registry::default_registry()),
            version: AtomicU64::new(0),
        }
    }

    /// The current snapshot. Cheap; clones an `Arc`.
    pub fn snapshot(&self) -> Arc<Registry> {
        Arc::clone(&self.current.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Monotonic counter bumped on every successful install. Pollers use it
    /// to notice configuration changes.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Replace the current snapshot.
    pub fn install(&self, registry: Registry) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(registry);
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    /// Rebuild from the default table plus overrides and install the result.
    /// On error the previous snapshot stays active.
    pub fn apply_config(&self, config: &CommandConfig) -> Result<(), ConfigError> {
        let registry = Registry::with_overrides(config)?;
        self.install(registry);
        Ok(())
    }

    /// Reset to the unmodified default registry.
    pub fn reset(&self) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Registry::default_registry();
        self.version.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-through cache for token classification lookups.
///
/// Lookups hitting the prefix fallback are the expensive case; callers that
/// repeatedly ask about the same tokens (tooltips) go through this cache
/// instead of the registry directly. The cache drops its entries whenever
/// the registry version moves.
pub struct TokenClassificationCache {
    entries: RwLock<CacheState>,
}

struct CacheState {
    version: u64,
    map: HashMap<String, Option<Classification>>,
}

impl TokenClassificationCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(CacheState {
                version: 0,
                map: HashMap::new(),
            }),
        }
    }

    /// Classification for a literal command token, cached against the
    /// current registry version. Negative results are cached too.
    pub fn classification_of(
        &self,
        registry: &SharedRegistry,
        token: &str,
    ) -> Option<Classification> {
        let version = registry.version();
        {
            let state = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if state.version == version {
                if let Some(cached) = state.map.get(token) {
                    return *cached;
                }
            }
        }

        let classification = registry.snapshot().classification_of(token);
        let mut state = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if state.version != version {
            state.version = version;
            state.map.clear();
        }
        state.map.insert(token.to_string(), classification);
        classification
    }
}

impl Default for TokenClassificationCache {
    fn default() -> Self {
        Self::new()
    }
}
