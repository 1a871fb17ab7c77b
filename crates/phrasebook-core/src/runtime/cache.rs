// crates/phrasebook-core/src/runtime/cache.rs
// ============================================================================
// Module: Phrasebook Cache Backends
// Description: No-op and in-memory cache invalidators.
// Purpose: Provide cache collaborators for deployments without an external cache.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`NoopCache`] discards invalidations. [`InMemoryCache`] holds rendered
//! values keyed by cache key so tests can assert that a save evicted the
//! right entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::CacheError;
use crate::interfaces::CacheInvalidator;

// ============================================================================
// SECTION: No-Op Cache
// ============================================================================

/// Cache invalidator that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl CacheInvalidator for NoopCache {
    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Cache
// ============================================================================

/// Mutex-guarded key/value cache.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCache {
    /// Cached values keyed by cache key.
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the cache mutex is poisoned.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) -> Result<(), CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("cache mutex poisoned".to_string()))?
            .insert(key.into(), value.into());
        Ok(())
    }

    /// Returns the value cached under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the cache mutex is poisoned.
    pub fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| CacheError::Backend("cache mutex poisoned".to_string()))?
            .get(key)
            .cloned())
    }
}

impl CacheInvalidator for InMemoryCache {
    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("cache mutex poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}
