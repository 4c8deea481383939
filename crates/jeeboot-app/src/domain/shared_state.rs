//! Cross-view key-value blackboard.
//!
//! Views use [`SharedState`] to hand ad hoc values to each other without a
//! central state manager.  It is deliberately untyped: keys are strings,
//! values are arbitrary JSON, and any view may add, read, or overwrite any
//! key.
//!
//! Cloning a `SharedState` clones the *handle*: every clone sees the same
//! underlying map.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

/// Shared, mutable, initially empty mapping of string keys to JSON values.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<Map<String, Value>>>,
}

impl SharedState {
    /// Creates a new, empty blackboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.lock().insert(key.into(), value.into())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.lock().remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A point-in-time copy of the whole map.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.lock().clone()
    }

    /// `true` when both handles point at the same blackboard.
    pub fn same_as(&self, other: &SharedState) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // A panic in another view while holding the lock leaves the map itself
    // intact, so the poison flag is ignored.
    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
