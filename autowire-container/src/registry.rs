//! Definition registry: identifier to binding.
//!
//! Backed by a [`DashMap`] so concurrent readers never block each other.
//! Definitions are handed out as `Arc` clones; no map guard is held while a
//! definition is being resolved, so factories may freely read or rebind.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::definition::Definition;
use crate::key::DependencyKey;

#[derive(Debug, Default)]
pub(crate) struct Registry {
    definitions: DashMap<DependencyKey, Arc<Definition>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `definition.source()`, atomically replacing any previous binding.
    ///
    /// Returns the replaced definition.
    pub fn insert(&self, definition: Definition) -> Option<Arc<Definition>> {
        let key = definition.source().clone();
        let kind = definition.kind();
        let replaced = self.definitions.insert(key.clone(), Arc::new(definition));

        match &replaced {
            Some(old) => debug!(key = %key, kind = %kind, previous = %old.kind(), "Replaced definition"),
            None => debug!(key = %key, kind = %kind, "Registered definition"),
        }
        replaced
    }

    pub fn get(&self, key: &DependencyKey) -> Option<Arc<Definition>> {
        self.definitions.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, key: &DependencyKey) -> Option<Arc<Definition>> {
        let removed = self.definitions.remove(key).map(|(_, definition)| definition);
        if removed.is_some() {
            debug!(key = %key, "Removed definition");
        }
        removed
    }

    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.definitions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// All bound identifiers, sorted.
    pub fn keys(&self) -> Vec<DependencyKey> {
        let mut keys: Vec<_> = self.definitions.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }
}
