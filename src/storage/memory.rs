//! In-memory dtab store.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;

use crate::config::ComponentError;
use crate::observability::metrics;
use crate::storage::{DtabStore, StorageConfig, StoreError, VersionedDtab};

/// Parameters for the `inMemory` storage kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct InMemoryConfig {
    /// Dtabs to seed the store with, keyed by namespace.
    pub namespaces: BTreeMap<String, String>,
}

impl StorageConfig for InMemoryConfig {
    fn build(&self) -> Result<Arc<dyn DtabStore>, ComponentError> {
        let store = InMemoryStore::new();
        for (namespace, dtab) in &self.namespaces {
            store.create(namespace, dtab)?;
        }
        tracing::debug!(namespaces = self.namespaces.len(), "In-memory store seeded");
        Ok(Arc::new(store))
    }
}

/// A thread-safe, non-persistent dtab store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: DashMap<String, VersionedDtab>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_size(&self) {
        metrics::record_namespaces("inMemory", self.inner.len());
    }
}

impl DtabStore for InMemoryStore {
    fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut namespaces: Vec<String> = self.inner.iter().map(|r| r.key().clone()).collect();
        namespaces.sort();
        Ok(namespaces)
    }

    fn get(&self, namespace: &str) -> Result<Option<VersionedDtab>, StoreError> {
        Ok(self.inner.get(namespace).map(|r| r.value().clone()))
    }

    fn create(&self, namespace: &str, dtab: &str) -> Result<(), StoreError> {
        match self.inner.entry(namespace.to_string()) {
            Entry::Occupied(_) => return Err(StoreError::AlreadyExists(namespace.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(VersionedDtab {
                    dtab: dtab.trim().to_string(),
                    version: 1,
                });
            }
        }
        self.record_size();
        Ok(())
    }

    fn update(&self, namespace: &str, dtab: &str, version: u64) -> Result<(), StoreError> {
        let mut current = self
            .inner
            .get_mut(namespace)
            .ok_or_else(|| StoreError::NotFound(namespace.to_string()))?;
        if current.version != version {
            return Err(StoreError::VersionMismatch {
                namespace: namespace.to_string(),
                expected: version,
                actual: current.version,
            });
        }
        current.dtab = dtab.trim().to_string();
        current.version += 1;
        Ok(())
    }

    fn put(&self, namespace: &str, dtab: &str) -> Result<(), StoreError> {
        self.inner
            .entry(namespace.to_string())
            .and_modify(|current| {
                current.dtab = dtab.trim().to_string();
                current.version += 1;
            })
            .or_insert_with(|| VersionedDtab {
                dtab: dtab.trim().to_string(),
                version: 1,
            });
        self.record_size();
        Ok(())
    }

    fn delete(&self, namespace: &str) -> Result<(), StoreError> {
        self.inner
            .remove(namespace)
            .ok_or_else(|| StoreError::NotFound(namespace.to_string()))?;
        self.record_size();
        Ok(())
    }
}
