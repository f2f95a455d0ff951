//! File-backed dtab store.
//!
//! # Responsibilities
//! - Load namespaces from a JSON file at startup
//! - Rewrite the file after every successful mutation
//!
//! # Design Decisions
//! - Experimental: a single writer process is assumed, no file locking
//! - A missing file is treated as an empty store and created on first write
//! - The in-memory map is updated only after the file write succeeds
//! - Writes go to a sibling `.tmp` file that is renamed over the store, so an
//!   interrupted write never truncates it

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;

use crate::config::ComponentError;
use crate::observability::metrics;
use crate::storage::{DtabStore, StorageConfig, StoreError, VersionedDtab};

/// Parameters for the experimental `fs` storage kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileStoreConfig {
    pub path: PathBuf,
}

impl StorageConfig for FileStoreConfig {
    fn build(&self) -> Result<Arc<dyn DtabStore>, ComponentError> {
        Ok(Arc::new(FileStore::open(&self.path)?))
    }
}

type Namespaces = BTreeMap<String, VersionedDtab>;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: Mutex<Namespaces>,
}

impl FileStore {
    /// Open the store, loading existing namespaces if the file exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let namespaces: Namespaces = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            serde_json::from_reader(reader)?
        } else {
            Namespaces::new()
        };
        tracing::info!(path = ?path, namespaces = namespaces.len(), "Loaded dtab file store");
        metrics::record_namespaces("fs", namespaces.len());
        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(namespaces),
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn lock(&self) -> MutexGuard<'_, Namespaces> {
        // Mutations are applied to a copy, so a poisoned map is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply `mutate` to a copy of the map, persist it, then commit.
    fn write<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Namespaces) -> Result<(), StoreError>,
    {
        let mut guard = self.lock();
        let mut next = guard.clone();
        mutate(&mut next)?;

        let staging = self.staging_path();
        let file = File::create(&staging)?;
        encode(&file, &next)?;
        file.sync_all()?;
        fs::rename(&staging, &self.path)?;

        metrics::record_namespaces("fs", next.len());
        *guard = next;
        Ok(())
    }
}

/// Serialize `namespaces` into `writer`, surfacing buffered write errors.
fn encode<W: Write>(writer: W, namespaces: &Namespaces) -> Result<(), StoreError> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, namespaces)?;
    writer.flush()?;
    Ok(())
}

impl DtabStore for FileStore {
    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().keys().cloned().collect())
    }

    fn get(&self, namespace: &str) -> Result<Option<VersionedDtab>, StoreError> {
        Ok(self.lock().get(namespace).cloned())
    }

    fn create(&self, namespace: &str, dtab: &str) -> Result<(), StoreError> {
        self.write(|map| {
            if map.contains_key(namespace) {
                return Err(StoreError::AlreadyExists(namespace.to_string()));
            }
            map.insert(
                namespace.to_string(),
                VersionedDtab {
                    dtab: dtab.trim().to_string(),
                    version: 1,
                },
            );
            Ok(())
        })
    }

    fn update(&self, namespace: &str, dtab: &str, version: u64) -> Result<(), StoreError> {
        self.write(|map| {
            let current = map
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
        })
    }

    fn put(&self, namespace: &str, dtab: &str) -> Result<(), StoreError> {
        self.write(|map| {
            let entry = map.entry(namespace.to_string()).or_insert(VersionedDtab {
                dtab: String::new(),
                version: 0,
            });
            entry.dtab = dtab.trim().to_string();
            entry.version += 1;
            Ok(())
        })
    }

    fn delete(&self, namespace: &str) -> Result<(), StoreError> {
        self.write(|map| {
            map.remove(namespace)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound(namespace.to_string()))
        })
    }
}
