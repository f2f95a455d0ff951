//! Dtab storage subsystem.
//!
//! # Data Flow
//! ```text
//! [storage] section
//!     → registry decodes kind-specific params (StorageConfig)
//!     → StorageConfig::build() during bootstrap
//!     → Arc<dyn DtabStore> shared with every interface
//! ```
//!
//! # Design Decisions
//! - Dtabs are opaque text here; parsing and evaluation belong elsewhere
//! - Every write bumps a per-namespace version for optimistic concurrency
//! - Stores are synchronous; they never block on the network

pub mod file;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ComponentError;

/// A stored dtab together with its version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedDtab {
    pub dtab: String,
    pub version: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("namespace '{0}' already exists")]
    AlreadyExists(String),

    #[error("namespace '{0}' not found")]
    NotFound(String),

    #[error("version mismatch for namespace '{namespace}': expected {expected}, found {actual}")]
    VersionMismatch {
        namespace: String,
        expected: u64,
        actual: u64,
    },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Handle to the table storage backend.
pub trait DtabStore: Send + Sync + fmt::Debug {
    /// Namespaces in sorted order.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    fn get(&self, namespace: &str) -> Result<Option<VersionedDtab>, StoreError>;

    /// Create a namespace; fails if it already exists.
    fn create(&self, namespace: &str, dtab: &str) -> Result<(), StoreError>;

    /// Replace a namespace's dtab if its version still matches.
    fn update(&self, namespace: &str, dtab: &str, version: u64) -> Result<(), StoreError>;

    /// Create or replace unconditionally.
    fn put(&self, namespace: &str, dtab: &str) -> Result<(), StoreError>;

    fn delete(&self, namespace: &str) -> Result<(), StoreError>;
}

/// Kind-specific storage parameters, decoded by the registry.
pub trait StorageConfig: Send + Sync + fmt::Debug {
    fn build(&self) -> Result<Arc<dyn DtabStore>, ComponentError>;
}
