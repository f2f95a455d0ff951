//! Plugin registry.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     builtin() entries (+ any embedder-supplied entries)
//!     → Registry::load (reject duplicate role/kind pairs)
//!     → install() into the process-wide slot, exactly once
//!
//! Parsing:
//!     { kind = "...", ...params }
//!     → Registry::namer / storage / interface / telemeter (lookup by kind)
//!     → entry decoder turns params into a typed config behind a role trait
//! ```
//!
//! # Design Decisions
//! - Compiled-in entries, no runtime discovery
//! - Immutable after load; safe to share across threads without locks
//! - Each kind's schema is the serde type its decoder targets

pub mod builtin;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::ParseError;
use crate::interface::InterfaceConfig;
use crate::namer::NamerConfig;
use crate::storage::StorageConfig;
use crate::telemetry::TelemeterConfig;

pub use builtin::builtin;

/// The role a component kind plays in a composed instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Namer,
    Storage,
    Interface,
    Telemeter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Namer => "namer",
            Role::Storage => "storage",
            Role::Interface => "interface",
            Role::Telemeter => "telemeter",
        };
        f.write_str(name)
    }
}

/// Turns kind-specific parameters into a boxed config for one role.
pub type Decoder<C> = fn(Value) -> Result<Box<C>, serde_json::Error>;

fn decode_namer<C: NamerConfig + DeserializeOwned + 'static>(
    params: Value,
) -> Result<Box<dyn NamerConfig>, serde_json::Error> {
    Ok(Box::new(serde_json::from_value::<C>(params)?))
}

fn decode_storage<C: StorageConfig + DeserializeOwned + 'static>(
    params: Value,
) -> Result<Box<dyn StorageConfig>, serde_json::Error> {
    Ok(Box::new(serde_json::from_value::<C>(params)?))
}

fn decode_interface<C: InterfaceConfig + DeserializeOwned + 'static>(
    params: Value,
) -> Result<Box<dyn InterfaceConfig>, serde_json::Error> {
    Ok(Box::new(serde_json::from_value::<C>(params)?))
}

fn decode_telemeter<C: TelemeterConfig + DeserializeOwned + 'static>(
    params: Value,
) -> Result<Box<dyn TelemeterConfig>, serde_json::Error> {
    Ok(Box::new(serde_json::from_value::<C>(params)?))
}

/// Storage kinds carry an extra flag: whether they require explicit opt-in.
#[derive(Clone, Copy)]
pub struct StorageEntry {
    pub experimental: bool,
    pub decode: Decoder<dyn StorageConfig>,
}

/// One `(role, kind) → decoder` mapping.
#[derive(Clone)]
pub enum RegistryEntry {
    Namer {
        kind: String,
        decode: Decoder<dyn NamerConfig>,
    },
    Storage {
        kind: String,
        entry: StorageEntry,
    },
    Interface {
        kind: String,
        decode: Decoder<dyn InterfaceConfig>,
    },
    Telemeter {
        kind: String,
        decode: Decoder<dyn TelemeterConfig>,
    },
}

impl RegistryEntry {
    pub fn namer<C: NamerConfig + DeserializeOwned + 'static>(kind: impl Into<String>) -> Self {
        RegistryEntry::Namer {
            kind: kind.into(),
            decode: decode_namer::<C>,
        }
    }

    pub fn storage<C: StorageConfig + DeserializeOwned + 'static>(kind: impl Into<String>) -> Self {
        RegistryEntry::Storage {
            kind: kind.into(),
            entry: StorageEntry {
                experimental: false,
                decode: decode_storage::<C>,
            },
        }
    }

    /// A storage kind that only builds when the document sets `experimental = true`.
    pub fn experimental_storage<C: StorageConfig + DeserializeOwned + 'static>(
        kind: impl Into<String>,
    ) -> Self {
        RegistryEntry::Storage {
            kind: kind.into(),
            entry: StorageEntry {
                experimental: true,
                decode: decode_storage::<C>,
            },
        }
    }

    pub fn interface<C: InterfaceConfig + DeserializeOwned + 'static>(kind: impl Into<String>) -> Self {
        RegistryEntry::Interface {
            kind: kind.into(),
            decode: decode_interface::<C>,
        }
    }

    pub fn telemeter<C: TelemeterConfig + DeserializeOwned + 'static>(kind: impl Into<String>) -> Self {
        RegistryEntry::Telemeter {
            kind: kind.into(),
            decode: decode_telemeter::<C>,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RegistryEntry::Namer { .. } => Role::Namer,
            RegistryEntry::Storage { .. } => Role::Storage,
            RegistryEntry::Interface { .. } => Role::Interface,
            RegistryEntry::Telemeter { .. } => Role::Telemeter,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            RegistryEntry::Namer { kind, .. }
            | RegistryEntry::Storage { kind, .. }
            | RegistryEntry::Interface { kind, .. }
            | RegistryEntry::Telemeter { kind, .. } => kind,
        }
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("role", &self.role())
            .field("kind", &self.kind())
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{role} kind '{kind}' is registered more than once")]
    Duplicate { role: Role, kind: String },

    #[error("plugin registry is already installed")]
    AlreadyInstalled,
}

/// Catalog of available component kinds, partitioned by role.
#[derive(Default)]
pub struct Registry {
    namers: BTreeMap<String, Decoder<dyn NamerConfig>>,
    storage: BTreeMap<String, StorageEntry>,
    interfaces: BTreeMap<String, Decoder<dyn InterfaceConfig>>,
    telemeters: BTreeMap<String, Decoder<dyn TelemeterConfig>>,
}

impl Registry {
    /// Build a registry, rejecting duplicate `(role, kind)` pairs.
    pub fn load<I>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = RegistryEntry>,
    {
        let mut registry = Registry::default();
        for entry in entries {
            let role = entry.role();
            let kind = entry.kind().to_string();
            let duplicate = match entry {
                RegistryEntry::Namer { kind, decode } => registry.namers.insert(kind, decode).is_some(),
                RegistryEntry::Storage { kind, entry } => registry.storage.insert(kind, entry).is_some(),
                RegistryEntry::Interface { kind, decode } => {
                    registry.interfaces.insert(kind, decode).is_some()
                }
                RegistryEntry::Telemeter { kind, decode } => {
                    registry.telemeters.insert(kind, decode).is_some()
                }
            };
            if duplicate {
                return Err(RegistryError::Duplicate { role, kind });
            }
        }
        Ok(registry)
    }

    pub fn namer(&self, kind: &str) -> Option<Decoder<dyn NamerConfig>> {
        self.namers.get(kind).copied()
    }

    pub fn storage(&self, kind: &str) -> Option<StorageEntry> {
        self.storage.get(kind).copied()
    }

    pub fn interface(&self, kind: &str) -> Option<Decoder<dyn InterfaceConfig>> {
        self.interfaces.get(kind).copied()
    }

    pub fn telemeter(&self, kind: &str) -> Option<Decoder<dyn TelemeterConfig>> {
        self.telemeters.get(kind).copied()
    }

    /// Registered kinds for `role`, sorted.
    pub fn kinds(&self, role: Role) -> Vec<&str> {
        match role {
            Role::Namer => self.namers.keys().map(String::as_str).collect(),
            Role::Storage => self.storage.keys().map(String::as_str).collect(),
            Role::Interface => self.interfaces.keys().map(String::as_str).collect(),
            Role::Telemeter => self.telemeters.keys().map(String::as_str).collect(),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("namers", &self.kinds(Role::Namer))
            .field("storage", &self.kinds(Role::Storage))
            .field("interfaces", &self.kinds(Role::Interface))
            .field("telemeters", &self.kinds(Role::Telemeter))
            .finish()
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install `registry` as the process-wide registry. Succeeds once.
pub fn install(registry: Registry) -> Result<&'static Registry, RegistryError> {
    GLOBAL
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    let installed = GLOBAL.get().ok_or(RegistryError::AlreadyInstalled)?;
    tracing::info!(registry = ?installed, "Plugin registry installed");
    Ok(installed)
}

/// The process-wide registry, if it has been installed.
pub fn global() -> Result<&'static Registry, ParseError> {
    GLOBAL.get().ok_or(ParseError::RegistryNotLoaded)
}
