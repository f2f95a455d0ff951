//! Configuration schema definitions.
//!
//! Two layers:
//! - [`RawDocument`]: the document split into its top-level sections, each
//!   still untyped. Structural validation runs here.
//! - [`Document`]: every polymorphic section resolved through the registry
//!   into a typed config for its role.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ConfigError;
use crate::interface::InterfaceConfig;
use crate::lifecycle::ServiceInstance;
use crate::namer::NamerConfig;
use crate::routing::{check_disjoint, Path};
use crate::storage::StorageConfig;
use crate::telemetry::TelemeterConfig;

/// Port the admin server listens on when the document does not say.
pub const DEFAULT_ADMIN_PORT: u16 = 9991;

/// The document split into sections, before any kind is resolved.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDocument {
    pub admin: Option<Value>,
    pub storage: Option<Value>,
    pub namers: Option<Vec<Value>>,
    pub interfaces: Option<Vec<Value>>,
    pub telemetry: Option<Vec<Value>>,
}

/// A fully decoded configuration document.
#[derive(Debug)]
pub struct Document {
    pub admin: Option<AdminConfig>,
    pub storage: StorageSpec,
    pub namers: Vec<NamerSpec>,
    pub interfaces: Vec<InterfaceSpec>,
    pub telemetry: Option<Vec<TelemeterSpec>>,
}

impl Document {
    /// Run every check that does not construct a component.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.storage.check_experimental()?;
        check_disjoint(self.namers.iter().map(|n| &n.prefix))
    }

    /// Build the running instance this document describes.
    pub fn compose(self) -> Result<ServiceInstance, ConfigError> {
        crate::lifecycle::startup::compose(self)
    }
}

#[derive(Debug)]
pub struct StorageSpec {
    pub kind: String,
    /// The document's opt-in flag.
    pub experimental: bool,
    /// Whether the registry marks this kind experimental.
    pub experimental_required: bool,
    pub config: Box<dyn StorageConfig>,
}

impl StorageSpec {
    pub fn check_experimental(&self) -> Result<(), ConfigError> {
        if self.experimental_required && !self.experimental {
            return Err(ConfigError::ExperimentalFeatureDisabled {
                kind: self.kind.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct NamerSpec {
    pub prefix: Path,
    pub kind: String,
    pub config: Box<dyn NamerConfig>,
}

#[derive(Debug)]
pub struct InterfaceSpec {
    pub kind: String,
    pub config: Box<dyn InterfaceConfig>,
}

#[derive(Debug)]
pub struct TelemeterSpec {
    pub kind: String,
    pub config: Box<dyn TelemeterConfig>,
}

/// Admin server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminConfig {
    /// Bind IP.
    pub ip: IpAddr,

    /// Bind port.
    pub port: u16,

    /// Bearer token required on every admin request, when set.
    pub api_key: Option<String>,
}

impl AdminConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_ADMIN_PORT,
            api_key: None,
        }
    }
}
