//! Namer subsystem.
//!
//! # Data Flow
//! ```text
//! namers[] section
//!     → registry decodes each entry into (prefix, Box<dyn NamerConfig>)
//!     → routing::prefix::check_prefixes (disjointness)
//!     → NamerConfig::build(prefix) for each entry
//!     → routing::NamerTable (prefix → namer)
//!
//! Lookup:
//!     full path → NamerTable picks governing prefix
//!     → Namer::lookup(residual)
//!     → Resolution (Bound | Neg)
//! ```
//!
//! # Design Decisions
//! - A namer only ever sees the part of the path below its prefix
//! - Lookups are synchronous and uncached

pub mod fixed;
pub mod fs;

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;

use crate::config::ComponentError;
use crate::routing::Path;

/// Result of asking a namer about a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Resolution {
    /// The name resolved to a set of addresses.
    Bound {
        /// Identifier of the bound name (prefix plus consumed segments).
        id: Path,
        addrs: Vec<SocketAddr>,
        /// Unconsumed remainder of the looked-up path.
        residual: Path,
    },
    /// The namer has no binding for the name.
    Neg,
}

/// Resolves names below a single prefix.
pub trait Namer: Send + Sync + fmt::Debug {
    fn lookup(&self, residual: &Path) -> Resolution;
}

/// Kind-specific namer parameters, decoded by the registry.
pub trait NamerConfig: Send + Sync + fmt::Debug {
    fn build(&self, prefix: &Path) -> Result<Arc<dyn Namer>, ComponentError>;
}
