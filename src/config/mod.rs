//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (parse into sections)
//!     → validation.rs (structural checks, before any kind is resolved)
//!     → loader.rs (resolve kinds through the registry)
//!     → Document (typed, immutable)
//!     → Document::compose → ServiceInstance
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - Plugin params are strict: unknown keys are rejected
//! - The first violation aborts; there are no warnings-only checks

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ComponentError, ConfigError, ParseError};
pub use loader::{load, load_config, load_config_with, parse, Format};
pub use schema::{
    AdminConfig, Document, InterfaceSpec, NamerSpec, RawDocument, StorageSpec, TelemeterSpec,
};
pub use validation::validate;
