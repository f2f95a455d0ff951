//! namerd library: configuration validation and component composition for a
//! name resolution control plane.

pub mod admin;
pub mod config;
pub mod interface;
pub mod lifecycle;
pub mod namer;
pub mod observability;
pub mod registry;
pub mod routing;
pub mod storage;
pub mod telemetry;

pub use config::{ConfigError, Document};
pub use lifecycle::{compose, ServiceInstance, Shutdown};
pub use registry::Registry;
