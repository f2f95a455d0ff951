//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Document → experimental gate → telemetry (+ global install)
//!     → storage → namers → interfaces → admin → ServiceInstance
//!
//! Running (instance.rs):
//!     bind admin + every interface → serve until shutdown
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → servers drain and return
//! ```
//!
//! # Design Decisions
//! - Ordered startup: telemetry first, then core, then surfaces
//! - All-or-nothing: a failed startup leaves nothing running
//! - Listeners bind only when the instance runs

pub mod instance;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use instance::ServiceInstance;
pub use shutdown::Shutdown;
pub use startup::compose;
