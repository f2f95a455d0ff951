//! Telemetry subsystem.
//!
//! # Data Flow
//! ```text
//! telemetry[] section (or the built-in default)
//!     → TelemeterConfig::build() per entry
//!     → Telemeter { stats sink?, tracer? }
//!     → aggregate.rs merges the non-null halves
//!         → BroadcastStats  (fans out every counter/gauge/histogram)
//!         → BroadcastTracer (fans out every finished span)
//!     → global.rs installs both, once, before any other component is built
//!
//! Runtime:
//!     metrics::counter!(..)      → global recorder → BroadcastStats → sinks
//!     global::tracer().record(..) → BroadcastTracer → tracers
//! ```
//!
//! # Design Decisions
//! - A stats sink is any `metrics::Recorder`, so exporters plug in directly
//! - Globals are write-once; later installs are ignored with a warning
//! - Telemeters may contribute admin routes (metrics pages)

pub mod admin_metrics;
pub mod aggregate;
pub mod broadcast;
pub mod global;
pub mod prometheus;
pub mod trace;
pub mod tracelog;

use std::fmt;
use std::sync::Arc;

use axum::Router;

use crate::config::ComponentError;

pub use aggregate::{build_telemetry, Telemetry};
pub use broadcast::{BroadcastStats, BroadcastTracer};
pub use trace::{NullTracer, SpanRecord, Tracer};

/// A metrics sink: anything the `metrics` facade can record into.
pub type StatsSink = Arc<dyn metrics::Recorder + Send + Sync>;

/// A pluggable emitter of metrics and/or trace spans.
pub trait Telemeter: Send + Sync + fmt::Debug {
    fn kind(&self) -> &str;

    /// The metrics half, if this telemeter records metrics.
    fn stats(&self) -> Option<StatsSink>;

    /// The tracing half, if this telemeter records spans.
    fn tracer(&self) -> Option<Arc<dyn Tracer>>;

    /// Extra admin endpoints served by this telemeter.
    fn admin_routes(&self) -> Option<Router> {
        None
    }
}

/// Kind-specific telemeter parameters, decoded by the registry.
pub trait TelemeterConfig: Send + Sync + fmt::Debug {
    fn build(&self) -> Result<Arc<dyn Telemeter>, ComponentError>;
}
