//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (named counters and gauges via the `metrics` facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → the broadcast stats sink installed at bootstrap, which fans out to
//!       every configured telemeter
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metric names live in one place so exporters see a stable schema
//! - Metric updates before bootstrap are dropped, not buffered

pub mod logging;
pub mod metrics;
