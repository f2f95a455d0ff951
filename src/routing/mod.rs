//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Namer compilation (at bootstrap):
//!     NamerSpec[] (prefix, kind, params)
//!     → prefix.rs (reject empty / overlapping prefixes)
//!     → build each namer
//!     → Freeze as immutable NamerTable
//!
//! Lookup (at runtime):
//!     Path
//!     → table.rs (find governing prefix)
//!     → Namer::lookup(residual)
//! ```
//!
//! # Design Decisions
//! - Namer prefixes partition the namespace: any path has at most one namer
//! - Deterministic: same input always reaches the same namer
//! - Segment-wise prefix matching only, no wildcards

pub mod path;
pub mod prefix;
pub mod table;

pub use path::{Path, PathError};
pub use prefix::{check_disjoint, check_prefixes};
pub use table::NamerTable;
