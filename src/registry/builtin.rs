//! Compiled-in component kinds.

use crate::interface::http::HttpControllerConfig;
use crate::namer::fixed::FixedConfig;
use crate::namer::fs::FsConfig;
use crate::registry::RegistryEntry;
use crate::storage::file::FileStoreConfig;
use crate::storage::memory::InMemoryConfig;
use crate::telemetry::admin_metrics::AdminMetricsConfig;
use crate::telemetry::prometheus::PrometheusConfig;
use crate::telemetry::tracelog::TracelogConfig;

/// Kind used when a document configures no telemeters.
pub const DEFAULT_TELEMETER: &str = "adminMetricsExport";

/// Every component kind shipped with this crate.
pub fn builtin() -> Vec<RegistryEntry> {
    vec![
        RegistryEntry::storage::<InMemoryConfig>("inMemory"),
        RegistryEntry::experimental_storage::<FileStoreConfig>("fs"),
        RegistryEntry::namer::<FixedConfig>("fixed"),
        RegistryEntry::namer::<FsConfig>("fs"),
        RegistryEntry::interface::<HttpControllerConfig>("http"),
        RegistryEntry::telemeter::<AdminMetricsConfig>(DEFAULT_TELEMETER),
        RegistryEntry::telemeter::<PrometheusConfig>("prometheus"),
        RegistryEntry::telemeter::<TracelogConfig>("tracelog"),
    ]
}
