//! Process-wide broadcast sinks.
//!
//! # Responsibilities
//! - Hold the stats and trace broadcast sinks chosen at bootstrap
//! - Register the stats sink as the `metrics` crate's global recorder
//! - Give runtime code without an explicit sink a place to read them from
//!
//! # Design Decisions
//! - Single assignment: the first install wins for the process lifetime
//! - No locking on the read path (`OnceLock`)
//! - Before install, `tracer()` is a null tracer and `metrics` macros are no-ops

use std::sync::{Arc, OnceLock};

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};

use crate::telemetry::{BroadcastStats, BroadcastTracer, NullTracer, Tracer};

struct Globals {
    stats: Arc<BroadcastStats>,
    tracer: Arc<BroadcastTracer>,
}

static GLOBALS: OnceLock<Globals> = OnceLock::new();

/// Owned handle the `metrics` facade can hold for the process lifetime.
struct GlobalStats(Arc<BroadcastStats>);

impl Recorder for GlobalStats {
    fn describe_counter(&self, key: KeyName, unit: Option<Unit>, description: SharedString) {
        self.0.describe_counter(key, unit, description)
    }

    fn describe_gauge(&self, key: KeyName, unit: Option<Unit>, description: SharedString) {
        self.0.describe_gauge(key, unit, description)
    }

    fn describe_histogram(&self, key: KeyName, unit: Option<Unit>, description: SharedString) {
        self.0.describe_histogram(key, unit, description)
    }

    fn register_counter(&self, key: &Key, metadata: &Metadata<'_>) -> Counter {
        self.0.register_counter(key, metadata)
    }

    fn register_gauge(&self, key: &Key, metadata: &Metadata<'_>) -> Gauge {
        self.0.register_gauge(key, metadata)
    }

    fn register_histogram(&self, key: &Key, metadata: &Metadata<'_>) -> Histogram {
        self.0.register_histogram(key, metadata)
    }
}

/// Install the broadcast sinks as process-wide defaults.
///
/// Returns `true` if this call performed the installation. Later calls leave
/// the existing sinks in place and return `false`.
pub fn install(stats: &Arc<BroadcastStats>, tracer: &Arc<BroadcastTracer>) -> bool {
    let mut installed = false;
    GLOBALS.get_or_init(|| {
        installed = true;
        Globals {
            stats: stats.clone(),
            tracer: tracer.clone(),
        }
    });

    if !installed {
        tracing::warn!("Telemetry sinks already installed; keeping the first set");
        return false;
    }

    if metrics::set_global_recorder(GlobalStats(stats.clone())).is_err() {
        tracing::warn!("A metrics recorder was installed outside bootstrap; facade metrics bypass telemeters");
    }
    tracing::info!(
        stats_sinks = stats.len(),
        tracers = tracer.len(),
        "Installed process-wide telemetry sinks"
    );
    true
}

pub fn is_installed() -> bool {
    GLOBALS.get().is_some()
}

/// The installed stats broadcast, if bootstrap has run.
pub fn stats() -> Option<Arc<BroadcastStats>> {
    GLOBALS.get().map(|g| g.stats.clone())
}

/// The installed tracer, or a null tracer before bootstrap.
pub fn tracer() -> Arc<dyn Tracer> {
    match GLOBALS.get() {
        Some(globals) => globals.tracer.clone(),
        None => Arc::new(NullTracer),
    }
}
