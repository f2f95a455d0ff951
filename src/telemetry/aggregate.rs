//! Telemetry aggregation.
//!
//! # Responsibilities
//! - Build every configured telemeter, or the single default one
//! - Merge their non-null stats sinks and tracers into broadcast sinks
//!
//! # Design Decisions
//! - An absent and an empty `telemetry` list both mean "use the default"
//! - Aggregation is pure; installing the result globally is a separate step

use std::sync::Arc;

use crate::config::{ConfigError, TelemeterSpec};
use crate::registry::builtin::DEFAULT_TELEMETER;
use crate::registry::Role;
use crate::telemetry::admin_metrics::AdminMetricsConfig;
use crate::telemetry::{BroadcastStats, BroadcastTracer, Telemeter, TelemeterConfig};

/// The telemeters of an instance and their merged sinks.
#[derive(Debug, Clone)]
pub struct Telemetry {
    pub telemeters: Vec<Arc<dyn Telemeter>>,
    pub stats: Arc<BroadcastStats>,
    pub tracer: Arc<BroadcastTracer>,
}

/// Build telemeters and merge their sinks.
pub fn build_telemetry(specs: Option<&[TelemeterSpec]>) -> Result<Telemetry, ConfigError> {
    let telemeters = match specs {
        Some(specs) if !specs.is_empty() => specs
            .iter()
            .map(|spec| {
                spec.config
                    .build()
                    .map_err(|e| ConfigError::component(Role::Telemeter, &spec.kind, e))
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            tracing::debug!(kind = DEFAULT_TELEMETER, "No telemeters configured, using default");
            let telemeter = AdminMetricsConfig::default()
                .build()
                .map_err(|e| ConfigError::component(Role::Telemeter, DEFAULT_TELEMETER, e))?;
            vec![telemeter]
        }
    };

    let stats = BroadcastStats::new(telemeters.iter().filter_map(|t| t.stats()).collect());
    let tracer = BroadcastTracer::new(telemeters.iter().filter_map(|t| t.tracer()).collect());

    Ok(Telemetry {
        telemeters,
        stats: Arc::new(stats),
        tracer: Arc::new(tracer),
    })
}
