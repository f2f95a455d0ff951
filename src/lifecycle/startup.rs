//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a decoded [`Document`] into a [`ServiceInstance`]
//! - Build components in dependency order, each with what it needs
//!
//! # Design Decisions
//! - Fail fast: any error is fatal and nothing partially built escapes
//! - The experimental storage gate runs before any factory
//! - Telemetry is built and installed before anything that might record
//! - Subsystems initialize in order, not concurrently
//! - Building never binds sockets; listeners start in `ServiceInstance::run`

use std::sync::Arc;
use std::time::Instant;

use crate::admin::AdminHandle;
use crate::config::{ConfigError, Document};
use crate::interface::InterfaceContext;
use crate::lifecycle::ServiceInstance;
use crate::observability::metrics;
use crate::registry::Role;
use crate::routing::check_prefixes;
use crate::telemetry::{build_telemetry, global};

/// Compose a running instance from `document`.
pub fn compose(document: Document) -> Result<ServiceInstance, ConfigError> {
    let started = Instant::now();
    let result = build(document);
    metrics::record_bootstrap(result.is_ok(), started);
    match &result {
        Ok(instance) => tracing::info!(
            namers = instance.namers().len(),
            interfaces = instance.interfaces().len(),
            telemeters = instance.telemeters().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Instance composed"
        ),
        Err(error) => tracing::error!(%error, "Composition failed"),
    }
    result
}

fn build(document: Document) -> Result<ServiceInstance, ConfigError> {
    let Document {
        admin,
        storage,
        namers,
        interfaces,
        telemetry,
    } = document;

    // 1. Experimental gate
    storage.check_experimental()?;

    // 2. Telemetry, installed process-wide before anything else is built
    let telemetry = build_telemetry(telemetry.as_deref())?;
    global::install(&telemetry.stats, &telemetry.tracer);
    for telemeter in &telemetry.telemeters {
        metrics::record_component(Role::Telemeter, telemeter.kind());
    }
    tracing::debug!(
        stats_sinks = telemetry.stats.len(),
        tracers = telemetry.tracer.len(),
        "Telemetry ready"
    );

    // 3. Storage
    let store = storage
        .config
        .build()
        .map_err(|e| ConfigError::component(Role::Storage, &storage.kind, e))?;
    metrics::record_component(Role::Storage, &storage.kind);
    tracing::debug!(kind = %storage.kind, "Dtab store ready");

    // 4. Namers
    let namers = Arc::new(check_prefixes(&namers)?);
    for (_, kind) in namers.prefixes() {
        metrics::record_component(Role::Namer, kind);
    }

    // 5. Interfaces
    let context = InterfaceContext {
        store: store.clone(),
        namers: namers.clone(),
        stats: telemetry.stats.clone(),
        tracer: telemetry.tracer.clone(),
    };
    let interfaces = interfaces
        .iter()
        .map(|spec| {
            let interface = spec
                .config
                .build(&context)
                .map_err(|e| ConfigError::component(Role::Interface, &spec.kind, e))?;
            metrics::record_component(Role::Interface, &spec.kind);
            tracing::debug!(kind = %spec.kind, addr = %interface.addr(), "Interface ready");
            Ok(interface)
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    // 6. Admin
    let admin = AdminHandle::new(
        admin.unwrap_or_default(),
        store.clone(),
        namers.clone(),
        telemetry.telemeters.clone(),
    );

    // 7. Assemble
    Ok(ServiceInstance::new(admin, telemetry, store, namers, interfaces))
}
