//! Metric names and recording helpers.
//!
//! # Metrics
//! - `namerd_dtab_namespaces` (gauge): namespaces held, by store kind
//! - `namerd_bootstrap_components_total` (counter): components built, by role and kind
//! - `namerd_bootstrap_total` (counter): composition attempts, by outcome
//! - `namerd_bootstrap_duration_seconds` (histogram): time to compose an instance
//!
//! Request metrics for the control API are recorded by the interface itself,
//! on the broadcast sink it was built with.
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade, so they reach every telemeter once
//!   the broadcast sink is installed
//! - Labels are low-cardinality: kinds and roles, never namespaces or paths

use std::time::Instant;

use crate::registry::Role;

pub const DTAB_NAMESPACES: &str = "namerd_dtab_namespaces";
pub const BOOTSTRAP_COMPONENTS: &str = "namerd_bootstrap_components_total";
pub const BOOTSTRAP_TOTAL: &str = "namerd_bootstrap_total";
pub const BOOTSTRAP_DURATION: &str = "namerd_bootstrap_duration_seconds";

/// Record how many namespaces a store currently holds.
pub fn record_namespaces(store: &'static str, count: usize) {
    ::metrics::gauge!(DTAB_NAMESPACES, "store" => store).set(count as f64);
}

/// Record a component built during composition.
pub fn record_component(role: Role, kind: &str) {
    ::metrics::counter!(
        BOOTSTRAP_COMPONENTS,
        "role" => role.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record the end of a composition attempt.
pub fn record_bootstrap(success: bool, started: Instant) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!(BOOTSTRAP_TOTAL, "outcome" => outcome).increment(1);
    ::metrics::histogram!(BOOTSTRAP_DURATION).record(started.elapsed().as_secs_f64());
}
