//! Default telemeter: in-process metrics served as JSON on the admin port.
//!
//! # Metrics
//! - counters: monotonically increasing `u64`
//! - gauges: last written `f64`
//! - histograms: count/sum/min/max summary (no buckets)
//!
//! # Design Decisions
//! - Metric identity is `name{label=value,...}` in label declaration order
//! - Cells are atomics behind a `DashMap`, so recording never takes a global lock

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{routing::get, Json, Router};
use dashmap::DashMap;
use metrics::{
    Counter, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ComponentError;
use crate::registry::builtin::DEFAULT_TELEMETER;
use crate::telemetry::{StatsSink, Telemeter, TelemeterConfig, Tracer};

/// Parameters for the `adminMetricsExport` telemeter (none).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminMetricsConfig {}

impl TelemeterConfig for AdminMetricsConfig {
    fn build(&self) -> Result<Arc<dyn Telemeter>, ComponentError> {
        Ok(Arc::new(AdminMetricsTelemeter::default()))
    }
}

#[derive(Debug, Default)]
pub struct AdminMetricsTelemeter {
    metrics: Arc<AdminMetrics>,
}

impl Telemeter for AdminMetricsTelemeter {
    fn kind(&self) -> &str {
        DEFAULT_TELEMETER
    }

    fn stats(&self) -> Option<StatsSink> {
        Some(self.metrics.clone())
    }

    fn tracer(&self) -> Option<Arc<dyn Tracer>> {
        None
    }

    fn admin_routes(&self) -> Option<Router> {
        let metrics = self.metrics.clone();
        Some(Router::new().route(
            "/admin/metrics.json",
            get(move || {
                let metrics = metrics.clone();
                async move { Json(metrics.snapshot()) }
            }),
        ))
    }
}

#[derive(Debug, Default)]
struct SummaryState {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

#[derive(Debug, Default)]
struct Summary(Mutex<SummaryState>);

impl HistogramFn for Summary {
    fn record(&self, value: f64) {
        let mut state = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.count == 0 {
            state.min = value;
            state.max = value;
        } else {
            state.min = state.min.min(value);
            state.max = state.max.max(value);
        }
        state.count += 1;
        state.sum += value;
    }
}

/// In-process metric store and `metrics::Recorder`.
#[derive(Debug, Default)]
pub struct AdminMetrics {
    counters: DashMap<String, Arc<AtomicU64>>,
    gauges: DashMap<String, Arc<AtomicU64>>,
    histograms: DashMap<String, Arc<Summary>>,
}

fn identity(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl AdminMetrics {
    pub fn counter_value(&self, id: &str) -> Option<u64> {
        self.counters.get(id).map(|c| c.load(Ordering::Relaxed))
    }

    pub fn gauge_value(&self, id: &str) -> Option<f64> {
        self.gauges.get(id).map(|g| f64::from_bits(g.load(Ordering::Relaxed)))
    }

    /// All metrics as a JSON object keyed by metric identity.
    pub fn snapshot(&self) -> Value {
        let mut out = BTreeMap::new();
        for entry in self.counters.iter() {
            out.insert(entry.key().clone(), json!(entry.value().load(Ordering::Relaxed)));
        }
        for entry in self.gauges.iter() {
            let value = f64::from_bits(entry.value().load(Ordering::Relaxed));
            out.insert(entry.key().clone(), json!(value));
        }
        for entry in self.histograms.iter() {
            let state = entry.value().0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            out.insert(
                entry.key().clone(),
                json!({
                    "count": state.count,
                    "sum": state.sum,
                    "min": state.min,
                    "max": state.max,
                }),
            );
        }
        json!(out)
    }
}

impl Recorder for AdminMetrics {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let cell = self.counters.entry(identity(key)).or_default().clone();
        Counter::from_arc(cell)
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        let cell = self.gauges.entry(identity(key)).or_default().clone();
        Gauge::from_arc(cell)
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        let cell = self.histograms.entry(identity(key)).or_default().clone();
        Histogram::from_arc(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use metrics::{Label, Level};
    use tower::ServiceExt;

    fn meta() -> Metadata<'static> {
        Metadata::new("test", Level::INFO, None)
    }

    #[test]
    fn test_identity_includes_labels() {
        let key = Key::from_parts("requests", vec![Label::new("route", "dtabs"), Label::new("status", "200")]);
        assert_eq!(identity(&key), "requests{route=dtabs,status=200}");
        assert_eq!(identity(&Key::from_name("up")), "up");
    }

    #[test]
    fn test_records_counters_gauges_histograms() {
        let metrics = AdminMetrics::default();
        metrics.register_counter(&Key::from_name("c"), &meta()).increment(2);
        metrics.register_counter(&Key::from_name("c"), &meta()).increment(3);
        metrics.register_gauge(&Key::from_name("g"), &meta()).set(1.5);
        let h = metrics.register_histogram(&Key::from_name("h"), &meta());
        h.record(2.0);
        h.record(4.0);

        assert_eq!(metrics.counter_value("c"), Some(5));
        assert_eq!(metrics.gauge_value("g"), Some(1.5));
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot["h"]["count"], 2);
        assert_eq!(snapshot["h"]["min"], 2.0);
        assert_eq!(snapshot["h"]["max"], 4.0);
    }

    #[tokio::test]
    async fn test_metrics_json_route() {
        let telemeter = AdminMetricsTelemeter::default();
        telemeter
            .stats()
            .unwrap()
            .register_counter(&Key::from_name("namerd_test_total"), &meta())
            .increment(1);

        let router = telemeter.admin_routes().unwrap();
        let response = router
            .oneshot(Request::get("/admin/metrics.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["namerd_test_total"], 1);
    }
}
