//! Fan-out sinks.
//!
//! # Responsibilities
//! - Present many stats sinks as one `metrics::Recorder`
//! - Present many tracers as one `Tracer`
//!
//! # Design Decisions
//! - Handles are registered on every constituent once, at registration time;
//!   recording is then a loop over pre-resolved handles
//! - Zero constituents yields no-op handles, one constituent is passed through

use std::fmt;
use std::sync::Arc;

use metrics::{
    Counter, CounterFn, Gauge, GaugeFn, Histogram, HistogramFn, Key, KeyName, Label, Level, Metadata,
    Recorder, SharedString, Unit,
};

use crate::telemetry::{SpanRecord, StatsSink, Tracer};

/// Fans every metric out to all constituent sinks.
#[derive(Default, Clone)]
pub struct BroadcastStats {
    sinks: Vec<StatsSink>,
}

impl BroadcastStats {
    pub fn new(sinks: Vec<StatsSink>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// True if `sink` (the same allocation) is one of the constituents.
    pub fn contains(&self, sink: &StatsSink) -> bool {
        self.sinks.iter().any(|s| Arc::ptr_eq(s, sink))
    }

    /// Register a counter on every sink.
    pub fn counter(&self, name: &'static str, labels: &[(&'static str, String)]) -> Counter {
        self.register_counter(&key(name, labels), &metadata())
    }

    /// Register a histogram on every sink.
    pub fn histogram(&self, name: &'static str, labels: &[(&'static str, String)]) -> Histogram {
        self.register_histogram(&key(name, labels), &metadata())
    }
}

fn key(name: &'static str, labels: &[(&'static str, String)]) -> Key {
    let labels: Vec<Label> = labels
        .iter()
        .map(|(k, v)| Label::new(*k, v.clone()))
        .collect();
    Key::from_parts(name, labels)
}

fn metadata() -> Metadata<'static> {
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()))
}

impl fmt::Debug for BroadcastStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastStats").field("sinks", &self.sinks.len()).finish()
    }
}

struct FanoutCounter(Vec<Counter>);

impl CounterFn for FanoutCounter {
    fn increment(&self, value: u64) {
        for counter in &self.0 {
            counter.increment(value);
        }
    }

    fn absolute(&self, value: u64) {
        for counter in &self.0 {
            counter.absolute(value);
        }
    }
}

struct FanoutGauge(Vec<Gauge>);

impl GaugeFn for FanoutGauge {
    fn increment(&self, value: f64) {
        for gauge in &self.0 {
            gauge.increment(value);
        }
    }

    fn decrement(&self, value: f64) {
        for gauge in &self.0 {
            gauge.decrement(value);
        }
    }

    fn set(&self, value: f64) {
        for gauge in &self.0 {
            gauge.set(value);
        }
    }
}

struct FanoutHistogram(Vec<Histogram>);

impl HistogramFn for FanoutHistogram {
    fn record(&self, value: f64) {
        for histogram in &self.0 {
            histogram.record(value);
        }
    }
}

impl Recorder for BroadcastStats {
    fn describe_counter(&self, key: KeyName, unit: Option<Unit>, description: SharedString) {
        for sink in &self.sinks {
            sink.describe_counter(key.clone(), unit, description.clone());
        }
    }

    fn describe_gauge(&self, key: KeyName, unit: Option<Unit>, description: SharedString) {
        for sink in &self.sinks {
            sink.describe_gauge(key.clone(), unit, description.clone());
        }
    }

    fn describe_histogram(&self, key: KeyName, unit: Option<Unit>, description: SharedString) {
        for sink in &self.sinks {
            sink.describe_histogram(key.clone(), unit, description.clone());
        }
    }

    fn register_counter(&self, key: &Key, metadata: &Metadata<'_>) -> Counter {
        let mut counters: Vec<Counter> = self
            .sinks
            .iter()
            .map(|s| s.register_counter(key, metadata))
            .collect();
        match counters.len() {
            0 => Counter::noop(),
            1 => counters.remove(0),
            _ => Counter::from_arc(Arc::new(FanoutCounter(counters))),
        }
    }

    fn register_gauge(&self, key: &Key, metadata: &Metadata<'_>) -> Gauge {
        let mut gauges: Vec<Gauge> = self
            .sinks
            .iter()
            .map(|s| s.register_gauge(key, metadata))
            .collect();
        match gauges.len() {
            0 => Gauge::noop(),
            1 => gauges.remove(0),
            _ => Gauge::from_arc(Arc::new(FanoutGauge(gauges))),
        }
    }

    fn register_histogram(&self, key: &Key, metadata: &Metadata<'_>) -> Histogram {
        let mut histograms: Vec<Histogram> = self
            .sinks
            .iter()
            .map(|s| s.register_histogram(key, metadata))
            .collect();
        match histograms.len() {
            0 => Histogram::noop(),
            1 => histograms.remove(0),
            _ => Histogram::from_arc(Arc::new(FanoutHistogram(histograms))),
        }
    }
}

/// Fans every finished span out to all constituent tracers.
#[derive(Default, Clone)]
pub struct BroadcastTracer {
    tracers: Vec<Arc<dyn Tracer>>,
}

impl BroadcastTracer {
    pub fn new(tracers: Vec<Arc<dyn Tracer>>) -> Self {
        Self { tracers }
    }

    pub fn len(&self) -> usize {
        self.tracers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracers.is_empty()
    }

    pub fn contains(&self, tracer: &Arc<dyn Tracer>) -> bool {
        self.tracers.iter().any(|t| Arc::ptr_eq(t, tracer))
    }
}

impl fmt::Debug for BroadcastTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastTracer").field("tracers", &self.tracers.len()).finish()
    }
}

impl Tracer for BroadcastTracer {
    fn record(&self, span: &SpanRecord) {
        for tracer in &self.tracers {
            tracer.record(span);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    use crate::telemetry::admin_metrics::AdminMetrics;

    #[derive(Debug, Default)]
    struct Collect(Mutex<Vec<String>>);

    impl Tracer for Collect {
        fn record(&self, span: &SpanRecord) {
            self.0.lock().unwrap().push(span.name.clone());
        }
    }

    #[test]
    fn test_counter_reaches_every_sink() {
        let a = Arc::new(AdminMetrics::default());
        let b = Arc::new(AdminMetrics::default());
        let stats = BroadcastStats::new(vec![a.clone() as StatsSink, b.clone() as StatsSink]);

        stats.counter("requests", &[("route", "dtabs".to_string())]).increment(3);
        stats.counter("requests", &[("route", "dtabs".to_string())]).increment(1);

        assert_eq!(a.counter_value("requests{route=dtabs}"), Some(4));
        assert_eq!(b.counter_value("requests{route=dtabs}"), Some(4));
    }

    #[test]
    fn test_gauge_and_histogram_fan_out() {
        let a = Arc::new(AdminMetrics::default());
        let b = Arc::new(AdminMetrics::default());
        let stats = BroadcastStats::new(vec![a.clone() as StatsSink, b.clone() as StatsSink]);

        let gauge = stats.register_gauge(&Key::from_name("namespaces"), &metadata());
        gauge.set(5.0);
        gauge.decrement(2.0);
        stats.histogram("latency", &[]).record(0.25);

        for sink in [&a, &b] {
            assert_eq!(sink.gauge_value("namespaces"), Some(3.0));
            let snapshot = sink.snapshot();
            assert_eq!(snapshot["latency"]["count"], 1);
        }
    }

    #[test]
    fn test_empty_broadcast_is_noop() {
        let stats = BroadcastStats::default();
        stats.counter("ignored", &[]).increment(1);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_contains_is_identity() {
        let a: StatsSink = Arc::new(AdminMetrics::default());
        let other: StatsSink = Arc::new(AdminMetrics::default());
        let stats = BroadcastStats::new(vec![a.clone()]);
        assert!(stats.contains(&a));
        assert!(!stats.contains(&other));
    }

    #[test]
    fn test_tracer_fan_out() {
        let a = Arc::new(Collect::default());
        let b = Arc::new(Collect::default());
        let tracer = BroadcastTracer::new(vec![a.clone() as Arc<dyn Tracer>, b.clone() as Arc<dyn Tracer>]);
        tracer.record(&SpanRecord::root("bootstrap", Instant::now()));
        assert_eq!(a.0.lock().unwrap().as_slice(), ["bootstrap".to_string()]);
        assert_eq!(b.0.lock().unwrap().len(), 1);
    }
}
