//! Telemeter that writes sampled spans to the process log.

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ComponentError;
use crate::telemetry::{SpanRecord, StatsSink, Telemeter, TelemeterConfig, Tracer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanLevel {
    Trace,
    Debug,
    #[default]
    Info,
}

/// Parameters for the `tracelog` telemeter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TracelogConfig {
    /// Fraction of spans logged, in `[0, 1]`.
    pub sample_rate: f64,
    pub level: SpanLevel,
}

impl Default for TracelogConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1.0,
            level: SpanLevel::Info,
        }
    }
}

impl TelemeterConfig for TracelogConfig {
    fn build(&self) -> Result<Arc<dyn Telemeter>, ComponentError> {
        if !(0.0..=1.0).contains(&self.sample_rate) {
            return Err(ComponentError::InvalidParam {
                name: "sampleRate",
                message: format!("{} is outside [0, 1]", self.sample_rate),
            });
        }
        Ok(Arc::new(TracelogTelemeter {
            tracer: Arc::new(LogTracer {
                sample_rate: self.sample_rate,
                level: self.level,
            }),
        }))
    }
}

#[derive(Debug)]
pub struct TracelogTelemeter {
    tracer: Arc<LogTracer>,
}

impl Telemeter for TracelogTelemeter {
    fn kind(&self) -> &str {
        "tracelog"
    }

    fn stats(&self) -> Option<StatsSink> {
        None
    }

    fn tracer(&self) -> Option<Arc<dyn Tracer>> {
        Some(self.tracer.clone())
    }
}

#[derive(Debug)]
pub struct LogTracer {
    sample_rate: f64,
    level: SpanLevel,
}

impl LogTracer {
    fn sampled(&self) -> bool {
        self.sample_rate >= 1.0 || fastrand::f64() < self.sample_rate
    }
}

impl Tracer for LogTracer {
    fn record(&self, span: &SpanRecord) {
        if !self.sampled() {
            return;
        }
        let trace_id = format!("{:016x}", span.trace_id);
        let span_id = format!("{:016x}", span.span_id);
        let duration_us = span.duration.as_micros() as u64;
        let tags = format!("{:?}", span.tags);
        match self.level {
            SpanLevel::Trace => {
                tracing::trace!(%trace_id, %span_id, name = %span.name, duration_us, %tags, "span")
            }
            SpanLevel::Debug => {
                tracing::debug!(%trace_id, %span_id, name = %span.name, duration_us, %tags, "span")
            }
            SpanLevel::Info => {
                tracing::info!(%trace_id, %span_id, name = %span.name, duration_us, %tags, "span")
            }
        }
    }
}
