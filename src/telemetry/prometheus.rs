//! Prometheus exposition telemeter.
//!
//! The recorder is never installed globally by itself; it is one constituent
//! of the broadcast stats sink and is scraped through the admin server.

use std::fmt;
use std::sync::Arc;

use axum::{http::header, response::IntoResponse, routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use serde::Deserialize;

use crate::config::ComponentError;
use crate::telemetry::{StatsSink, Telemeter, TelemeterConfig, Tracer};

/// Parameters for the `prometheus` telemeter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PrometheusConfig {
    /// Histogram bucket boundaries; summaries are exported when absent.
    pub buckets: Option<Vec<f64>>,
}

impl TelemeterConfig for PrometheusConfig {
    fn build(&self) -> Result<Arc<dyn Telemeter>, ComponentError> {
        let mut builder = PrometheusBuilder::new();
        if let Some(buckets) = &self.buckets {
            builder = builder
                .set_buckets(buckets)
                .map_err(|e| ComponentError::InvalidParam {
                    name: "buckets",
                    message: e.to_string(),
                })?;
        }
        let recorder = builder.build_recorder();
        let handle = recorder.handle();
        Ok(Arc::new(PrometheusTelemeter {
            recorder: Arc::new(recorder),
            handle,
        }))
    }
}

pub struct PrometheusTelemeter {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl fmt::Debug for PrometheusTelemeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrometheusTelemeter").finish_non_exhaustive()
    }
}

impl Telemeter for PrometheusTelemeter {
    fn kind(&self) -> &str {
        "prometheus"
    }

    fn stats(&self) -> Option<StatsSink> {
        Some(self.recorder.clone())
    }

    fn tracer(&self) -> Option<Arc<dyn Tracer>> {
        None
    }

    fn admin_routes(&self) -> Option<Router> {
        let handle = self.handle.clone();
        Some(Router::new().route(
            "/admin/metrics/prometheus",
            get(move || {
                let handle = handle.clone();
                async move {
                    (
                        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                        handle.render(),
                    )
                        .into_response()
                }
            }),
        ))
    }
}
