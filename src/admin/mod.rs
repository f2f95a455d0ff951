//! Admin surface.
//!
//! # Responsibilities
//! - Expose instance state: status, namers, dtabs, telemeters
//! - Host the admin pages contributed by telemeters (metrics exports)
//! - Guard everything with a bearer token when `apiKey` is configured

pub mod auth;
pub mod handlers;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::AdminConfig;
use crate::interface::shutdown_signal;
use crate::routing::NamerTable;
use crate::storage::DtabStore;
use crate::telemetry::Telemeter;

#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<dyn DtabStore>,
    pub namers: Arc<NamerTable>,
    pub telemeters: Vec<Arc<dyn Telemeter>>,
    pub started: Instant,
}

/// The admin server of a composed instance.
pub struct AdminHandle {
    config: AdminConfig,
    state: AdminState,
}

impl AdminHandle {
    pub fn new(
        config: AdminConfig,
        store: Arc<dyn DtabStore>,
        namers: Arc<NamerTable>,
        telemeters: Vec<Arc<dyn Telemeter>>,
    ) -> Self {
        Self {
            config,
            state: AdminState {
                store,
                namers,
                telemeters,
                started: Instant::now(),
            },
        }
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub fn addr(&self) -> SocketAddr {
        self.config.addr()
    }

    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/admin/status", get(get_status))
            .route("/admin/namers", get(get_namers))
            .route("/admin/dtabs", get(get_dtabs))
            .route("/admin/telemeters", get(get_telemeters))
            .with_state(self.state.clone());

        for telemeter in &self.state.telemeters {
            if let Some(routes) = telemeter.admin_routes() {
                router = router.merge(routes);
            }
        }

        match &self.config.api_key {
            Some(key) => router.layer(middleware::from_fn_with_state(
                Arc::<str>::from(key.as_str()),
                admin_auth_middleware,
            )),
            None => router,
        }
    }

    /// Serve the admin router on `listener` until `shutdown` fires.
    pub async fn serve(&self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, auth = self.config.api_key.is_some(), "Admin server listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;
        tracing::info!(address = %addr, "Admin server stopped");
        Ok(())
    }
}

impl std::fmt::Debug for AdminHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminHandle")
            .field("addr", &self.addr())
            .field("auth", &self.config.api_key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryStore;
    use crate::telemetry::admin_metrics::AdminMetricsConfig;
    use crate::telemetry::TelemeterConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn handle(api_key: Option<&str>) -> AdminHandle {
        let store = Arc::new(InMemoryStore::default());
        store.put("default", "/svc=>/#/fixed").unwrap();
        AdminHandle::new(
            AdminConfig {
                api_key: api_key.map(str::to_string),
                ..Default::default()
            },
            store,
            Arc::new(NamerTable::default()),
            vec![AdminMetricsConfig::default().build().unwrap()],
        )
    }

    async fn get_json(router: Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = router.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_status_and_dtabs() {
        let router = handle(None).router();
        let (status, body) = get_json(router.clone(), "/admin/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "operational");

        let (_, body) = get_json(router.clone(), "/admin/dtabs", None).await;
        assert_eq!(body["default"]["version"], 1);

        let (_, body) = get_json(router, "/admin/telemeters", None).await;
        assert_eq!(body[0]["kind"], "adminMetricsExport");
        assert_eq!(body[0]["stats"], true);
    }

    #[tokio::test]
    async fn test_telemeter_routes_are_merged() {
        let (status, body) = get_json(handle(None).router(), "/admin/metrics.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_object());
    }

    #[tokio::test]
    async fn test_api_key_required() {
        let router = handle(Some("s3cret")).router();
        let (status, _) = get_json(router.clone(), "/admin/status", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get_json(router.clone(), "/admin/status", Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get_json(router.clone(), "/admin/metrics.json", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get_json(router, "/admin/status", Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
