//! HTTP control interface.
//!
//! # Responsibilities
//! - Dtab CRUD over the shared store
//! - Name resolution through the namer table
//! - Per-request metrics and spans on the instance's broadcast sinks
//!
//! # Endpoints
//! - `GET    /api/1/dtabs`              namespaces, sorted
//! - `GET    /api/1/dtabs/{namespace}`  `{dtab, version}`, version also in `ETag`
//! - `POST   /api/1/dtabs/{namespace}`  create (409 if present)
//! - `PUT    /api/1/dtabs/{namespace}`  replace; with `If-Match: <version>` only
//!   if the stored version matches (412 otherwise)
//! - `DELETE /api/1/dtabs/{namespace}`  remove
//! - `GET    /api/1/resolve?path=/a/b`  `{prefix, resolution}`
//!
//! # Design Decisions
//! - Request bodies are the raw dtab text; responses are JSON
//! - Errors carry a JSON `{error}` body and a status derived from the store error

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{self, MatchedPath, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ComponentError;
use crate::interface::{shutdown_signal, InterfaceConfig, InterfaceContext, ServeFuture, Servable};
use crate::namer::Resolution;
use crate::routing::{NamerTable, Path};
use crate::storage::{DtabStore, StoreError};
use crate::telemetry::{BroadcastStats, BroadcastTracer, SpanRecord, Tracer};

/// Port the controller listens on when the document does not say.
pub const DEFAULT_PORT: u16 = 4180;

pub const REQUESTS: &str = "namerd_http_requests_total";
pub const REQUEST_DURATION: &str = "namerd_http_request_duration_seconds";

/// Parameters for the `http` interface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct HttpControllerConfig {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for HttpControllerConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl InterfaceConfig for HttpControllerConfig {
    fn build(&self, context: &InterfaceContext) -> Result<Arc<dyn Servable>, ComponentError> {
        Ok(Arc::new(HttpController::new(
            SocketAddr::new(self.ip, self.port),
            context,
        )))
    }
}

#[derive(Debug, Clone)]
struct ApiState {
    store: Arc<dyn DtabStore>,
    namers: Arc<NamerTable>,
    stats: Arc<BroadcastStats>,
    tracer: Arc<BroadcastTracer>,
}

#[derive(Debug)]
pub struct HttpController {
    addr: SocketAddr,
    state: ApiState,
}

impl HttpController {
    pub fn new(addr: SocketAddr, context: &InterfaceContext) -> Self {
        Self {
            addr,
            state: ApiState {
                store: context.store.clone(),
                namers: context.namers.clone(),
                stats: context.stats.clone(),
                tracer: context.tracer.clone(),
            },
        }
    }

    /// The controller's routes, with metrics and request tracing applied.
    pub fn router(&self) -> Router {
        let state = self.state.clone();
        Router::new()
            .route("/api/1/dtabs", get(list_dtabs))
            .route(
                "/api/1/dtabs/{namespace}",
                get(get_dtab)
                    .post(create_dtab)
                    .put(put_dtab)
                    .delete(delete_dtab),
            )
            .route("/api/1/resolve", get(resolve))
            .route_layer(middleware::from_fn_with_state(state.clone(), observe))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }
}

impl Servable for HttpController {
    fn kind(&self) -> &str {
        "http"
    }

    fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn serve(&self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> ServeFuture {
        let app = self.router();
        Box::pin(async move {
            let addr = listener.local_addr()?;
            tracing::info!(address = %addr, "HTTP controller listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal(shutdown))
                .await?;
            tracing::info!(address = %addr, "HTTP controller stopped");
            Ok(())
        })
    }
}

/// Record a counter, a latency histogram and a span for every routed request.
///
/// Attached with `route_layer`, so it only sees requests that matched a route.
async fn observe(
    State(state): State<ApiState>,
    matched: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = matched.as_str().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    state
        .stats
        .counter(
            REQUESTS,
            &[
                ("route", route.clone()),
                ("method", method.clone()),
                ("status", status.clone()),
            ],
        )
        .increment(1);
    state
        .stats
        .histogram(REQUEST_DURATION, &[("route", route.clone())])
        .record(started.elapsed().as_secs_f64());
    state.tracer.record(
        &SpanRecord::root(format!("{method} {route}"), started).with_tag("http.status_code", status),
    );
    response
}

#[derive(Debug, Error)]
enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::VersionMismatch { .. }) => StatusCode::PRECONDITION_FAILED,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Dtab store failure");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn list_dtabs(State(state): State<ApiState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.store.list()?))
}

async fn get_dtab(
    State(state): State<ApiState>,
    extract::Path(namespace): extract::Path<String>,
) -> Result<Response, ApiError> {
    let dtab = state
        .store
        .get(&namespace)?
        .ok_or(StoreError::NotFound(namespace))?;
    Ok(([(header::ETAG, dtab.version.to_string())], Json(dtab)).into_response())
}

async fn create_dtab(
    State(state): State<ApiState>,
    extract::Path(namespace): extract::Path<String>,
    body: String,
) -> Result<StatusCode, ApiError> {
    state.store.create(&namespace, &body)?;
    tracing::info!(namespace = %namespace, "Dtab created");
    Ok(StatusCode::CREATED)
}

async fn put_dtab(
    State(state): State<ApiState>,
    extract::Path(namespace): extract::Path<String>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, ApiError> {
    match if_match(&headers)? {
        Some(version) => state.store.update(&namespace, &body, version)?,
        None => state.store.put(&namespace, &body)?,
    }
    tracing::info!(namespace = %namespace, "Dtab updated");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_dtab(
    State(state): State<ApiState>,
    extract::Path(namespace): extract::Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&namespace)?;
    tracing::info!(namespace = %namespace, "Dtab deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Expected version from `If-Match`, quoted or bare.
fn if_match(headers: &HeaderMap) -> Result<Option<u64>, ApiError> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .map(|v| v.trim().trim_matches('"'))
        .and_then(|v| v.parse().ok())
        .map(Some)
        .ok_or_else(|| ApiError::BadRequest("If-Match must be a dtab version".to_string()))
}

#[derive(Debug, Deserialize)]
struct ResolveQuery {
    path: String,
}

#[derive(Debug, Serialize)]
struct ResolveResponse {
    /// Prefix of the governing namer, if any.
    prefix: Option<Path>,
    resolution: Resolution,
}

async fn resolve(
    State(state): State<ApiState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let path: Path = query
        .path
        .parse()
        .map_err(|e: crate::routing::PathError| ApiError::BadRequest(e.to_string()))?;
    let response = match state.namers.resolve(&path) {
        Some((prefix, resolution)) => ResolveResponse {
            prefix: Some(prefix.clone()),
            resolution,
        },
        None => ResolveResponse {
            prefix: None,
            resolution: Resolution::Neg,
        },
    };
    Ok(Json(response))
}
