use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::storage::VersionedDtab;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct NamerStatus {
    pub prefix: String,
    pub kind: String,
}

#[derive(Serialize)]
pub struct TelemeterStatus {
    pub kind: String,
    pub stats: bool,
    pub tracer: bool,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

pub async fn get_namers(State(state): State<AdminState>) -> Json<Vec<NamerStatus>> {
    Json(
        state
            .namers
            .prefixes()
            .map(|(prefix, kind)| NamerStatus {
                prefix: prefix.to_string(),
                kind: kind.to_string(),
            })
            .collect(),
    )
}

pub async fn get_dtabs(
    State(state): State<AdminState>,
) -> Result<Json<BTreeMap<String, VersionedDtab>>, (axum::http::StatusCode, String)> {
    let internal = |e: crate::storage::StoreError| {
        tracing::error!(error = %e, "Failed to read dtabs for admin");
        (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    };
    let mut dtabs = BTreeMap::new();
    for namespace in state.store.list().map_err(internal)? {
        // Deleted between list and get.
        if let Some(dtab) = state.store.get(&namespace).map_err(internal)? {
            dtabs.insert(namespace, dtab);
        }
    }
    Ok(Json(dtabs))
}

pub async fn get_telemeters(State(state): State<AdminState>) -> Json<Vec<TelemeterStatus>> {
    Json(
        state
            .telemeters
            .iter()
            .map(|t| TelemeterStatus {
                kind: t.kind().to_string(),
                stats: t.stats().is_some(),
                tracer: t.tracer().is_some(),
            })
            .collect(),
    )
}
