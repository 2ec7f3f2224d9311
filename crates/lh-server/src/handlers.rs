//! Request handlers for the analysis and maintenance endpoints.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use serde::Serialize;

use lh_core::{QueryKind, QueryOutput, RawQuery, run_query};
use lh_ingest::{ClassificationStatus, ExtractSummary, LoadSummary, extract_import_layer};

use crate::error::ApiError;
use crate::state::{AppState, SharedState};
use crate::Envelope;

/// Query parameters as delivered by the HTTP layer.
pub type Params = HashMap<String, String>;

fn run_kind(
    state: &AppState,
    kind: QueryKind,
    params: Params,
) -> Result<Json<Envelope<QueryOutput>>, ApiError> {
    let raw = RawQuery::from(params);
    let store = state.store.read().map_err(|_| ApiError::LockPoisoned)?;
    let classification = state
        .classification
        .read()
        .map_err(|_| ApiError::LockPoisoned)?;
    let output = run_query(store.timelines(), kind, &raw, &*classification)?;
    Ok(Json(Envelope::new(kind.description(), output)))
}

pub async fn places(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Result<Json<Envelope<QueryOutput>>, ApiError> {
    run_kind(&state, QueryKind::Places, params)
}

pub async fn unassigned_visits(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Result<Json<Envelope<QueryOutput>>, ApiError> {
    run_kind(&state, QueryKind::UnassignedVisits, params)
}

pub async fn activity_types(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Result<Json<Envelope<QueryOutput>>, ApiError> {
    run_kind(&state, QueryKind::ActivityTypes, params)
}

pub async fn timestamps(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Result<Json<Envelope<QueryOutput>>, ApiError> {
    run_kind(&state, QueryKind::Timestamps, params)
}

pub async fn items(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Result<Json<Envelope<QueryOutput>>, ApiError> {
    run_kind(&state, QueryKind::Items, params)
}

/// Combined load state of the store and the classification file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub timelines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadSummary>,
    pub classification: ClassificationStatus,
}

pub async fn status(
    State(state): State<SharedState>,
) -> Result<Json<Envelope<StatusResponse>>, ApiError> {
    let store = state.store.read().map_err(|_| ApiError::LockPoisoned)?;
    let classification = state
        .classification
        .read()
        .map_err(|_| ApiError::LockPoisoned)?;
    let response = StatusResponse {
        timelines: store.timelines().len(),
        load: store.summary().cloned(),
        classification: classification.status(),
    };
    Ok(Json(Envelope::new("Service status", response)))
}

/// Runs the import-layer → extracted-layer promotion.
pub async fn extract_files(
    State(state): State<SharedState>,
) -> Result<Json<Envelope<ExtractSummary>>, ApiError> {
    let extract_dir = {
        let store = state.store.read().map_err(|_| ApiError::LockPoisoned)?;
        store.dir().to_path_buf()
    };
    let summary = extract_import_layer(&state.import_dir, &extract_dir)?;
    Ok(Json(Envelope::new(
        "Import layer extracted; reload the export layer to pick up new files",
        summary,
    )))
}

/// Re-scans and re-parses the extracted layer.
pub async fn reload_timelines(
    State(state): State<SharedState>,
) -> Result<Json<Envelope<LoadSummary>>, ApiError> {
    let mut store = state.store.write().map_err(|_| ApiError::LockPoisoned)?;
    let summary = store.load()?.clone();
    Ok(Json(Envelope::new("Export layer reloaded", summary)))
}

/// Re-reads the classification file.
pub async fn reload_classification(
    State(state): State<SharedState>,
) -> Result<Json<Envelope<ClassificationStatus>>, ApiError> {
    let mut classification = state
        .classification
        .write()
        .map_err(|_| ApiError::LockPoisoned)?;
    classification.reload()?;
    Ok(Json(Envelope::new(
        "Classifications reloaded",
        classification.status(),
    )))
}
