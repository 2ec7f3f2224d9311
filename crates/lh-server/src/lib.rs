//! HTTP API for the location-history analyzer.
//!
//! Thin axum layer over the core query engine and the file pipeline. Five
//! analysis endpoints plus status and reload/extract maintenance routes;
//! every response is wrapped in a `{description, response}` envelope.

use std::net::SocketAddr;

use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub mod error;
pub mod handlers;
mod state;

pub use error::ApiError;
pub use state::{AppState, SharedState};

/// Wire envelope around every successful response.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub description: String,
    pub response: T,
}

impl<T> Envelope<T> {
    pub fn new(description: impl Into<String>, response: T) -> Self {
        Self {
            description: description.into(),
            response,
        }
    }
}

/// Fatal server failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Builds the full route table over the shared state.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/places", get(handlers::places))
        .route("/visits/unassigned", get(handlers::unassigned_visits))
        .route("/activities/types", get(handlers::activity_types))
        .route("/timestamps", get(handlers::timestamps))
        .route("/items", get(handlers::items))
        .route("/status", get(handlers::status))
        .route("/files/import/extract", post(handlers::extract_files))
        .route("/files/export/reload", post(handlers::reload_timelines))
        .route("/classification/reload", post(handlers::reload_classification))
        .layer(middleware::from_fn(cors_headers))
        .with_state(state)
}

/// Serves until ctrl-c.
pub async fn run(addr: SocketAddr, state: SharedState) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(ServerError::Bind)?;
    tracing::info!(%addr, "http server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("ctrl_c received; shutting down"),
        Err(error) => tracing::warn!(%error, "failed to install ctrl_c handler"),
    }
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({"message": "location-history analyzer"}))
}

/// Makes the data reachable from pages hosted elsewhere.
async fn cors_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("X-Requested-With,content-type"),
    );
    response
}
