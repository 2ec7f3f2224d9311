//! API error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use lh_core::FilterError;
use lh_ingest::IngestError;

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed filter input; maps to 400 with the offending field named.
    #[error(transparent)]
    Filter(#[from] FilterError),
    /// File pipeline failure; maps to 500.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// A lock was poisoned by a panicking writer.
    #[error("internal state lock poisoned")]
    LockPoisoned,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Filter(_) => StatusCode::BAD_REQUEST,
            Self::Ingest(_) | Self::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let field = match &self {
            Self::Filter(error) => Some(error.field()),
            _ => None,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "error": self.to_string(),
            "field": field,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_errors_are_bad_requests() {
        let error = ApiError::from(FilterError::Invalid {
            field: "from",
            value: "nope".to_string(),
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ingest_errors_are_internal() {
        let error = ApiError::from(IngestError::MissingDirectory("/nope".into()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
