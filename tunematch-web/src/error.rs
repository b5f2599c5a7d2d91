//! Error types for tunematch-web
//!
//! `PipelineError` is raised at the stage where a failure originates and is
//! never swallowed by a later stage. `ApiError` maps it onto HTTP.
//! "Track not found" is not an error; see `types::Lookup::NotFound`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure kinds of the lookup → features → verdict pipeline
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Missing or blank query field, rejected before any external call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catalog service unreachable, refused credentials, or kept failing after retries
    #[error("Catalog service unavailable: {0}")]
    CatalogUnavailable(String),

    /// Descriptor provider had no record for a resolved catalog identifier
    #[error("No audio descriptors for catalog entry {0}")]
    DescriptorMissing(String),

    /// Classifier artifact missing, unreadable, or not a supported model
    #[error("Classifier model unavailable: {0}")]
    ModelUnavailable(String),
}

impl PipelineError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "INVALID_INPUT",
            PipelineError::CatalogUnavailable(_) => "CATALOG_UNAVAILABLE",
            PipelineError::DescriptorMissing(_) => "DESCRIPTOR_MISSING",
            PipelineError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PipelineError::CatalogUnavailable(_) => StatusCode::BAD_GATEWAY,
            PipelineError::DescriptorMissing(_) => StatusCode::BAD_GATEWAY,
            PipelineError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Short message shown to the end user
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "Please enter both a song name and an album name.",
            PipelineError::CatalogUnavailable(_) => {
                "The music catalog service is unavailable right now. Please try again later."
            }
            PipelineError::DescriptorMissing(_) => {
                "The track was found, but its audio features are not available."
            }
            PipelineError::ModelUnavailable(_) => {
                "The recommendation model is unavailable right now."
            }
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Pipeline stage failure
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Invalid request body (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Pipeline(ref err) => (err.status(), err.code(), err.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
