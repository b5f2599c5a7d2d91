//! JSON query endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::pipeline::QueryOutcome;
use crate::AppState;

/// POST /api/query request body
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub track: Option<String>,
    pub album: Option<String>,
}

/// POST /api/query
///
/// Returns the formatted outcome; stage failures map to `ApiError`.
pub async fn submit_query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<QueryOutcome>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let outcome = state
        .pipeline
        .submit_query(request.track.as_deref(), request.album.as_deref())
        .await
        .map_err(|e| {
            tracing::warn!(code = e.code(), error = %e, "Query failed");
            e
        })?;

    Ok(Json(outcome))
}

/// Build JSON API routes
pub fn query_routes() -> Router<AppState> {
    Router::new().route("/api/query", post(submit_query))
}
