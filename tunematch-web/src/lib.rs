//! tunematch-web library interface
//!
//! Exposes the pipeline, the catalog client and the HTTP router for the
//! binary and for integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod services;
pub mod types;
pub mod utils;

pub use crate::error::{ApiError, ApiResult, PipelineError};
pub use crate::pipeline::{QueryOutcome, QueryPipeline};

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Query pipeline (holds the shared classifier)
    pub pipeline: QueryPipeline,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: QueryPipeline) -> Self {
        Self {
            pipeline,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI routes (HTML form)
        .merge(api::ui_routes())
        // JSON API
        .merge(api::query_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
