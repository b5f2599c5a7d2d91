//! tunematch-web - Track lookup and taste-profile verdict service
//!
//! Looks a track up in the Spotify catalog by title and album, fetches its
//! audio features, and runs them through a pre-trained XGBoost classifier
//! to decide whether the listener is likely to enjoy it.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tunematch_common::config::resolve_credentials;
use tunematch_common::logging::init_tracing;
use tunematch_web::config::{load_config, Cli};
use tunematch_web::pipeline::{InferenceEngine, QueryPipeline};
use tunematch_web::services::{SpotifyClient, SpotifyClientConfig};
use tunematch_web::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Subscriber first, so config loading is logged; the configured level follows
    let logging = init_tracing()?;

    info!("Starting tunematch-web");
    info!(
        "Version: {} ({}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = load_config(&cli)?;
    logging.apply_level(&config.logging.level)?;

    // Missing credentials stop the process here, not on the first request
    let credentials = resolve_credentials(&config)?;
    info!(client_id = %credentials.client_id, "Catalog credentials resolved");

    let client = Arc::new(SpotifyClient::new(SpotifyClientConfig::from_toml(
        credentials,
        &config,
    ))?);

    let engine = Arc::new(InferenceEngine::from_path(&config.model_path));

    // Warm the classifier; a failure is logged by the engine and retried on the first query
    engine.warm_up().await;

    let pipeline = QueryPipeline::new(client.clone(), client, engine);
    let app = build_router(AppState::new(pipeline));

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
