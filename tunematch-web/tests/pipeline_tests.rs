//! Query Pipeline Integration Tests
//!
//! Drives `QueryPipeline` end to end with counting doubles in place of the
//! catalog, the descriptor provider and the classifier.

mod helpers;

use helpers::{capture_logs, entry_x1, yesterday_descriptors, PipelineHarness, MODEL_FIXTURE};
use std::sync::Arc;
use tracing::Level;
use tunematch_web::pipeline::InferenceEngine;
use tunematch_web::types::{FeatureVector, LIKED_MESSAGE, NOT_FOUND_MESSAGE, NOT_LIKED_MESSAGE};
use tunematch_web::{PipelineError, QueryOutcome, QueryPipeline};

/// TC-PIPE-001: Scenario 1 produces the expected feature vector
#[tokio::test]
async fn tc_pipe_001_feature_vector_for_yesterday() {
    let harness = PipelineHarness::scenario_one(true);

    harness
        .pipeline
        .submit_query(Some("Yesterday"), Some("Help!"))
        .await
        .unwrap();

    let seen = harness.classifier.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);

    let expected = FeatureVector {
        danergy: 0.35,
        acousticness: 0.9,
        instrumentalness: 0.0,
        valence: 0.2,
        loudness: -10.0,
        tempo: 90.0,
        duration_secs: 125.0,
    };
    let got = seen[0].as_array();
    for (g, e) in got.iter().zip(expected.as_array().iter()) {
        assert!((g - e).abs() < 1e-9, "got {:?}, expected {:?}", got, expected);
    }

    assert_eq!(harness.descriptors.ids.lock().unwrap().as_slice(), ["X1"]);
}

/// TC-PIPE-002: Empty search result stops the pipeline with the not-found message
#[tokio::test]
async fn tc_pipe_002_zero_results_short_circuit() {
    let harness = PipelineHarness::empty_catalog();

    let outcome = harness
        .pipeline
        .submit_query(Some("Nonexistent"), Some("Nowhere"))
        .await
        .unwrap();

    assert_eq!(outcome, QueryOutcome::not_found());
    match &outcome {
        QueryOutcome::NotFound { message } => assert_eq!(message, NOT_FOUND_MESSAGE),
        other => panic!("expected NotFound, got {:?}", other),
    }

    assert_eq!(harness.catalog.calls(), 1);
    assert_eq!(harness.descriptors.calls(), 0);
    assert_eq!(harness.loader.loads(), 0);
    assert_eq!(harness.classifier.calls(), 0);
}

/// TC-PIPE-003: Truthy prediction yields advisory A with the resolved metadata
#[tokio::test]
async fn tc_pipe_003_liked_outcome() {
    let harness = PipelineHarness::scenario_one(true);

    let outcome = harness
        .pipeline
        .submit_query(Some("Yesterday"), Some("Help!"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        QueryOutcome::Matched {
            album: "Help!".to_string(),
            artist: "The Beatles".to_string(),
            track: "Yesterday".to_string(),
            released: "1965-08-06".to_string(),
            advisory: LIKED_MESSAGE.to_string(),
        }
    );
}

/// TC-PIPE-004: Falsy prediction yields advisory B
#[tokio::test]
async fn tc_pipe_004_not_liked_outcome() {
    let harness = PipelineHarness::scenario_one(false);

    let outcome = harness
        .pipeline
        .submit_query(Some("Yesterday"), Some("Help!"))
        .await
        .unwrap();

    assert_eq!(outcome.advisory(), Some(NOT_LIKED_MESSAGE));
}

/// TC-PIPE-005: The catalog is searched once per query
#[tokio::test]
async fn tc_pipe_005_single_catalog_search() {
    let harness = PipelineHarness::scenario_one(true);

    harness
        .pipeline
        .submit_query(Some("Yesterday"), Some("Help!"))
        .await
        .unwrap();

    assert_eq!(harness.catalog.calls(), 1);
    assert_eq!(
        harness.catalog.queries.lock().unwrap().as_slice(),
        [("Yesterday".to_string(), "Help!".to_string())]
    );
    assert_eq!(harness.descriptors.calls(), 1);
}

/// TC-PIPE-006: Invalid input is rejected before any external call
#[tokio::test]
async fn tc_pipe_006_invalid_input_no_calls() {
    let harness = PipelineHarness::scenario_one(true);

    for (track, album) in [
        (None, Some("Help!")),
        (Some("Yesterday"), None),
        (Some("   "), Some("Help!")),
        (Some("Yesterday"), Some("")),
    ] {
        let err = harness.pipeline.submit_query(track, album).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)), "{:?}", err);
    }

    assert_eq!(harness.catalog.calls(), 0);
    assert_eq!(harness.descriptors.calls(), 0);
    assert_eq!(harness.loader.loads(), 0);
}

/// TC-PIPE-007: Catalog failure propagates and is distinct from "not found"
#[tokio::test]
async fn tc_pipe_007_catalog_unavailable_propagates() {
    let harness = PipelineHarness::new(
        Err(PipelineError::CatalogUnavailable("connection refused".to_string())),
        Ok(vec![yesterday_descriptors()]),
        true,
    );

    let err = harness
        .pipeline
        .submit_query(Some("Yesterday"), Some("Help!"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PipelineError::CatalogUnavailable("connection refused".to_string())
    );
    assert_eq!(harness.descriptors.calls(), 0);
    assert_eq!(harness.classifier.calls(), 0);
}

/// TC-PIPE-008: No descriptor record for a resolved entry is DescriptorMissing
#[tokio::test]
async fn tc_pipe_008_descriptor_missing() {
    let harness = PipelineHarness::new(Ok(Some(entry_x1())), Ok(Vec::new()), true);

    let err = harness
        .pipeline
        .submit_query(Some("Yesterday"), Some("Help!"))
        .await
        .unwrap_err();

    assert_eq!(err, PipelineError::DescriptorMissing("X1".to_string()));
    assert_eq!(harness.classifier.calls(), 0);
}

/// TC-PIPE-009: The classifier is loaded once across queries
#[tokio::test]
async fn tc_pipe_009_model_loaded_once() {
    let harness = PipelineHarness::scenario_one(true);

    for _ in 0..3 {
        harness
            .pipeline
            .submit_query(Some("Yesterday"), Some("Help!"))
            .await
            .unwrap();
    }

    assert_eq!(harness.loader.loads(), 1);
    assert_eq!(harness.classifier.calls(), 3);
    assert!(harness.pipeline.engine().is_loaded());
}

/// TC-PIPE-010: Missing artifact fails the query, then succeeds once the file exists
#[tokio::test]
async fn tc_pipe_010_model_unavailable_then_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("SpotiSai.json");

    let harness = PipelineHarness::scenario_one(true);
    let pipeline = QueryPipeline::new(
        harness.catalog.clone(),
        harness.descriptors.clone(),
        Arc::new(InferenceEngine::from_path(&model_path)),
    );

    let (logs, _guard) = capture_logs();

    let err = pipeline
        .submit_query(Some("Yesterday"), Some("Help!"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ModelUnavailable(_)));
    assert!(!pipeline.engine().is_loaded());
    assert!(logs.contains_at(Level::ERROR, "Classifier model failed to load"));

    std::fs::write(&model_path, MODEL_FIXTURE).unwrap();

    let outcome = pipeline
        .submit_query(Some("Yesterday"), Some("Help!"))
        .await
        .unwrap();
    assert_eq!(outcome.advisory(), Some(LIKED_MESSAGE));
    assert!(pipeline.engine().is_loaded());
    logs.assert_contains("Classifier model parsed");
}
