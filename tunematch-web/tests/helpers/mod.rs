//! Test Helper Utilities
//!
//! Shared doubles and fixtures for testing tunematch-web

#![allow(dead_code, unused_imports)]

pub mod doubles;
pub mod log_capture;

pub use doubles::{
    entry_x1, yesterday_descriptors, MockCatalog, MockDescriptors, PipelineHarness,
    RecordingClassifier, StaticLoader,
};
pub use log_capture::{capture_logs, LogCapture};

/// XGBoost JSON fixture (two trees, binary:logistic)
pub const MODEL_FIXTURE: &str = include_str!("../fixtures/affinity_model.json");
