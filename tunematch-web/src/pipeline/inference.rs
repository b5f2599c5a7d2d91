//! Inference Engine: feature vector → verdict
//!
//! The classifier is process-wide state with a single-initialisation
//! lifecycle: loaded on first use, then shared read-only by every request.
//! Concurrent first callers wait on the same load; a failed load leaves
//! nothing behind, so the next call tries again.

use crate::error::PipelineError;
use crate::model::{Classifier, TreeEnsemble};
use crate::types::{FeatureVector, Lookup, Verdict};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Source of the classifier artifact
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Human-readable origin for logs
    fn describe(&self) -> String;

    async fn load(&self) -> Result<Arc<dyn Classifier>, PipelineError>;
}

/// Loads an XGBoost JSON model from disk
pub struct FileModelLoader {
    path: PathBuf,
}

impl FileModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ModelLoader for FileModelLoader {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Arc<dyn Classifier>, PipelineError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            PipelineError::ModelUnavailable(format!(
                "cannot read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let model = tokio::task::spawn_blocking(move || TreeEnsemble::from_json_slice(&bytes))
            .await
            .map_err(|e| PipelineError::ModelUnavailable(format!("model parse task failed: {}", e)))??;

        tracing::info!(
            path = %self.path.display(),
            trees = model.num_trees(),
            objective = ?model.objective(),
            "Classifier model parsed"
        );

        Ok(Arc::new(model))
    }
}

/// Binary classifier wrapper with load-once semantics
pub struct InferenceEngine {
    loader: Arc<dyn ModelLoader>,
    model: OnceCell<Arc<dyn Classifier>>,
}

impl InferenceEngine {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    /// Engine backed by an XGBoost JSON file
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileModelLoader::new(path)))
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Loaded classifier, loading it first if needed
    pub async fn classifier(&self) -> Result<&Arc<dyn Classifier>, PipelineError> {
        self.model
            .get_or_try_init(|| async {
                tracing::info!(source = %self.loader.describe(), "Loading classifier model");
                self.loader.load().await.map_err(|e| {
                    tracing::error!(
                        source = %self.loader.describe(),
                        error = %e,
                        "Classifier model failed to load"
                    );
                    e
                })
            })
            .await
    }

    /// Try to load the classifier ahead of the first query
    ///
    /// A failure is already logged by `classifier()` and is retried on the
    /// next call, so it is reported here only as `false`.
    pub async fn warm_up(&self) -> bool {
        match self.classifier().await {
            Ok(_) => {
                tracing::info!(source = %self.loader.describe(), "Classifier ready");
                true
            }
            Err(_) => false,
        }
    }

    /// Classify one feature vector
    ///
    /// `NotFound` yields `Verdict::NotFound` without touching the model.
    pub async fn predict(&self, features: &Lookup<FeatureVector>) -> Result<Verdict, PipelineError> {
        let vector = match features {
            Lookup::Found(vector) => vector,
            Lookup::NotFound => return Ok(Verdict::NotFound),
        };

        let classifier = self.classifier().await?;
        let verdict = Verdict::from_prediction(classifier.predict(vector));

        tracing::debug!(?verdict, "Classifier verdict");
        Ok(verdict)
    }
}
