//! Query pipeline: Catalog Resolver → Feature Extractor → Inference Engine → Result Formatter
//!
//! Stages run strictly in sequence for one query. Queries share nothing
//! mutable except the classifier held by `InferenceEngine`.

pub mod extractor;
pub mod formatter;
pub mod inference;
pub mod resolver;

pub use extractor::extract;
pub use formatter::QueryOutcome;
pub use inference::{FileModelLoader, InferenceEngine, ModelLoader};
pub use resolver::resolve;

use crate::error::PipelineError;
use crate::services::{CatalogSearch, DescriptorProvider};
use crate::types::CatalogQuery;
use std::sync::Arc;

/// Wires the external collaborators and the shared classifier together
#[derive(Clone)]
pub struct QueryPipeline {
    catalog: Arc<dyn CatalogSearch>,
    descriptors: Arc<dyn DescriptorProvider>,
    engine: Arc<InferenceEngine>,
}

impl QueryPipeline {
    pub fn new(
        catalog: Arc<dyn CatalogSearch>,
        descriptors: Arc<dyn DescriptorProvider>,
        engine: Arc<InferenceEngine>,
    ) -> Self {
        Self {
            catalog,
            descriptors,
            engine,
        }
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Inbound `submitQuery`: validate raw titles, then run the pipeline
    pub async fn submit_query(
        &self,
        track: Option<&str>,
        album: Option<&str>,
    ) -> Result<QueryOutcome, PipelineError> {
        let query = CatalogQuery::new(track, album)?;
        self.run(&query).await
    }

    /// Run all stages for an already validated query
    ///
    /// The catalog is searched once; its result feeds both the displayed
    /// metadata and the descriptor lookup.
    pub async fn run(&self, query: &CatalogQuery) -> Result<QueryOutcome, PipelineError> {
        let entry = resolve(self.catalog.as_ref(), query).await?;
        let features = extract(self.descriptors.as_ref(), &entry).await?;
        let verdict = self.engine.predict(&features).await?;

        tracing::info!(
            track = %query.track(),
            album = %query.album(),
            found = entry.is_found(),
            ?verdict,
            "Query completed"
        );

        Ok(QueryOutcome::build(&entry, verdict))
    }
}
