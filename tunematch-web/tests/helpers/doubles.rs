//! Counting test doubles for the pipeline's external collaborators

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tunematch_web::model::Classifier;
use tunematch_web::pipeline::{InferenceEngine, ModelLoader, QueryPipeline};
use tunematch_web::services::{CatalogSearch, DescriptorProvider};
use tunematch_web::types::{AudioDescriptors, CatalogEntry, FeatureVector};
use tunematch_web::PipelineError;

/// Catalog entry used by the "Yesterday" / "Help!" scenario
pub fn entry_x1() -> CatalogEntry {
    CatalogEntry {
        id: "X1".to_string(),
        album: "Help!".to_string(),
        artist: "The Beatles".to_string(),
        release_date: "1965-08-06".to_string(),
        track: "Yesterday".to_string(),
    }
}

pub fn yesterday_descriptors() -> AudioDescriptors {
    AudioDescriptors {
        danceability: 0.4,
        energy: 0.3,
        acousticness: 0.9,
        instrumentalness: 0.0,
        valence: 0.2,
        loudness: -10.0,
        tempo: 90.0,
        duration_ms: 125_000.0,
    }
}

pub struct MockCatalog {
    result: Result<Option<CatalogEntry>, PipelineError>,
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<(String, String)>>,
}

impl MockCatalog {
    pub fn returning(result: Result<Option<CatalogEntry>, PipelineError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSearch for MockCatalog {
    async fn search_track(
        &self,
        track: &str,
        album: &str,
    ) -> Result<Option<CatalogEntry>, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap()
            .push((track.to_string(), album.to_string()));
        self.result.clone()
    }
}

pub struct MockDescriptors {
    result: Result<Vec<AudioDescriptors>, PipelineError>,
    pub calls: AtomicUsize,
    pub ids: Mutex<Vec<String>>,
}

impl MockDescriptors {
    pub fn returning(result: Result<Vec<AudioDescriptors>, PipelineError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            ids: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DescriptorProvider for MockDescriptors {
    async fn audio_descriptors(
        &self,
        catalog_id: &str,
    ) -> Result<Vec<AudioDescriptors>, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ids.lock().unwrap().push(catalog_id.to_string());
        self.result.clone()
    }
}

/// Classifier that answers a fixed value and records its inputs
pub struct RecordingClassifier {
    answer: bool,
    pub seen: Mutex<Vec<FeatureVector>>,
}

impl RecordingClassifier {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Classifier for RecordingClassifier {
    fn predict(&self, features: &FeatureVector) -> bool {
        self.seen.lock().unwrap().push(*features);
        self.answer
    }
}

/// Loader handing out a prepared classifier, counting loads
pub struct StaticLoader {
    classifier: Arc<RecordingClassifier>,
    pub loads: AtomicUsize,
}

impl StaticLoader {
    pub fn new(classifier: Arc<RecordingClassifier>) -> Self {
        Self {
            classifier,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for StaticLoader {
    fn describe(&self) -> String {
        "static test loader".to_string()
    }

    async fn load(&self) -> Result<Arc<dyn Classifier>, PipelineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.classifier.clone())
    }
}

/// Pipeline wired to doubles, with handles for call verification
pub struct PipelineHarness {
    pub catalog: Arc<MockCatalog>,
    pub descriptors: Arc<MockDescriptors>,
    pub classifier: Arc<RecordingClassifier>,
    pub loader: Arc<StaticLoader>,
    pub pipeline: QueryPipeline,
}

impl PipelineHarness {
    pub fn new(
        search: Result<Option<CatalogEntry>, PipelineError>,
        descriptors: Result<Vec<AudioDescriptors>, PipelineError>,
        answer: bool,
    ) -> Self {
        let catalog = Arc::new(MockCatalog::returning(search));
        let descriptors = Arc::new(MockDescriptors::returning(descriptors));
        let classifier = Arc::new(RecordingClassifier::answering(answer));
        let loader = Arc::new(StaticLoader::new(classifier.clone()));
        let engine = Arc::new(InferenceEngine::new(loader.clone()));

        let pipeline = QueryPipeline::new(catalog.clone(), descriptors.clone(), engine);

        Self {
            catalog,
            descriptors,
            classifier,
            loader,
            pipeline,
        }
    }

    /// Scenario 1 wiring: "Yesterday" / "Help!" resolves to X1
    pub fn scenario_one(answer: bool) -> Self {
        Self::new(
            Ok(Some(entry_x1())),
            Ok(vec![yesterday_descriptors()]),
            answer,
        )
    }

    /// Same doubles, but classification goes through `engine`
    pub fn pipeline_with_engine(&self, engine: Arc<InferenceEngine>) -> QueryPipeline {
        QueryPipeline::new(self.catalog.clone(), self.descriptors.clone(), engine)
    }

    /// Catalog returns no results
    pub fn empty_catalog() -> Self {
        Self::new(Ok(None), Ok(vec![yesterday_descriptors()]), true)
    }
}
