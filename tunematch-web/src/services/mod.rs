//! External collaborators: catalog search and audio descriptor lookup
//!
//! The pipeline only sees the two traits below. `SpotifyClient` implements
//! both against the Spotify Web API; tests substitute counting doubles.

pub mod search_query;
pub mod spotify_client;

pub use search_query::build_search_query;
pub use spotify_client::{SpotifyClient, SpotifyClientConfig};

use crate::error::PipelineError;
use crate::types::{AudioDescriptors, CatalogEntry};
use async_trait::async_trait;

/// Catalog search capability
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Search tracks by exact album and track title
    ///
    /// # Returns
    /// * `Ok(Some(entry))` - first (best) match
    /// * `Ok(None)` - the service returned no results
    /// * `Err(CatalogUnavailable)` - the call itself failed
    async fn search_track(
        &self,
        track: &str,
        album: &str,
    ) -> Result<Option<CatalogEntry>, PipelineError>;
}

/// Audio descriptor capability
#[async_trait]
pub trait DescriptorProvider: Send + Sync {
    /// Fetch descriptor records for one catalog identifier
    ///
    /// Returns every record the provider sent back, in order. An empty list
    /// is a valid response here; the feature extractor decides what it means.
    async fn audio_descriptors(
        &self,
        catalog_id: &str,
    ) -> Result<Vec<AudioDescriptors>, PipelineError>;
}
