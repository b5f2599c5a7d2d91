//! Catalog Resolver: (track, album) → catalog entry or NotFound

use crate::error::PipelineError;
use crate::services::CatalogSearch;
use crate::types::{CatalogEntry, CatalogQuery, Lookup};

/// Resolve a query to the catalog's first matching track
///
/// Exactly one search call is issued. Zero results is `Lookup::NotFound`;
/// a failed call is `CatalogUnavailable` and is never turned into NotFound.
pub async fn resolve(
    catalog: &dyn CatalogSearch,
    query: &CatalogQuery,
) -> Result<Lookup<CatalogEntry>, PipelineError> {
    let entry = catalog.search_track(query.track(), query.album()).await?;
    Ok(entry.into())
}
