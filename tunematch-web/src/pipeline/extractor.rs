//! Feature Extractor: catalog entry → fixed-order feature vector

use crate::error::PipelineError;
use crate::services::DescriptorProvider;
use crate::types::{CatalogEntry, FeatureVector, Lookup};

/// Build the classifier input for a resolved entry
///
/// `NotFound` passes through without any descriptor call. For a found
/// entry one lookup is made and the first record is used; an empty
/// response is `DescriptorMissing`, never zero-filled features.
pub async fn extract(
    descriptors: &dyn DescriptorProvider,
    entry: &Lookup<CatalogEntry>,
) -> Result<Lookup<FeatureVector>, PipelineError> {
    let entry = match entry {
        Lookup::Found(entry) => entry,
        Lookup::NotFound => return Ok(Lookup::NotFound),
    };

    let records = descriptors.audio_descriptors(&entry.id).await?;
    let first = records
        .first()
        .ok_or_else(|| PipelineError::DescriptorMissing(entry.id.clone()))?;

    if records.len() > 1 {
        tracing::debug!(
            catalog_id = %entry.id,
            records = records.len(),
            "Descriptor provider returned extra records, using the first"
        );
    }

    Ok(Lookup::Found(FeatureVector::from_descriptors(first)))
}
