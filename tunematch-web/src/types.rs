//! Core data types for the lookup → features → verdict pipeline
//!
//! Data flow: `CatalogQuery` → `Lookup<CatalogEntry>` → `Lookup<FeatureVector>` → `Verdict`.
//! `Lookup::NotFound` is data, not an error: it travels through every stage
//! and short-circuits the external calls downstream of the catalog search.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

// ============================================================================
// Query
// ============================================================================

/// Validated (track, album) pair submitted by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    track: String,
    album: String,
}

impl CatalogQuery {
    /// Validate raw form input
    ///
    /// Both titles are required. Absent or whitespace-only values are
    /// rejected here so they never reach the catalog search.
    pub fn new(track: Option<&str>, album: Option<&str>) -> Result<Self, PipelineError> {
        let track = required_title("track title", track)?;
        let album = required_title("album title", album)?;
        Ok(Self { track, album })
    }

    pub fn track(&self) -> &str {
        &self.track
    }

    pub fn album(&self) -> &str {
        &self.album
    }
}

fn required_title(field: &str, value: Option<&str>) -> Result<String, PipelineError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        Some(_) => Err(PipelineError::InvalidInput(format!("{} must not be blank", field))),
        None => Err(PipelineError::InvalidInput(format!("{} is required", field))),
    }
}

// ============================================================================
// Catalog entry and sentinel
// ============================================================================

/// Resolved catalog track (first search result)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Opaque catalog identifier, stable per track version
    pub id: String,
    pub album: String,
    /// First credited album artist
    pub artist: String,
    /// Release date at catalog-defined precision (year, year-month or full date)
    pub release_date: String,
    pub track: String,
}

/// Result of a lookup stage: a value, or the "no match" sentinel
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }
}

// ============================================================================
// Descriptors and feature vector
// ============================================================================

/// Raw audio descriptors for one catalog identifier
///
/// Values keep the provider's own scale and sign conventions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioDescriptors {
    pub danceability: f64,
    pub energy: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub valence: f64,
    pub loudness: f64,
    pub tempo: f64,
    pub duration_ms: f64,
}

/// Feature names in classifier input order
///
/// Frozen by the trained artifact. Reordering breaks every prediction.
pub const FEATURE_NAMES: [&str; FeatureVector::LEN] = [
    "danergy",
    "acousticness",
    "instrumentalness",
    "valence",
    "loudness",
    "tempo",
    "duration_secs",
];

/// Fixed-order classifier input derived from `AudioDescriptors`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub danergy: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub valence: f64,
    pub loudness: f64,
    pub tempo: f64,
    pub duration_secs: f64,
}

impl FeatureVector {
    pub const LEN: usize = 7;

    pub fn from_descriptors(d: &AudioDescriptors) -> Self {
        Self {
            danergy: (d.danceability + d.energy) / 2.0,
            acousticness: d.acousticness,
            instrumentalness: d.instrumentalness,
            valence: d.valence,
            loudness: d.loudness,
            tempo: d.tempo,
            duration_secs: d.duration_ms / 1000.0,
        }
    }

    /// Values in `FEATURE_NAMES` order
    pub fn as_array(&self) -> [f64; Self::LEN] {
        [
            self.danergy,
            self.acousticness,
            self.instrumentalness,
            self.valence,
            self.loudness,
            self.tempo,
            self.duration_secs,
        ]
    }
}

// ============================================================================
// Verdict
// ============================================================================

pub const LIKED_MESSAGE: &str =
    "Looks like Sai might like this song, you should go ahead and suggest this to him";

pub const NOT_LIKED_MESSAGE: &str =
    "Hmm... this doesn't seem like a song he would like. But feel free to suggest this to him and check out";

pub const NOT_FOUND_MESSAGE: &str = "Track Not Found";

/// Detail shown next to `NOT_FOUND_MESSAGE` in the summary view
pub const NOT_FOUND_DETAIL: &str = "No such tracks found";

/// Classifier outcome translated to an advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Liked,
    NotLiked,
    NotFound,
}

impl Verdict {
    pub fn from_prediction(positive: bool) -> Self {
        if positive {
            Verdict::Liked
        } else {
            Verdict::NotLiked
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Liked => LIKED_MESSAGE,
            Verdict::NotLiked => NOT_LIKED_MESSAGE,
            Verdict::NotFound => NOT_FOUND_MESSAGE,
        }
    }
}
