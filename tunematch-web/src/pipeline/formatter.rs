//! Result Formatter: resolution + verdict → presentation-ready summary

use crate::types::{CatalogEntry, Lookup, Verdict, NOT_FOUND_DETAIL, NOT_FOUND_MESSAGE};
use serde::Serialize;

/// Outcome handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    NotFound {
        message: String,
    },
    Matched {
        album: String,
        artist: String,
        track: String,
        released: String,
        advisory: String,
    },
}

impl QueryOutcome {
    /// Join resolved metadata with the verdict message
    ///
    /// A NotFound resolution produces only the not-found message, whatever
    /// verdict is passed in.
    pub fn build(entry: &Lookup<CatalogEntry>, verdict: Verdict) -> Self {
        match entry {
            Lookup::NotFound => Self::not_found(),
            Lookup::Found(entry) => QueryOutcome::Matched {
                album: entry.album.clone(),
                artist: entry.artist.clone(),
                track: entry.track.clone(),
                released: entry.release_date.clone(),
                advisory: verdict.message().to_string(),
            },
        }
    }

    pub fn not_found() -> Self {
        QueryOutcome::NotFound {
            message: Verdict::NotFound.message().to_string(),
        }
    }

    /// Key/value pairs in display order
    pub fn summary_lines(&self) -> Vec<(&'static str, &str)> {
        match self {
            QueryOutcome::NotFound { .. } => vec![(NOT_FOUND_MESSAGE, NOT_FOUND_DETAIL)],
            QueryOutcome::Matched {
                album,
                artist,
                track,
                released,
                ..
            } => vec![
                ("Album", album.as_str()),
                ("Artist", artist.as_str()),
                ("Track", track.as_str()),
                ("Released", released.as_str()),
            ],
        }
    }

    pub fn advisory(&self) -> Option<&str> {
        match self {
            QueryOutcome::NotFound { .. } => None,
            QueryOutcome::Matched { advisory, .. } => Some(advisory),
        }
    }
}
