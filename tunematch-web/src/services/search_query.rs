//! Catalog search expression construction
//!
//! Titles are untrusted. Each one is wrapped in a quoted field filter so
//! the catalog's reserved words and operators (`AND`, `OR`, `NOT`, `-`, `:`)
//! inside a title are matched literally instead of changing the query.
//! The search syntax has no escape for `"` itself, so embedded quotes are dropped.

/// Build `album:"<album>" track:"<track>"`
pub fn build_search_query(track: &str, album: &str) -> String {
    format!(
        "album:\"{}\" track:\"{}\"",
        sanitize_title(album),
        sanitize_title(track)
    )
}

/// Drop double quotes; everything else is passed through as typed
fn sanitize_title(title: &str) -> String {
    title.replace('"', "")
}
