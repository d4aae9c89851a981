use thiserror::Error;

/// Failures surfaced by a search call.
///
/// Both kinds come from the index collaborator and are passed to the caller
/// unchanged. An empty result is never used to stand in for either of them.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The index's query parser rejected the query text. Retrying is pointless.
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// The index could not be reached or is in an inconsistent state.
    /// Callers may retry with backoff.
    #[error("search index unavailable: {0}")]
    IndexUnavailable(String),
}

impl SearchError {
    /// Whether a caller may reasonably retry the same request later
    pub fn is_transient(&self) -> bool {
        matches!(self, SearchError::IndexUnavailable(_))
    }
}
