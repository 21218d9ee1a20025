//! Error types for search setup.

use signpost_core::error::SignpostError;

/// Errors from configuring the search subsystem.
///
/// Queries themselves never fail: an unmatched query is an empty result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no morphological analyzers configured")]
    NoAnalyzers,
    #[error("no morphological analyzer for language '{0}'")]
    UnknownLanguage(String),
}

impl From<SearchError> for SignpostError {
    fn from(err: SearchError) -> Self {
        SignpostError::Search(err.to_string())
    }
}
