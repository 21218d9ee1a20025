//! Error types for loading and navigating the conversation graph.

use signpost_core::error::SignpostError;

/// Reasons a conversation document cannot become a [`GraphModel`](crate::GraphModel).
///
/// Any of these fails the whole load; a partial graph is never installed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch conversation from {source_url}: {reason}")]
    Fetch { source_url: String, reason: String },
    #[error("failed to parse conversation document: {0}")]
    Parse(String),
    #[error("unsupported conversation source: {0}")]
    UnsupportedSource(String),
    #[error("node without a name (linked from {})", .parent.as_deref().unwrap_or("top level"))]
    EmptyName { parent: Option<String> },
    #[error("more than one node is named '{0}'")]
    DuplicateName(String),
    #[error("node '{node}' links to '{target}', which does not exist")]
    DanglingLink { node: String, target: String },
    #[error("node '{0}' must have at least one answer")]
    NoAnswers(String),
    #[error("node '{node}' has an invalid answer: {reason}")]
    InvalidAnswer { node: String, reason: String },
    #[error("root node '{0}' is missing")]
    MissingRoot(String),
}

/// Errors raised while navigating an already-built graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("unknown node: {0}")]
    UnknownNode(String),
}

impl From<LoadError> for SignpostError {
    fn from(err: LoadError) -> Self {
        SignpostError::Load(err.to_string())
    }
}

impl From<GraphError> for SignpostError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::UnknownNode(name) => SignpostError::UnknownNode(name),
        }
    }
}
