//! Error types for the conversation engine and its collaborators.

use signpost_core::error::SignpostError;
use signpost_graph::{GraphError, LoadError};
use signpost_search::SearchError;

/// Errors from processing an event.
///
/// None of these are shown to the user verbatim: the boundary answers any
/// of them with a generic apology and resets the session.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("session store error: {0}")]
    SessionStore(#[from] SessionStoreError),
    #[error("no usable snapshot: {0}")]
    Snapshot(String),
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Errors from building or reloading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("snapshot lock poisoned")]
    Poisoned,
}

/// Failure reported by a session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session lock poisoned")]
    Poisoned,
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Feedback could not be relayed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForwardError {
    #[error("no feedback channel configured")]
    NoChannel,
    #[error("feedback channel closed")]
    Closed,
    #[error("feedback channel full")]
    Full,
}

impl From<ChatError> for SignpostError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Graph(e) => e.into(),
            ChatError::SessionStore(e) => SignpostError::Session(e.to_string()),
            ChatError::Snapshot(msg) => SignpostError::Load(msg),
        }
    }
}

impl From<ReloadError> for SignpostError {
    fn from(err: ReloadError) -> Self {
        match err {
            ReloadError::Load(e) => e.into(),
            ReloadError::Search(e) => e.into(),
            ReloadError::Poisoned => SignpostError::Load(err.to_string()),
        }
    }
}

impl From<ForwardError> for SignpostError {
    fn from(err: ForwardError) -> Self {
        SignpostError::Forwarding(err.to_string())
    }
}
