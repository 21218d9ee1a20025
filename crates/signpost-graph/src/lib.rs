//! Conversation graph for Signpost.
//!
//! Parses conversation documents, validates them and builds the immutable,
//! name-keyed [`GraphModel`] the rest of the assistant navigates.

pub mod builder;
pub mod document;
pub mod error;
pub mod model;
pub mod source;

pub use document::{Answer, ConversationDocument, LinkList, LinkSpec, NodeSpec, UrlLink, Venue};
pub use error::{GraphError, LoadError};
pub use model::{ConversationNode, GraphModel, Link};
pub use source::{source_from_url, DocumentSource, FileSource, HttpSource, StaticSource};
