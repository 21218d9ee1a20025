//! Morphology-aware free-text search over a conversation graph.
//!
//! Text is split into words, normalized, and reduced to [`WordTag`]s by the
//! configured morphological analyzers. The [`SearchIndex`] maps tags to
//! weighted node names and ranks nodes for a query.

pub mod error;
pub mod index;
pub mod morphology;
pub mod tokenize;

pub use error::SearchError;
pub use index::{IndexOptions, SearchHit, SearchIndex};
pub use morphology::{Analysis, Category, MorphAnalyzer, Morphology, WordTag};
pub use tokenize::Tokenizer;
