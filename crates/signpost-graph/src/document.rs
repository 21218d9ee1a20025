//! Serialized form of a conversation document.
//!
//! A document is a flat list of top-level nodes. Nodes reach further nodes
//! either by name or by embedding them inline as a branch:
//!
//! ```json
//! {
//!   "nodes": [
//!     {
//!       "name": "/start",
//!       "answers": [{ "text": "Hello!" }],
//!       "links": [{ "name": "Masks" }, { "branch": { "name": "Visas", "answers": [{ "text": "..." }] } }]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// A parsed conversation document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationDocument {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl ConversationDocument {
    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// A node as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub alt_names: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

/// An outgoing link as written in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSpec {
    /// Reference to a node defined elsewhere in the document.
    Name(String),
    /// A node embedded in place.
    Branch(NodeSpec),
}

/// One piece of content shown for a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Text(String),
    #[serde(rename = "links")]
    LinkList(LinkList),
    Venue(Venue),
    /// Opaque identifier resolved by the media store.
    Photo(String),
}

impl Answer {
    /// The text of a `Text` answer, if that is what this is.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True for a `Text` answer with nothing to show.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Answer::Text(text) if text.trim().is_empty())
    }
}

/// A heading followed by a list of labelled URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkList {
    pub heading: String,
    #[serde(default)]
    pub links: Vec<UrlLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlLink {
    pub label: String,
    pub url: String,
}

/// A physical location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub title: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
}
