//! The immutable, name-keyed conversation graph.

use std::collections::{HashMap, HashSet};

use crate::document::Answer;
use crate::error::GraphError;

/// An outgoing link of a built node. Both kinds point at a node stored in
/// the graph by name; the variant only records how the document wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// Reference to a node defined elsewhere.
    Reference(String),
    /// A node that was embedded inline under this link.
    Branch(String),
}

impl Link {
    /// Name of the node this link leads to.
    pub fn target(&self) -> &str {
        match self {
            Link::Reference(name) | Link::Branch(name) => name,
        }
    }
}

/// A named unit of content with answers and outgoing links.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationNode {
    pub name: String,
    pub alt_names: Vec<String>,
    pub keywords: Vec<String>,
    pub answers: Vec<Answer>,
    pub links: Vec<Link>,
}

/// Validated conversation graph.
///
/// Nodes live in a name-keyed arena; links are names, so cycles and shared
/// nodes never turn into reference cycles. Built once per load by
/// [`GraphModel::build`](crate::builder) and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct GraphModel {
    pub(crate) root: String,
    pub(crate) nodes: HashMap<String, ConversationNode>,
    /// Node names in document order.
    pub(crate) order: Vec<String>,
    /// Alt-name to node name.
    pub(crate) aliases: HashMap<String, String>,
    /// Lowercased name or alt-name to node name.
    pub(crate) folded: HashMap<String, String>,
    /// Selectable labels of every node that has links.
    pub(crate) choices: HashMap<String, Vec<String>>,
}

impl GraphModel {
    /// Name of the landing node.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&ConversationNode> {
        self.nodes.get(name)
    }

    /// Like [`node`](Self::node), but a missing name is an error.
    pub fn require(&self, name: &str) -> Result<&ConversationNode, GraphError> {
        self.nodes
            .get(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    /// Resolve user text to a node name.
    ///
    /// Exact names win, then alt-names, then a case-insensitive match of
    /// either after trimming.
    pub fn resolve(&self, text: &str) -> Option<&str> {
        if let Some((name, _)) = self.nodes.get_key_value(text) {
            return Some(name);
        }
        if let Some(name) = self.aliases.get(text) {
            return Some(name);
        }
        self.folded
            .get(&text.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Selectable labels for a node, or `None` if it has no links.
    pub fn choices(&self, name: &str) -> Option<&[String]> {
        self.choices.get(name).map(Vec::as_slice)
    }

    /// Visit every node reachable from `start`, following both references
    /// and branches, each exactly once regardless of cycles or shared paths.
    ///
    /// Visiting is depth-first in link order. Returns the number of nodes
    /// visited; an unknown `start` visits nothing.
    pub fn walk_from<F>(&self, start: &str, mut visit: F) -> usize
    where
        F: FnMut(&ConversationNode),
    {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![start];

        while let Some(name) = stack.pop() {
            let Some(node) = self.nodes.get(name) else {
                continue;
            };
            if !visited.insert(node.name.as_str()) {
                continue;
            }
            visit(node);
            for link in node.links.iter().rev() {
                if !visited.contains(link.target()) {
                    stack.push(link.target());
                }
            }
        }

        visited.len()
    }

    /// Names of every node reachable from `start`, in visiting order.
    pub fn reachable_from(&self, start: &str) -> Vec<String> {
        let mut names = Vec::new();
        self.walk_from(start, |node| names.push(node.name.clone()));
        names
    }
}
