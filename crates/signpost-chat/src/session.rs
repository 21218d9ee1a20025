//! Per-user navigation state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a session is in the conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatState {
    /// Awaiting a menu choice or free text.
    #[default]
    Choosing,
    /// Accumulating feedback messages for forwarding.
    CollectingFeedback,
    /// Privileged sub-menu.
    AdminMenu,
    /// The last free-text query matched nothing.
    SearchFailed,
}

impl fmt::Display for ChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatState::Choosing => write!(f, "Choosing"),
            ChatState::CollectingFeedback => write!(f, "CollectingFeedback"),
            ChatState::AdminMenu => write!(f, "AdminMenu"),
            ChatState::SearchFailed => write!(f, "SearchFailed"),
        }
    }
}

/// Navigation state of one user, stored between events as a JSON blob.
///
/// `nav_stack` is never empty and always starts with the root node.
/// Node names may go stale when the conversation is reloaded; the engine
/// checks them against the active graph before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationSession {
    pub state: ChatState,
    pub current_node: String,
    pub nav_stack: Vec<String>,
    #[serde(default)]
    pub feedback_buffer: Vec<String>,
    /// Candidates offered after an ambiguous search, until the next event.
    #[serde(default)]
    pub shortlist: Vec<String>,
}

impl NavigationSession {
    /// A fresh session sitting at `root`.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            state: ChatState::Choosing,
            current_node: root.clone(),
            nav_stack: vec![root],
            feedback_buffer: Vec::new(),
            shortlist: Vec::new(),
        }
    }

    /// Back to `root` in `Choosing`, dropping everything transient.
    pub fn reset(&mut self, root: &str) {
        *self = Self::new(root);
    }

    /// Push `name`, first truncating the stack to just before an earlier
    /// occurrence of it so that loops never grow the stack.
    pub fn select(&mut self, name: &str) {
        if let Some(pos) = self.nav_stack.iter().position(|n| n == name) {
            self.nav_stack.truncate(pos);
        }
        self.nav_stack.push(name.to_string());
        self.current_node = name.to_string();
        self.state = ChatState::Choosing;
        self.shortlist.clear();
    }

    /// Pop one level. Back from the root stays at the root.
    pub fn back(&mut self) {
        if self.nav_stack.len() > 1 {
            self.nav_stack.pop();
        }
        if let Some(top) = self.nav_stack.last() {
            self.current_node = top.clone();
        }
        self.state = ChatState::Choosing;
        self.shortlist.clear();
    }

    pub fn depth(&self) -> usize {
        self.nav_stack.len()
    }

    /// True when the only entry on the stack is the root.
    pub fn at_root(&self) -> bool {
        self.nav_stack.len() == 1
    }

    /// Every node name the session remembers.
    pub fn referenced_nodes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.current_node.as_str()).chain(self.nav_stack.iter().map(String::as_str))
    }
}
