//! Projection of a session onto the choices offered to the user.
//!
//! The node whose answers are shown and the node whose links form the
//! keyboard can differ: a leaf has no links, so the nearest menu below it
//! on the navigation stack keeps offering its choices.

use serde::{Deserialize, Serialize};

use signpost_graph::GraphModel;

use crate::session::{ChatState, NavigationSession};

/// Facts the messaging layer uses to add context-sensitive options
/// (back, start over, feedback, admin) to a keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuFacts {
    pub state: ChatState,
    pub depth: usize,
    pub at_root: bool,
    pub privileged: bool,
    /// Only a start-over option makes sense: the session refers to nodes
    /// that no longer exist, or the event failed.
    pub restart_only: bool,
}

/// Options offered after a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    /// Node labels, in link order.
    pub choices: Vec<String>,
    pub facts: MenuFacts,
}

/// Nearest node on the stack, from the top, that has links.
pub fn keyboard_node<'a>(session: &'a NavigationSession, graph: &GraphModel) -> Option<&'a str> {
    session
        .nav_stack
        .iter()
        .rev()
        .map(String::as_str)
        .find(|name| graph.choices(name).is_some())
}

/// Node choices for the session's keyboard node.
pub fn menu_choices(session: &NavigationSession, graph: &GraphModel) -> Vec<String> {
    keyboard_node(session, graph)
        .and_then(|name| graph.choices(name))
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

pub fn menu_facts(session: &NavigationSession, privileged: bool, restart_only: bool) -> MenuFacts {
    MenuFacts {
        state: session.state,
        depth: session.depth(),
        at_root: session.at_root(),
        privileged,
        restart_only,
    }
}
