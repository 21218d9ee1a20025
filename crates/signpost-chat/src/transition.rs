//! Pure navigation state transitions.
//!
//! [`transition`] decides the next session and what should be shown, and
//! lists the side effects to run. It performs no I/O; the engine executes
//! the effects and renders the outcome.

use signpost_core::types::UserContext;
use signpost_graph::GraphModel;
use signpost_search::SearchIndex;

use crate::event::Event;
use crate::session::{ChatState, NavigationSession};

/// Read-only inputs to a transition.
#[derive(Clone, Copy)]
pub struct TransitionContext<'a> {
    pub graph: &'a GraphModel,
    pub index: &'a SearchIndex,
    pub user: &'a UserContext,
    /// Most candidates offered for an ambiguous search.
    pub shortlist_limit: usize,
}

/// Extra text shown before a node's answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The node is the only search hit.
    SingleResult,
    /// Feedback was submitted.
    FeedbackThanks,
}

/// What the user should see after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Render a node's answers.
    Node { node: String, notice: Option<Notice> },
    /// Several search hits to pick from.
    Shortlist(Vec<String>),
    /// The query matched nothing.
    NoResults,
    FeedbackPrompt,
    FeedbackContinue,
    AdminMenu,
    /// The boundary should reload the conversation source.
    ReloadRequested,
    Statistics,
    /// The session refers to nodes the active graph no longer has.
    DataRefreshed,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RecordInteraction { node: String },
    RecordSearch { query: String, results: usize },
    /// Relay collected feedback. `author` is `None` for anonymous feedback.
    ForwardFeedback {
        author: Option<String>,
        messages: Vec<String>,
    },
}

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub session: NavigationSession,
    pub outcome: Outcome,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    fn new(session: NavigationSession, outcome: Outcome) -> Self {
        Self {
            session,
            outcome,
            effects: vec![],
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// True if the session remembers a node the graph does not have.
pub fn is_stale(session: &NavigationSession, graph: &GraphModel) -> bool {
    session.referenced_nodes().any(|name| !graph.contains(name))
}

/// Apply `event` to `session`.
pub fn transition(
    session: &NavigationSession,
    event: Event,
    ctx: &TransitionContext<'_>,
) -> TransitionResult {
    let root = ctx.graph.root();

    if !event.ignores_stale_nodes() && is_stale(session, ctx.graph) {
        return TransitionResult::new(session.clone(), Outcome::DataRefreshed);
    }

    let mut next = session.clone();
    match (session.state, event) {
        (_, Event::Reset) => {
            next.reset(root);
            show(next, root, None)
        }

        (_, Event::EnterFeedback) => {
            next.state = ChatState::CollectingFeedback;
            next.feedback_buffer.clear();
            next.shortlist.clear();
            TransitionResult::new(next, Outcome::FeedbackPrompt)
        }

        (ChatState::CollectingFeedback, Event::AppendFeedback(message)) => {
            next.feedback_buffer.push(message);
            TransitionResult::new(next, Outcome::FeedbackContinue)
        }

        (ChatState::CollectingFeedback, Event::SubmitFeedback { anonymous }) => {
            let messages = std::mem::take(&mut next.feedback_buffer);
            next.reset(root);
            if messages.is_empty() {
                return show(next, root, None);
            }
            let author = (!anonymous).then(|| ctx.user.display_name());
            show(next, root, Some(Notice::FeedbackThanks))
                .with_effect(Effect::ForwardFeedback { author, messages })
        }

        (ChatState::CollectingFeedback, _) => {
            TransitionResult::new(next, Outcome::FeedbackContinue)
        }

        (_, Event::EnterAdmin) if ctx.user.privileged => {
            next.state = ChatState::AdminMenu;
            next.shortlist.clear();
            TransitionResult::new(next, Outcome::AdminMenu)
        }

        (ChatState::AdminMenu, Event::Reload) => {
            TransitionResult::new(next, Outcome::ReloadRequested)
        }

        (ChatState::AdminMenu, Event::ShowStatistics) => {
            TransitionResult::new(next, Outcome::Statistics)
        }

        (_, Event::SelectNode(name)) => select(next, &name, None, ctx),

        (_, Event::FreeText(query)) => free_text(next, query, ctx),

        (ChatState::Choosing | ChatState::SearchFailed, Event::Back) => {
            next.back();
            let top = next.current_node.clone();
            show(next, &top, None)
        }

        (_, _) => redisplay(next),
    }
}

fn show(session: NavigationSession, node: &str, notice: Option<Notice>) -> TransitionResult {
    TransitionResult::new(
        session,
        Outcome::Node {
            node: node.to_string(),
            notice,
        },
    )
    .with_effect(Effect::RecordInteraction {
        node: node.to_string(),
    })
}

fn select(
    mut session: NavigationSession,
    name: &str,
    notice: Option<Notice>,
    ctx: &TransitionContext<'_>,
) -> TransitionResult {
    // A button from a keyboard built before the last reload.
    if !ctx.graph.contains(name) {
        return TransitionResult::new(session, Outcome::DataRefreshed);
    }
    session.select(name);
    show(session, name, notice)
}

fn free_text(
    mut session: NavigationSession,
    query: String,
    ctx: &TransitionContext<'_>,
) -> TransitionResult {
    if let Some(name) = ctx.graph.resolve(&query) {
        let name = name.to_string();
        return select(session, &name, None, ctx);
    }

    let hits = ctx.index.search(&query);
    let searched = Effect::RecordSearch {
        query,
        results: hits.len(),
    };

    match hits.as_slice() {
        [] => {
            session.state = ChatState::SearchFailed;
            session.shortlist.clear();
            TransitionResult::new(session, Outcome::NoResults).with_effect(searched)
        }
        [only] => {
            let name = only.node.clone();
            let mut result = select(session, &name, Some(Notice::SingleResult), ctx);
            result.effects.insert(0, searched);
            result
        }
        many => {
            let candidates: Vec<String> = many
                .iter()
                .take(ctx.shortlist_limit.max(1))
                .map(|hit| hit.node.clone())
                .collect();
            session.state = ChatState::Choosing;
            session.shortlist = candidates.clone();
            TransitionResult::new(session, Outcome::Shortlist(candidates)).with_effect(searched)
        }
    }
}

/// Show the current state again without changing it.
fn redisplay(session: NavigationSession) -> TransitionResult {
    let outcome = match session.state {
        ChatState::Choosing if !session.shortlist.is_empty() => {
            Outcome::Shortlist(session.shortlist.clone())
        }
        ChatState::Choosing => Outcome::Node {
            node: session.current_node.clone(),
            notice: None,
        },
        ChatState::SearchFailed => Outcome::NoResults,
        ChatState::AdminMenu => Outcome::AdminMenu,
        ChatState::CollectingFeedback => Outcome::FeedbackContinue,
    };
    TransitionResult::new(session, outcome)
}
