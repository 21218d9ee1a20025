//! Conversation engine: central coordinator wiring sessions, snapshots and
//! collaborators around the pure transition function.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use signpost_core::config::MessagesConfig;
use signpost_core::types::{UserContext, UserId};

use crate::error::{ChatError, ForwardError, SessionStoreError};
use crate::event::{Event, EventClassifier};
use crate::forward::{ErrorReport, FeedbackEnvelope, FeedbackForwarder};
use crate::keyboard::{menu_choices, menu_facts, Keyboard};
use crate::metrics::MetricsCollector;
use crate::reply::{render_answers, RenderItem, Reply};
use crate::session::NavigationSession;
use crate::snapshot::{Snapshot, SnapshotHandle};
use crate::store::SessionStore;
use crate::transition::{transition, Effect, Notice, Outcome, TransitionContext};

/// Processes inbound events for any number of users.
///
/// Events for different users may be handled concurrently; events for the
/// same user must be serialized by the caller.
pub struct ConversationEngine {
    snapshots: Arc<SnapshotHandle>,
    sessions: Arc<dyn SessionStore>,
    metrics: Arc<dyn MetricsCollector>,
    forwarder: Arc<dyn FeedbackForwarder>,
    classifier: EventClassifier,
    shortlist_limit: usize,
}

impl ConversationEngine {
    pub fn new(
        snapshots: Arc<SnapshotHandle>,
        sessions: Arc<dyn SessionStore>,
        metrics: Arc<dyn MetricsCollector>,
        forwarder: Arc<dyn FeedbackForwarder>,
        messages: MessagesConfig,
        shortlist_limit: usize,
    ) -> Self {
        Self {
            snapshots,
            sessions,
            metrics,
            forwarder,
            classifier: EventClassifier::new(messages),
            shortlist_limit,
        }
    }

    pub fn snapshots(&self) -> &Arc<SnapshotHandle> {
        &self.snapshots
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsCollector> {
        &self.metrics
    }

    pub fn messages(&self) -> &MessagesConfig {
        self.classifier.messages()
    }

    /// Classify raw user text and process it.
    pub fn handle_text(&self, user: &UserContext, text: &str) -> Result<Reply, ChatError> {
        let snapshot = self.snapshots.current()?;
        let session = self.load_session(user.user_id, &snapshot)?;
        let event = self
            .classifier
            .classify(text, session.state, &snapshot.graph, user.privileged);
        self.process(&snapshot, user, session, event)
    }

    /// Process an already classified event.
    pub fn handle_event(&self, user: &UserContext, event: Event) -> Result<Reply, ChatError> {
        let snapshot = self.snapshots.current()?;
        let session = self.load_session(user.user_id, &snapshot)?;
        self.process(&snapshot, user, session, event)
    }

    /// The stored session of `user`, or a fresh one at the root.
    pub fn session(&self, user_id: UserId) -> Result<NavigationSession, ChatError> {
        let snapshot = self.snapshots.current()?;
        self.load_session(user_id, &snapshot)
    }

    /// Run one transition against `snapshot` and execute its effects,
    /// without touching the session store.
    pub fn apply(
        &self,
        snapshot: &Snapshot,
        user: &UserContext,
        session: &NavigationSession,
        event: Event,
    ) -> Result<(NavigationSession, Reply), ChatError> {
        let ctx = TransitionContext {
            graph: &snapshot.graph,
            index: &snapshot.index,
            user,
            shortlist_limit: self.shortlist_limit,
        };

        debug!(user_id = user.user_id, state = %session.state, ?event, "Handling event");
        let result = transition(session, event, &ctx);
        for effect in result.effects {
            self.run_effect(user, effect);
        }

        let reply = self.render(snapshot, user, &result.session, &result.outcome)?;
        Ok((result.session, reply))
    }

    /// Answer a failed event with the generic apology and force the user's
    /// session back to the root.
    ///
    /// `update` is the inbound text that failed. It is reported to the
    /// operators' channel together with the stored session and the error.
    pub fn recover(&self, user: &UserContext, update: &str, err: &ChatError) -> Reply {
        error!(user_id = user.user_id, error = %err, "Failed to handle message");

        let stored = match self.sessions.get(user.user_id) {
            Ok(Some(blob)) => blob,
            Ok(None) => "(no session)".to_string(),
            Err(e) => format!("(unreadable: {})", e),
        };
        let report = ErrorReport::new(user.display_name(), update, &stored, &err.to_string());
        match self.forwarder.report_error(report) {
            Ok(()) => debug!(user_id = user.user_id, "Error report forwarded"),
            Err(ForwardError::NoChannel) => {}
            Err(e) => warn!(
                user_id = user.user_id,
                error = %e,
                "Error report could not be forwarded"
            ),
        }

        let session = NavigationSession::new(self.snapshots.root());
        if let Err(e) = self.save_session(user.user_id, &session) {
            warn!(user_id = user.user_id, error = %e, "Could not reset session after failure");
        }
        Reply {
            items: vec![RenderItem::Text(self.messages().error_occurred.clone())],
            keyboard: Keyboard {
                choices: vec![],
                facts: menu_facts(&session, user.privileged, true),
            },
            reload_requested: false,
        }
    }

    fn process(
        &self,
        snapshot: &Snapshot,
        user: &UserContext,
        session: NavigationSession,
        event: Event,
    ) -> Result<Reply, ChatError> {
        let (next, reply) = self.apply(snapshot, user, &session, event)?;
        if next != session {
            debug!(
                user_id = user.user_id,
                state = %next.state,
                node = %next.current_node,
                depth = next.depth(),
                "Session updated"
            );
        }
        self.save_session(user.user_id, &next)?;
        Ok(reply)
    }

    fn run_effect(&self, user: &UserContext, effect: Effect) {
        match effect {
            Effect::RecordInteraction { node } => {
                self.metrics.record_interaction(user.user_id, &node);
            }
            Effect::RecordSearch { query, results } => {
                self.metrics.record_search(user.user_id, &query, results);
            }
            Effect::ForwardFeedback { author, messages } => {
                let count = messages.len();
                let envelope = FeedbackEnvelope {
                    author,
                    messages,
                    sent_at: Utc::now(),
                };
                match self.forwarder.forward(envelope) {
                    Ok(()) => debug!(user_id = user.user_id, messages = count, "Feedback forwarded"),
                    Err(e) => warn!(
                        user_id = user.user_id,
                        messages = count,
                        error = %e,
                        "Feedback could not be forwarded"
                    ),
                }
            }
        }
    }

    fn render(
        &self,
        snapshot: &Snapshot,
        user: &UserContext,
        session: &NavigationSession,
        outcome: &Outcome,
    ) -> Result<Reply, ChatError> {
        let m = self.messages();
        let mut choices = menu_choices(session, &snapshot.graph);
        let mut restart_only = false;
        let mut reload_requested = false;

        let items = match outcome {
            Outcome::Node { node, notice } => {
                let node = snapshot.graph.require(node)?;
                let mut items = Vec::new();
                match notice {
                    Some(Notice::SingleResult) => {
                        items.push(RenderItem::Text(m.single_search_result(&node.name)));
                    }
                    Some(Notice::FeedbackThanks) => {
                        items.push(RenderItem::Text(m.thank_for_feedback.clone()));
                    }
                    None => {}
                }
                items.extend(render_answers(&node.answers, &m.prompt_reply));
                items
            }
            Outcome::Shortlist(candidates) => {
                choices = candidates.clone();
                vec![RenderItem::Text(m.search_result_header.clone())]
            }
            Outcome::NoResults => vec![RenderItem::Text(m.empty_search_results.clone())],
            Outcome::FeedbackPrompt => {
                choices.clear();
                vec![RenderItem::Text(m.prompt_feedback.clone())]
            }
            Outcome::FeedbackContinue => {
                choices.clear();
                vec![RenderItem::Text(m.continue_feedback.clone())]
            }
            Outcome::AdminMenu => {
                choices.clear();
                vec![RenderItem::Text(m.admin_prompt.clone())]
            }
            Outcome::ReloadRequested => {
                choices.clear();
                reload_requested = true;
                vec![]
            }
            Outcome::Statistics => {
                choices.clear();
                let report = self
                    .metrics
                    .report()
                    .unwrap_or_else(|| m.statistics_unavailable.clone());
                vec![RenderItem::Text(report)]
            }
            Outcome::DataRefreshed => {
                warn!(
                    user_id = user.user_id,
                    node = %session.current_node,
                    revision = %snapshot.revision,
                    "Session refers to nodes missing from the active conversation"
                );
                choices.clear();
                restart_only = true;
                vec![RenderItem::Text(m.data_refreshed.clone())]
            }
        };

        Ok(Reply {
            items,
            keyboard: Keyboard {
                choices,
                facts: menu_facts(session, user.privileged, restart_only),
            },
            reload_requested,
        })
    }

    fn load_session(
        &self,
        user_id: UserId,
        snapshot: &Snapshot,
    ) -> Result<NavigationSession, ChatError> {
        let fresh = || NavigationSession::new(snapshot.graph.root());
        let Some(blob) = self.sessions.get(user_id)? else {
            return Ok(fresh());
        };
        match serde_json::from_str::<NavigationSession>(&blob) {
            Ok(session) if !session.nav_stack.is_empty() => Ok(session),
            Ok(_) => {
                warn!(user_id, "Stored session has an empty stack, starting fresh");
                Ok(fresh())
            }
            Err(e) => {
                warn!(user_id, error = %e, "Stored session is unreadable, starting fresh");
                Ok(fresh())
            }
        }
    }

    fn save_session(&self, user_id: UserId, session: &NavigationSession) -> Result<(), ChatError> {
        let blob = serde_json::to_string(session).map_err(SessionStoreError::from)?;
        self.sessions.put(user_id, blob)?;
        Ok(())
    }
}
