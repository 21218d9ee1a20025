//! Inbound events and their classification from raw text.

use signpost_core::config::MessagesConfig;
use signpost_graph::GraphModel;

use crate::session::ChatState;

/// Command understood by the navigation state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Start over at the root.
    Reset,
    /// Open a node by name.
    SelectNode(String),
    /// Text that is not a menu command; resolved through search.
    FreeText(String),
    Back,
    EnterFeedback,
    AppendFeedback(String),
    SubmitFeedback { anonymous: bool },
    EnterAdmin,
    /// Admin action: rebuild the conversation from its source.
    Reload,
    /// Admin action: show interaction statistics.
    ShowStatistics,
}

impl Event {
    /// Events the stale-node guard does not apply to: they never read the
    /// session's node names.
    pub(crate) fn ignores_stale_nodes(&self) -> bool {
        matches!(
            self,
            Event::Reset | Event::EnterFeedback | Event::AppendFeedback(_) | Event::SubmitFeedback { .. }
        )
    }
}

/// Maps raw user text to an [`Event`], given the labels the user was shown.
#[derive(Debug, Clone)]
pub struct EventClassifier {
    messages: MessagesConfig,
}

/// Text that always restarts the conversation.
pub const START_COMMAND: &str = "/start";

impl EventClassifier {
    pub fn new(messages: MessagesConfig) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &MessagesConfig {
        &self.messages
    }

    pub fn classify(
        &self,
        text: &str,
        state: ChatState,
        graph: &GraphModel,
        privileged: bool,
    ) -> Event {
        let text = text.trim();
        let m = &self.messages;

        if text == START_COMMAND || text == m.start_over {
            return Event::Reset;
        }

        if state == ChatState::CollectingFeedback {
            if text == m.send_feedback {
                return Event::SubmitFeedback { anonymous: false };
            }
            if text == m.send_feedback_anonymously {
                return Event::SubmitFeedback { anonymous: true };
            }
            return Event::AppendFeedback(text.to_string());
        }

        if state == ChatState::AdminMenu {
            if text == m.reload {
                return Event::Reload;
            }
            if text == m.statistics {
                return Event::ShowStatistics;
            }
        }

        if text == m.back {
            Event::Back
        } else if text == m.feedback {
            Event::EnterFeedback
        } else if privileged && text == m.admin {
            Event::EnterAdmin
        } else if let Some(name) = graph.resolve(text) {
            Event::SelectNode(name.to_string())
        } else {
            Event::FreeText(text.to_string())
        }
    }
}
