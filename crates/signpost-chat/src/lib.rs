//! Conversation engine for Signpost.
//!
//! Holds per-user navigation sessions, classifies inbound text into events,
//! runs the navigation state machine against the active conversation
//! snapshot and renders replies for the messaging layer.

pub mod engine;
pub mod error;
pub mod event;
pub mod forward;
pub mod keyboard;
pub mod metrics;
pub mod reply;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod transition;

#[cfg(test)]
mod proptests;

pub use engine::ConversationEngine;
pub use error::{ChatError, ForwardError, ReloadError, SessionStoreError};
pub use event::{Event, EventClassifier, START_COMMAND};
pub use forward::{ErrorReport, FeedbackEnvelope, FeedbackForwarder, NoChannelForwarder};
pub use keyboard::{Keyboard, MenuFacts};
pub use metrics::{MetricsCollector, NullMetrics};
pub use reply::{RenderItem, Reply};
pub use session::{ChatState, NavigationSession};
pub use snapshot::{Snapshot, SnapshotHandle};
pub use stats::{InteractionStats, StatsReport};
pub use store::{MemorySessionStore, NullSessionStore, SessionStore};
pub use transition::{transition, Effect, Outcome, TransitionContext, TransitionResult};
