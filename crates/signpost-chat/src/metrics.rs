//! Metrics collector interface.

use signpost_core::types::UserId;

/// Receives interaction events from the engine.
///
/// Calls are fire-and-forget: implementations must not fail the
/// conversation, so nothing here returns a `Result`.
pub trait MetricsCollector: Send + Sync {
    fn record_interaction(&self, user_id: UserId, node: &str);

    fn record_search(&self, user_id: UserId, query: &str, result_count: usize);

    /// The conversation was reloaded by `reloader`.
    fn conversation_reloaded(&self, _reloader: &str) {}

    /// Human-readable report for the admin menu, if this collector keeps one.
    fn report(&self) -> Option<String> {
        None
    }
}

/// Collector that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMetrics;

impl MetricsCollector for NullMetrics {
    fn record_interaction(&self, _user_id: UserId, _node: &str) {}

    fn record_search(&self, _user_id: UserId, _query: &str, _result_count: usize) {}
}
