//! Feedback relay: hands envelopes and error reports from the engine to a
//! background task that delivers them to the configured channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use signpost_chat::{ErrorReport, FeedbackEnvelope, FeedbackForwarder, ForwardError};

/// Queue depth before forwarding starts failing with [`ForwardError::Full`].
const RELAY_CAPACITY: usize = 64;

/// How long shutdown waits for queued items to be delivered.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// One item queued for the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Feedback(FeedbackEnvelope),
    Error(ErrorReport),
}

/// Forwarder that enqueues items for the relay task without blocking.
#[derive(Debug, Clone)]
pub struct ChannelForwarder {
    tx: mpsc::Sender<Dispatch>,
}

impl ChannelForwarder {
    fn enqueue(&self, item: Dispatch) -> Result<(), ForwardError> {
        self.tx.try_send(item).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ForwardError::Full,
            mpsc::error::TrySendError::Closed(_) => ForwardError::Closed,
        })
    }
}

impl FeedbackForwarder for ChannelForwarder {
    fn forward(&self, envelope: FeedbackEnvelope) -> Result<(), ForwardError> {
        self.enqueue(Dispatch::Feedback(envelope))
    }

    fn report_error(&self, report: ErrorReport) -> Result<(), ForwardError> {
        self.enqueue(Dispatch::Error(report))
    }
}

/// Start the relay task for `channel` and return the forwarder feeding it.
///
/// The console has no chat transport, so delivery means logging the
/// rendered item against the channel name. The task runs until every
/// forwarder is dropped and the queue is empty, then yields the number of
/// items it delivered.
pub fn spawn(channel: String) -> (ChannelForwarder, JoinHandle<usize>) {
    let (tx, mut rx) = mpsc::channel::<Dispatch>(RELAY_CAPACITY);
    let handle = tokio::spawn(async move {
        tracing::info!(channel = %channel, "Feedback relay started");
        let mut delivered = 0;
        while let Some(item) = rx.recv().await {
            match item {
                Dispatch::Feedback(envelope) => tracing::info!(
                    channel = %channel,
                    anonymous = envelope.author.is_none(),
                    messages = envelope.messages.len(),
                    sent_at = %envelope.sent_at,
                    "Feedback relayed:\n{}",
                    envelope.render()
                ),
                Dispatch::Error(report) => tracing::info!(
                    channel = %channel,
                    raised_at = %report.raised_at,
                    "Error report relayed:\n{}",
                    report.render()
                ),
            }
            delivered += 1;
        }
        tracing::info!(channel = %channel, delivered, "Feedback relay stopped");
        delivered
    });
    (ChannelForwarder { tx }, handle)
}

/// Wait for the relay to deliver what is still queued.
///
/// Every [`ChannelForwarder`] must be dropped first, or this waits out the
/// whole timeout.
pub async fn drain(handle: JoinHandle<usize>, timeout: Duration) {
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(delivered)) => tracing::debug!(delivered, "Feedback relay drained"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Feedback relay task failed"),
        Err(_) => tracing::warn!(
            timeout_secs = timeout.as_secs(),
            "Feedback relay did not drain in time, queued items may be lost"
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn envelope() -> FeedbackEnvelope {
        FeedbackEnvelope {
            author: None,
            messages: vec!["hello".to_string()],
            sent_at: Utc::now(),
        }
    }

    fn report() -> ErrorReport {
        ErrorReport::new("user 1".to_string(), "Health", "{}", "boom")
    }

    #[tokio::test]
    async fn test_forward_reaches_relay() {
        let (tx, mut rx) = mpsc::channel(2);
        let forwarder = ChannelForwarder { tx };
        forwarder.forward(envelope()).unwrap();
        forwarder.report_error(report()).unwrap();

        let Some(Dispatch::Feedback(first)) = rx.recv().await else {
            panic!("expected feedback first");
        };
        assert_eq!(first.messages, vec!["hello"]);
        let Some(Dispatch::Error(second)) = rx.recv().await else {
            panic!("expected an error report second");
        };
        assert_eq!(second.update, "Health");
    }

    #[tokio::test]
    async fn test_full_and_closed_queues() {
        let (tx, rx) = mpsc::channel(1);
        let forwarder = ChannelForwarder { tx };
        forwarder.forward(envelope()).unwrap();
        assert_eq!(forwarder.forward(envelope()), Err(ForwardError::Full));
        assert_eq!(forwarder.report_error(report()), Err(ForwardError::Full));

        drop(rx);
        assert_eq!(forwarder.forward(envelope()), Err(ForwardError::Closed));
    }

    #[tokio::test]
    async fn test_queued_items_delivered_after_forwarder_dropped() {
        let (forwarder, handle) = spawn("operators".to_string());
        forwarder.forward(envelope()).unwrap();
        forwarder.forward(envelope()).unwrap();
        forwarder.report_error(report()).unwrap();
        drop(forwarder);
        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_drain_waits_for_relay() {
        let (forwarder, handle) = spawn("operators".to_string());
        forwarder.forward(envelope()).unwrap();
        drop(forwarder);
        drain(handle, DRAIN_TIMEOUT).await;
    }

    #[tokio::test]
    async fn test_drain_gives_up_while_forwarder_alive() {
        let (forwarder, handle) = spawn("operators".to_string());
        drain(handle, Duration::from_millis(20)).await;
        // The relay is still waiting for input.
        assert!(forwarder.forward(envelope()).is_ok());
    }
}
