//! Feedback and error-report forwarding interface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ForwardError;

/// Feedback collected from one user, ready to relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEnvelope {
    /// Display name of the sender, `None` when sent anonymously.
    pub author: Option<String>,
    pub messages: Vec<String>,
    pub sent_at: DateTime<Utc>,
}

impl FeedbackEnvelope {
    /// Plain-text form suitable for a chat channel.
    pub fn render(&self) -> String {
        let header = match &self.author {
            Some(author) => format!("Feedback from {}:", author),
            None => "Anonymous feedback:".to_string(),
        };
        let mut out = header;
        for message in &self.messages {
            out.push('\n');
            out.push_str(message);
        }
        out
    }
}

/// Longest section of an [`ErrorReport`], in characters.
pub const MAX_REPORT_SECTION_CHARS: usize = 4000;

/// An event the engine failed to handle, for the operators' channel.
///
/// Each section is cut to [`MAX_REPORT_SECTION_CHARS`] so a report always
/// fits in a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub user: String,
    /// The inbound text that failed.
    pub update: String,
    /// The user's stored session blob at the time of the failure.
    pub session: String,
    pub error: String,
    pub raised_at: DateTime<Utc>,
}

impl ErrorReport {
    pub fn new(user: String, update: &str, session: &str, error: &str) -> Self {
        Self {
            user,
            update: truncate_chars(update, MAX_REPORT_SECTION_CHARS),
            session: truncate_chars(session, MAX_REPORT_SECTION_CHARS),
            error: truncate_chars(error, MAX_REPORT_SECTION_CHARS),
            raised_at: Utc::now(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "An error occurred while handling a message from {}:\nUpdate:\n{}\nSession:\n{}\nError:\n{}",
            self.user, self.update, self.session, self.error
        )
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Relays feedback and error reports to wherever the operators read them.
///
/// Must not block: implementations hand the item off and return.
pub trait FeedbackForwarder: Send + Sync {
    fn forward(&self, envelope: FeedbackEnvelope) -> Result<(), ForwardError>;

    fn report_error(&self, report: ErrorReport) -> Result<(), ForwardError>;
}

/// Forwarder used when no feedback channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChannelForwarder;

impl FeedbackForwarder for NoChannelForwarder {
    fn forward(&self, _envelope: FeedbackEnvelope) -> Result<(), ForwardError> {
        Err(ForwardError::NoChannel)
    }

    fn report_error(&self, _report: ErrorReport) -> Result<(), ForwardError> {
        Err(ForwardError::NoChannel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(author: Option<&str>) -> FeedbackEnvelope {
        FeedbackEnvelope {
            author: author.map(str::to_string),
            messages: vec!["The hotline number is outdated.".to_string(), "Thanks!".to_string()],
            sent_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_named() {
        assert_eq!(
            envelope(Some("@olena")).render(),
            "Feedback from @olena:\nThe hotline number is outdated.\nThanks!"
        );
    }

    #[test]
    fn test_render_anonymous() {
        assert!(envelope(None).render().starts_with("Anonymous feedback:\n"));
    }

    #[test]
    fn test_no_channel_forwarder_fails() {
        assert_eq!(
            NoChannelForwarder.forward(envelope(None)),
            Err(ForwardError::NoChannel)
        );
        let report = ErrorReport::new("user 1".to_string(), "Health", "{}", "boom");
        assert_eq!(NoChannelForwarder.report_error(report), Err(ForwardError::NoChannel));
    }

    #[test]
    fn test_error_report_sections_are_truncated() {
        let long = "ё".repeat(MAX_REPORT_SECTION_CHARS + 10);
        let report = ErrorReport::new("@olena".to_string(), &long, "{}", "lock poisoned");
        assert_eq!(report.update.chars().count(), MAX_REPORT_SECTION_CHARS);
        assert_eq!(report.session, "{}");
        assert_eq!(report.error, "lock poisoned");
    }

    #[test]
    fn test_error_report_render() {
        let report = ErrorReport::new("@olena".to_string(), "Masks", r#"{"state":"choosing"}"#, "boom");
        assert_eq!(
            report.render(),
            "An error occurred while handling a message from @olena:\nUpdate:\nMasks\nSession:\n{\"state\":\"choosing\"}\nError:\nboom"
        );
    }
}
