//! Console rendering of replies and keyboards.

use std::path::Path;

use signpost_chat::{ChatState, Keyboard, RenderItem, Reply};
use signpost_core::config::MessagesConfig;

/// Lines printed for the content of a reply.
pub fn reply_lines(reply: &Reply, photo_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for item in &reply.items {
        match item {
            RenderItem::Text(text) => lines.push(text.clone()),
            RenderItem::LinkList(list) => {
                lines.push(list.heading.clone());
                for link in &list.links {
                    lines.push(format!("  - {}: {}", link.label, link.url));
                }
            }
            RenderItem::Venue(venue) => {
                lines.push(venue.title.clone());
                lines.push(format!("  {} ({:.5}, {:.5})", venue.address, venue.lat, venue.lon));
            }
            RenderItem::Photo(id) => {
                lines.push(format!("[photo: {}]", photo_dir.join(id).display()));
            }
        }
    }
    lines
}

/// Button labels offered after a reply: node choices followed by the
/// context-sensitive options.
pub fn keyboard_labels(keyboard: &Keyboard, m: &MessagesConfig) -> Vec<String> {
    let facts = &keyboard.facts;
    if facts.restart_only {
        return vec![m.start_over.clone()];
    }

    match facts.state {
        ChatState::CollectingFeedback => vec![
            m.send_feedback.clone(),
            m.send_feedback_anonymously.clone(),
            m.start_over.clone(),
        ],
        ChatState::AdminMenu => vec![m.reload.clone(), m.statistics.clone(), m.start_over.clone()],
        ChatState::Choosing | ChatState::SearchFailed => {
            let mut labels = keyboard.choices.clone();
            if facts.depth >= 2 {
                labels.push(m.back.clone());
            }
            if !facts.at_root {
                labels.push(m.start_over.clone());
            }
            labels.push(m.feedback.clone());
            if facts.privileged && facts.at_root {
                labels.push(m.admin.clone());
            }
            labels
        }
    }
}
