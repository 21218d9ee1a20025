//! Abstract render instructions handed to the transport.

use serde::{Deserialize, Serialize};

use signpost_graph::{Answer, LinkList, Venue};

use crate::keyboard::Keyboard;

/// One outbound content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderItem {
    Text(String),
    LinkList(LinkList),
    Venue(Venue),
    /// Identifier for the media store.
    Photo(String),
}

impl From<&Answer> for RenderItem {
    fn from(answer: &Answer) -> Self {
        match answer {
            Answer::Text(text) => RenderItem::Text(text.clone()),
            Answer::LinkList(list) => RenderItem::LinkList(list.clone()),
            Answer::Venue(venue) => RenderItem::Venue(venue.clone()),
            Answer::Photo(id) => RenderItem::Photo(id.clone()),
        }
    }
}

/// Everything produced for one inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub items: Vec<RenderItem>,
    pub keyboard: Keyboard,
    /// An admin asked for the conversation to be reloaded.
    #[serde(default)]
    pub reload_requested: bool,
}

impl Reply {
    /// Text of every `Text` item, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                RenderItem::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Render a node's answers.
///
/// All but the last are rendered as they are, skipping empty text. The
/// last one closes the reply: an empty text becomes `prompt`, a non-text
/// answer is followed by `prompt`.
pub fn render_answers(answers: &[Answer], prompt: &str) -> Vec<RenderItem> {
    let Some((last, rest)) = answers.split_last() else {
        return vec![RenderItem::Text(prompt.to_string())];
    };

    let mut items: Vec<RenderItem> = rest
        .iter()
        .filter(|a| !a.is_empty_text())
        .map(RenderItem::from)
        .collect();

    match last {
        Answer::Text(_) if last.is_empty_text() => items.push(RenderItem::Text(prompt.to_string())),
        Answer::Text(text) => items.push(RenderItem::Text(text.clone())),
        other => {
            items.push(RenderItem::from(other));
            items.push(RenderItem::Text(prompt.to_string()));
        }
    }
    items
}
