use shared::domain::Message;

use crate::events::Affordance;

/// Append-only render target for the conversation.
pub trait MessageLog {
    fn append(&mut self, message: Message);
    /// Appends a bot message that stands in for an answer still being fetched.
    fn append_placeholder(&mut self, message: Message);
    /// Drops the trailing placeholder. A no-op when the last entry is a real message.
    fn retract_placeholder(&mut self);
}

/// The input widget area. Implementations render; they never decide.
pub trait InputAffordance {
    /// Replaces whatever is mounted with `affordance`.
    fn mount(&mut self, affordance: &Affordance, enabled: bool);
    fn set_enabled(&mut self, enabled: bool);
}

#[derive(Debug, Clone)]
struct Entry {
    message: Message,
    transient: bool,
}

/// In-memory [`MessageLog`].
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().map(|entry| &entry.message)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.messages().map(|message| message.text.as_str()).collect()
    }

    pub fn last(&self) -> Option<&Message> {
        self.entries.last().map(|entry| &entry.message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_placeholder(&self) -> bool {
        self.entries.last().is_some_and(|entry| entry.transient)
    }

    /// Whether the entry at `index` is a placeholder.
    pub fn is_transient(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|entry| entry.transient)
    }
}

impl MessageLog for Transcript {
    fn append(&mut self, message: Message) {
        self.entries.push(Entry {
            message,
            transient: false,
        });
    }

    fn append_placeholder(&mut self, message: Message) {
        self.entries.push(Entry {
            message,
            transient: true,
        });
    }

    fn retract_placeholder(&mut self) {
        if self.has_placeholder() {
            self.entries.pop();
        }
    }
}
