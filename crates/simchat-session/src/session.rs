use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use simchat_core::{Message, Role};

/// Server-side conversation state keyed by an opaque identifier.
///
/// `messages[0]` is always the system instruction the session was created
/// with; [`Session::push`] never evicts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    max_messages: usize,
}

impl Session {
    /// Creates a session seeded with exactly one system message.
    pub fn new(id: impl Into<String>, system_prompt: &str, max_messages: usize) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: vec![Message::system(system_prompt)],
            created_at: now,
            last_activity: now,
            max_messages: max_messages.max(2),
        }
    }

    /// Appends a message, then trims the history back under the cap.
    pub fn push(&mut self, message: Message) {
        self.last_activity = Utc::now();
        self.messages.push(message);
        self.trim();
    }

    /// When the session was last pushed to or fetched from the store.
    /// The idle sweep reads this.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Sets the activity clock without adding a message.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// The system instruction the session was seeded with.
    pub fn system_message(&self) -> &Message {
        &self.messages[0]
    }

    /// Keeps the system message plus the most recent `max_messages - 1`.
    ///
    /// Tool messages left at the head of the retained tail have lost the
    /// assistant message that requested them, so they go too. That can leave
    /// the count below the cap.
    fn trim(&mut self) {
        if self.messages.len() <= self.max_messages {
            return;
        }
        let excess = self.messages.len() - self.max_messages;
        self.messages.drain(1..=excess);

        let orphans = self.messages[1..]
            .iter()
            .take_while(|m| m.role == Role::Tool)
            .count();
        if orphans > 0 {
            self.messages.drain(1..=orphans);
        }
    }
}
