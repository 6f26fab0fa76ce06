use std::time::Duration;

/// Time a message stays visible unless stated otherwise.
pub const MESSAGE_TTL: Duration = Duration::from_secs(2);

/// Transient, display-only notice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    text: String,
    remaining: Duration,
}

impl Message {
    /// Text shown to the player.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Time left before the message disappears.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }
}

/// Ordered collection of messages that expire with wall-clock time.
#[derive(Clone, Debug, Default)]
pub struct MessageBoard {
    messages: Vec<Message>,
}

impl MessageBoard {
    /// Posts a message that lives for `ttl`.
    pub fn post(&mut self, text: impl Into<String>, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        self.messages.push(Message {
            text: text.into(),
            remaining: ttl,
        });
    }

    /// Ages every message by `dt` and drops the expired ones.
    pub fn tick(&mut self, dt: Duration) {
        for message in &mut self.messages {
            message.remaining = message.remaining.saturating_sub(dt);
        }
        self.messages.retain(|message| !message.remaining.is_zero());
    }

    /// Messages from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Most recently posted message that is still visible.
    #[must_use]
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Reports whether no message is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
