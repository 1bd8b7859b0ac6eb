//! Message Accumulator
//!
//! Per-exchange state that concatenates deltas into the growing assistant
//! reply. One accumulator belongs to exactly one in-flight request.
//!
//! # Lifecycle
//!
//! ```text
//! Streaming ──append()*──► Streaming
//!     │
//!     ├── complete() ──► Complete   (terminal frame or channel close)
//!     └── fail()     ──► Failed     (channel fault)
//! ```
//!
//! `Complete` and `Failed` are sealed: the text can no longer change.

use chrono::{DateTime, Utc};

use crate::messages::{ChatMessage, MessageId, MessageRole};

/// Where the accumulator is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Deltas are still arriving
    Streaming,
    /// The stream ended normally
    Complete,
    /// The stream faulted; text holds whatever arrived before the fault
    Failed,
}

/// Append-only text of one reply
#[derive(Clone, Debug)]
pub struct MessageAccumulator {
    id: MessageId,
    author: MessageRole,
    text: String,
    issued_at: DateTime<Utc>,
    state: AccumulatorState,
    deltas: usize,
}

impl MessageAccumulator {
    /// Start an empty message for `author`, stamped now
    #[must_use]
    pub fn new(author: MessageRole) -> Self {
        Self {
            id: MessageId::new(),
            author,
            text: String::new(),
            issued_at: Utc::now(),
            state: AccumulatorState::Streaming,
            deltas: 0,
        }
    }

    /// Start an empty assistant message
    #[must_use]
    pub fn assistant() -> Self {
        Self::new(MessageRole::Assistant)
    }

    /// Rebuild a completed message from an ordered sequence of deltas
    pub fn replay<I, S>(author: MessageRole, deltas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut message = Self::new(author);
        for delta in deltas {
            message.append(delta.as_ref());
        }
        message.complete();
        message
    }

    /// Append one delta
    ///
    /// Returns `false` (and leaves the text unchanged) if the message is
    /// already sealed.
    pub fn append(&mut self, delta: &str) -> bool {
        if self.is_sealed() {
            tracing::warn!(
                message_id = %self.id,
                state = ?self.state,
                "Rejected delta for sealed message"
            );
            return false;
        }
        self.text.push_str(delta);
        self.deltas += 1;
        true
    }

    /// Seal after a normal end of stream
    pub fn complete(&mut self) {
        if self.state == AccumulatorState::Streaming {
            self.state = AccumulatorState::Complete;
        }
    }

    /// Seal after a fault
    pub fn fail(&mut self) {
        if self.state == AccumulatorState::Streaming {
            self.state = AccumulatorState::Failed;
        }
    }

    /// Unique ID of this message
    #[must_use]
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Author, fixed for the accumulator's lifetime
    #[must_use]
    pub fn author(&self) -> MessageRole {
        self.author
    }

    /// Concatenation of every delta appended so far
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// When the request began
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    /// Number of deltas appended
    #[must_use]
    pub fn delta_count(&self) -> usize {
        self.deltas
    }

    /// Whether the text can no longer change
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.state != AccumulatorState::Streaming
    }

    /// Snapshot as a renderable message record
    #[must_use]
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage {
            id: self.id.clone(),
            role: self.author,
            content: self.text.clone(),
            timestamp: self.issued_at,
        }
    }

    /// Consume and return the accumulated text
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_is_empty_and_streaming() {
        let message = MessageAccumulator::assistant();
        assert_eq!(message.author(), MessageRole::Assistant);
        assert_eq!(message.text(), "");
        assert_eq!(message.state(), AccumulatorState::Streaming);
        assert!(!message.is_sealed());
        assert!(message.issued_at() <= Utc::now());
    }

    #[test]
    fn test_append_concatenates_in_order() {
        let mut message = MessageAccumulator::assistant();
        assert!(message.append("Hel"));
        assert!(message.append("lo"));
        assert!(message.append(""));
        assert!(message.append(", Rome ✈️"));
        assert_eq!(message.text(), "Hello, Rome ✈️");
        assert_eq!(message.delta_count(), 4);
    }

    #[test]
    fn test_sealed_after_complete() {
        let mut message = MessageAccumulator::assistant();
        message.append("done");
        message.complete();

        assert!(!message.append(" again"));
        assert_eq!(message.text(), "done");
        assert_eq!(message.state(), AccumulatorState::Complete);

        // A later fault cannot reopen or relabel a completed message
        message.fail();
        assert_eq!(message.state(), AccumulatorState::Complete);
    }

    #[test]
    fn test_failed_keeps_partial_text() {
        let mut message = MessageAccumulator::assistant();
        message.append("Hel");
        message.append("lo");
        message.fail();

        assert_eq!(message.state(), AccumulatorState::Failed);
        assert_eq!(message.text(), "Hello");
        assert!(!message.append("!"));
    }

    #[test]
    fn test_replay_is_deterministic() {
        let deltas = ["Find ", "flights ", "to ", "Paris"];
        let first = MessageAccumulator::replay(MessageRole::Assistant, deltas);
        let second = MessageAccumulator::replay(MessageRole::Assistant, deltas);

        assert_eq!(first.text(), second.text());
        assert_eq!(first.text(), "Find flights to Paris");
        assert_eq!(first.state(), AccumulatorState::Complete);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_to_message_snapshot() {
        let mut message = MessageAccumulator::assistant();
        message.append("partial");
        let snapshot = message.to_message();
        message.append(" more");

        assert_eq!(snapshot.content, "partial");
        assert_eq!(snapshot.role, MessageRole::Assistant);
        assert_eq!(&snapshot.id, message.id());
        assert_eq!(snapshot.timestamp, message.issued_at());
    }
}
