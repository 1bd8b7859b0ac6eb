//! Message Types
//!
//! Wire bodies exchanged with the chat backend and the message records
//! handed to UI surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reply used by the non-streaming endpoint when neither field is present
pub const NO_RESPONSE_TEXT: &str = "No response received";

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    #[must_use]
    pub fn new() -> Self {
        Self(format!("msg_{}", uuid::Uuid::new_v4().simple()))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input
    User,
    /// Assistant reply
    Assistant,
}

/// Outbound body for both chat endpoints
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's utterance
    pub message: String,
}

impl ChatRequest {
    /// Create a request for one utterance
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of the non-streaming endpoint
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatReply {
    /// Preferred reply field
    #[serde(default)]
    pub response: Option<String>,
    /// Alternate reply field
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatReply {
    /// Reply text: `response`, then `message`, then a fixed placeholder
    ///
    /// Empty strings count as absent.
    #[must_use]
    pub fn into_text(self) -> String {
        self.response
            .filter(|r| !r.is_empty())
            .or(self.message.filter(|m| !m.is_empty()))
            .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string())
    }
}

/// A message as rendered by a surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user message stamped now
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}
