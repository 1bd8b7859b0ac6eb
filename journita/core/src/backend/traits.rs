//! Chat Backend Traits
//!
//! The seam between a surface and whatever serves the conversation. A
//! surface only needs to start an exchange, optionally fall back to a
//! one-shot reply, and probe reachability.

use async_trait::async_trait;

use crate::aggregator::ChatStream;
use crate::error::ChatError;
use crate::messages::ChatRequest;

/// Result of a single reachability probe
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// The backend answered with a success status
    Connected,
    /// The backend could not be reached or answered with a failure
    Error(String),
}

impl ConnectionStatus {
    /// Whether the probe succeeded
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "Backend connected successfully"),
            Self::Error(reason) => write!(f, "{reason}"),
        }
    }
}

/// Chat backend trait
///
/// Implement this trait to serve conversations from a different source.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Probe the backend once
    async fn health_check(&self) -> ConnectionStatus;

    /// Start one streaming exchange
    ///
    /// Resolves once the response headers are in; deltas are pulled from
    /// the returned [`ChatStream`].
    async fn begin(&self, request: &ChatRequest) -> Result<ChatStream, ChatError>;

    /// Send a request and wait for the complete reply (non-streaming)
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_status_display() {
        assert!(ConnectionStatus::Connected.is_connected());
        assert_eq!(
            ConnectionStatus::Connected.to_string(),
            "Backend connected successfully"
        );

        let status = ConnectionStatus::Error("Backend responded with status: 503".to_string());
        assert!(!status.is_connected());
        assert_eq!(status.to_string(), "Backend responded with status: 503");
    }
}
