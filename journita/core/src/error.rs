//! Error Types
//!
//! Failures a caller of the streaming client can observe.
//!
//! # Propagation
//!
//! - Decode-level anomalies (a single unparseable `data:` line) never leave
//!   the protocol layer; see [`crate::protocol::frame`].
//! - Channel-level anomalies always escape as a [`ChatError`]:
//!   - [`ConnectionError`] before any delta is produced
//!   - [`StreamError`] as the final item of a delta stream

use thiserror::Error;

/// Boxed error from an arbitrary byte source
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error for one chat exchange
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request could not be issued or was refused
    #[error("connection failed: {0}")]
    Connection(#[from] ConnectionError),

    /// The response channel faulted after streaming began
    #[error("stream failed: {0}")]
    Stream(#[from] StreamError),
}

impl ChatError {
    /// Whether this error happened before any delta could be produced
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Whether this error ended an already-started stream
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// HTTP status of a refused request, if that is what happened
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Connection(ConnectionError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while issuing the outbound request
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Transport-level failure (DNS, refused connection, TLS, client setup)
    #[error("request could not be sent: {0}")]
    Request(#[source] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server responded with {status}: {reason}")]
    Status {
        /// HTTP status code
        status: reqwest::StatusCode,
        /// Response body, or the canonical reason when the body is empty
        reason: String,
    },

    /// A non-streaming response body could not be understood
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Errors that terminate a delta stream that had already begun
#[derive(Debug, Error)]
pub enum StreamError {
    /// The underlying channel reported a fault
    #[error("channel fault: {0}")]
    Channel(#[source] BoxError),

    /// The byte stream is not valid UTF-8 text
    #[error(transparent)]
    Decode(#[from] TextDecodeError),
}

/// UTF-8 decoding failures that cannot be explained by a chunk boundary
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TextDecodeError {
    /// An invalid byte sequence was found
    #[error("invalid UTF-8 sequence at stream offset {offset}")]
    Invalid {
        /// Offset of the offending byte from the start of the stream
        offset: usize,
    },

    /// The stream ended in the middle of a multi-byte character
    #[error("stream ended inside a multi-byte character ({pending} byte(s) pending)")]
    Truncated {
        /// Bytes of the incomplete character
        pending: usize,
    },
}
