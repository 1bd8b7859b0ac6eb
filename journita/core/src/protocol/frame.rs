//! Frame Parsing
//!
//! One protocol line becomes at most one [`Frame`].
//!
//! # Line Format
//!
//! ```text
//! data: {"message":"Hel"}     -> Frame::Data("Hel")
//! data: [DONE]                -> Frame::Terminal
//! data: not-json              -> Frame::Malformed
//! : keep-alive                -> (ignored)
//! ```

use thiserror::Error;

/// Prefix carried by every event-data line
pub const DATA_PREFIX: &str = "data: ";

/// Literal payload marking the explicit end of the stream
pub const TERMINAL_SENTINEL: &str = "[DONE]";

/// A decoded protocol unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// A textual delta extracted from the JSON envelope
    Data(String),
    /// Explicit end-of-stream sentinel
    Terminal,
    /// A data line whose payload could not be understood (skipped)
    Malformed,
}

impl Frame {
    /// The delta carried by a `Data` frame
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Data(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this frame ends the stream
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

/// Field of the JSON envelope holding the delta
const MESSAGE_FIELD: &str = "message";

/// Why a data line was not turned into a `Data` frame
#[derive(Debug, Error)]
pub(crate) enum FrameParseError {
    /// Payload is not JSON
    #[error("payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON without a string `message` field on a top-level object
    #[error("envelope has no string `message` field")]
    MissingMessage,
}

/// Extract the delta from an envelope; unknown fields are ignored
fn parse_envelope(raw: &str) -> Result<String, FrameParseError> {
    let mut envelope: serde_json::Value = serde_json::from_str(raw)?;
    match envelope.get_mut(MESSAGE_FIELD).map(serde_json::Value::take) {
        Some(serde_json::Value::String(message)) => Ok(message),
        _ => Err(FrameParseError::MissingMessage),
    }
}

/// Parse one complete line (without its `\n`)
///
/// Returns `None` for lines that are not event-data lines.
#[must_use]
pub fn parse_line(line: &str) -> Option<Frame> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let raw = line.strip_prefix(DATA_PREFIX)?;

    if raw == TERMINAL_SENTINEL {
        return Some(Frame::Terminal);
    }

    match parse_envelope(raw) {
        Ok(message) => Some(Frame::Data(message)),
        Err(e) => {
            tracing::warn!(error = %e, raw = %raw, "Skipping malformed stream frame");
            Some(Frame::Malformed)
        }
    }
}
