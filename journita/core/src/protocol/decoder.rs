//! Frame Decoder
//!
//! Push-based state machine that turns arbitrarily split byte chunks into an
//! ordered sequence of [`Frame`]s.
//!
//! # Buffering
//!
//! ```text
//!  chunk ──► Utf8Decoder ──► pending line ──split on '\n'──► parse_line ──► ready queue
//!            (carries split    (one partial line,             (Data / Terminal /
//!             characters)       never parsed early)            Malformed)
//! ```
//!
//! Once a `Terminal` frame is decoded the decoder stops: remaining lines in
//! the same chunk and every later chunk are ignored.

use std::collections::VecDeque;

use super::frame::{parse_line, Frame};
use super::utf8::Utf8Decoder;
use crate::error::TextDecodeError;

/// Minimum capacity of the pending line buffer
const MIN_BUFFER_CAPACITY: usize = 1024;

/// Decoder state for one streaming session
#[derive(Debug)]
pub struct FrameDecoder {
    text: Utf8Decoder,
    /// Text after the last line terminator (the PendingLine buffer)
    pending: String,
    /// Prefix of `pending` already searched for a line terminator
    scanned: usize,
    /// Frames decoded but not yet taken
    ready: VecDeque<Frame>,
    /// Set once `[DONE]` has been decoded
    terminated: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder with an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: Utf8Decoder::new(),
            pending: String::with_capacity(MIN_BUFFER_CAPACITY),
            scanned: 0,
            ready: VecDeque::new(),
            terminated: false,
        }
    }

    /// Append a chunk of bytes and decode every line it completes
    ///
    /// # Errors
    ///
    /// Returns [`TextDecodeError`] if the bytes are not valid UTF-8. Lines
    /// completed by the text before the invalid sequence are still decoded
    /// and remain available through [`FrameDecoder::next_frame`]. The
    /// decoder should not be pushed to after an error.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), TextDecodeError> {
        if self.terminated {
            return Ok(());
        }

        let (text, error) = self.text.decode_prefix(chunk);
        self.pending.push_str(&text);
        self.split_lines();

        match error {
            // Invalid bytes after the sentinel are never looked at
            Some(_) if self.terminated => Ok(()),
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn split_lines(&mut self) {
        while let Some(offset) = self.pending[self.scanned..].find('\n') {
            let pos = self.scanned + offset;
            let line: String = self.pending.drain(..=pos).collect();
            self.scanned = 0;
            self.process_line(&line[..pos]);
            if self.terminated {
                self.pending.clear();
                return;
            }
        }
        self.scanned = self.pending.len();
    }

    /// Signal end of data, decoding any unterminated final line
    ///
    /// An empty remainder is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`TextDecodeError::Truncated`] if the input ended inside a
    /// multi-byte character.
    pub fn finish(&mut self) -> Result<(), TextDecodeError> {
        if self.terminated {
            return Ok(());
        }

        self.text.finish()?;
        let remainder = std::mem::take(&mut self.pending);
        self.scanned = 0;
        if !remainder.is_empty() {
            self.process_line(&remainder);
        }
        Ok(())
    }

    /// Take the next decoded frame, in arrival order
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.ready.pop_front()
    }

    /// Whether the terminal sentinel has been seen
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Bytes of text held in the partial line buffer
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of decoded frames waiting to be taken
    #[must_use]
    pub fn available(&self) -> usize {
        self.ready.len()
    }

    fn process_line(&mut self, line: &str) {
        let Some(frame) = parse_line(line) else {
            return;
        };
        tracing::trace!(?frame, "Decoded frame");
        if frame.is_terminal() {
            self.terminated = true;
        }
        self.ready.push_back(frame);
    }
}

/// Decode a complete byte sequence in one go
///
/// # Errors
///
/// Returns [`TextDecodeError`] if the bytes are not valid UTF-8.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Frame>, TextDecodeError> {
    let mut decoder = FrameDecoder::new();
    decoder.push(bytes)?;
    decoder.finish()?;
    Ok(std::iter::from_fn(|| decoder.next_frame()).collect())
}
