//! Stream Aggregator
//!
//! Presents one request/response exchange to the caller as a lazy sequence
//! of text deltas while folding them into a [`MessageAccumulator`].
//!
//! # Contract
//!
//! - One `Ok(delta)` per `Data` frame, in arrival order
//! - `Malformed` frames are skipped silently
//! - `Terminal` and a plain channel close both end the sequence with `None`
//! - A channel fault ends the sequence with one `Err(ChatError::Stream(..))`;
//!   deltas already yielded stay valid
//! - Dropping a `ChatStream` drops the response body; nothing more is read

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures::stream::FusedStream;
use futures::{Stream, StreamExt};

use crate::accumulator::MessageAccumulator;
use crate::error::{BoxError, ChatError};
use crate::protocol::{Frame, FrameStream};

/// Incremental handle for one streaming reply
#[derive(Debug)]
pub struct ChatStream {
    frames: FrameStream,
    message: MessageAccumulator,
    done: bool,
}

impl ChatStream {
    /// Aggregate deltas from an already-open frame stream
    #[must_use]
    pub fn new(frames: FrameStream) -> Self {
        Self {
            frames,
            message: MessageAccumulator::assistant(),
            done: false,
        }
    }

    /// Aggregate deltas from a raw byte source
    pub fn from_byte_stream<S, B, E>(source: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: Into<Bytes> + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::new(FrameStream::new(source))
    }

    /// The reply as accumulated so far
    #[must_use]
    pub fn message(&self) -> &MessageAccumulator {
        &self.message
    }

    /// Stop streaming and take the reply as accumulated so far
    ///
    /// The response body is released.
    #[must_use]
    pub fn into_message(self) -> MessageAccumulator {
        self.message
    }

    /// Whether the response body is still held
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.frames.is_open()
    }

    /// Drain the remaining deltas and return the sealed reply
    ///
    /// # Errors
    ///
    /// Returns the [`ChatError::Stream`] that ended the stream, if any.
    pub async fn finish(mut self) -> Result<MessageAccumulator, ChatError> {
        while let Some(delta) = self.next().await {
            delta?;
        }
        Ok(self.message)
    }
}

impl Stream for ChatStream {
    type Item = Result<String, ChatError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            match ready!(this.frames.poll_next_unpin(cx)) {
                Some(Ok(Frame::Data(delta))) => {
                    this.message.append(&delta);
                    return Poll::Ready(Some(Ok(delta)));
                }
                Some(Ok(Frame::Malformed)) => {}
                Some(Ok(Frame::Terminal)) | None => {
                    this.done = true;
                    this.message.complete();
                    tracing::debug!(
                        message_id = %this.message.id(),
                        deltas = this.message.delta_count(),
                        bytes = this.message.text().len(),
                        "Stream completed"
                    );
                }
                Some(Err(e)) => {
                    this.done = true;
                    this.message.fail();
                    tracing::debug!(
                        message_id = %this.message.id(),
                        deltas = this.message.delta_count(),
                        error = %e,
                        "Stream failed"
                    );
                    return Poll::Ready(Some(Err(e.into())));
                }
            }
        }
    }
}

impl FusedStream for ChatStream {
    fn is_terminated(&self) -> bool {
        self.done
    }
}
