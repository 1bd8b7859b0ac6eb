//! Frame Stream
//!
//! Drives a [`FrameDecoder`] from an asynchronous byte source.
//!
//! The stream is pull-driven: a read against the source is only issued when
//! the consumer asks for the next frame and no decoded frame is waiting, so
//! there is never more than one read in flight.
//!
//! The byte source is dropped exactly once, as soon as the session is over:
//! on the terminal frame, on end-of-data, on a fault, or when the
//! `FrameStream` itself is dropped by a consumer that stopped early.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures::stream::{BoxStream, FusedStream};
use futures::{Stream, StreamExt, TryStreamExt};

use super::decoder::FrameDecoder;
use super::frame::Frame;
use crate::error::{BoxError, StreamError};

/// Type-erased byte source
type ByteSource = BoxStream<'static, Result<Bytes, BoxError>>;

/// Lazy sequence of frames decoded from a byte source
pub struct FrameStream {
    /// `None` once the source has been released
    source: Option<ByteSource>,
    decoder: FrameDecoder,
    /// Decode failure held back until the frames before it are taken
    fault: Option<StreamError>,
    /// Set after the final item (or error) has been returned
    done: bool,
}

impl std::fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream")
            .field("open", &self.source.is_some())
            .field("decoder", &self.decoder)
            .field("fault", &self.fault)
            .field("done", &self.done)
            .finish()
    }
}

impl FrameStream {
    /// Wrap a stream of byte chunks
    ///
    /// Chunk boundaries may fall anywhere, including inside a line, the
    /// `data: ` prefix, or a multi-byte character.
    pub fn new<S, B, E>(source: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: Into<Bytes> + 'static,
        E: Into<BoxError> + 'static,
    {
        let source: ByteSource = source.map_ok(Into::into).map_err(Into::into).boxed();
        Self {
            source: Some(source),
            decoder: FrameDecoder::new(),
            fault: None,
            done: false,
        }
    }

    /// Whether the byte source is still held
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    fn release(&mut self) {
        if self.source.take().is_some() {
            tracing::trace!("Released response body");
        }
    }

    fn fail(&mut self, err: StreamError) -> Poll<Option<Result<Frame, StreamError>>> {
        self.release();
        self.done = true;
        Poll::Ready(Some(Err(err)))
    }
}

impl Stream for FrameStream {
    type Item = Result<Frame, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            if let Some(frame) = this.decoder.next_frame() {
                if frame.is_terminal() {
                    this.release();
                }
                return Poll::Ready(Some(Ok(frame)));
            }

            if let Some(err) = this.fault.take() {
                return this.fail(err);
            }

            if this.decoder.is_terminated() {
                this.done = true;
                continue;
            }

            let Some(source) = this.source.as_mut() else {
                this.done = true;
                continue;
            };

            match ready!(source.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    if let Err(e) = this.decoder.push(&chunk) {
                        this.release();
                        this.fault = Some(e.into());
                    }
                }
                Some(Err(e)) => {
                    return this.fail(StreamError::Channel(e));
                }
                None => {
                    this.release();
                    if let Err(e) = this.decoder.finish() {
                        return this.fail(e.into());
                    }
                    if this.decoder.available() == 0 {
                        this.done = true;
                    }
                }
            }
        }
    }
}

impl FusedStream for FrameStream {
    fn is_terminated(&self) -> bool {
        self.done
    }
}
