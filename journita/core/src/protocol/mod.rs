//! Streaming Response Protocol
//!
//! Line-oriented, server-sent-events style framing consumed from a chunked
//! HTTP response body:
//!
//! ```text
//! data: {"message":"Hel"}\n
//! data: {"message":"lo"}\n
//! data: [DONE]\n
//! ```
//!
//! - [`utf8`]: incremental text decoding across chunk boundaries
//! - [`frame`]: one line to one [`Frame`]
//! - [`decoder`]: push-based [`FrameDecoder`] holding the partial line
//! - [`stream`]: pull-driven [`FrameStream`] over an async byte source

pub mod decoder;
pub mod frame;
pub mod stream;
pub mod utf8;

pub use decoder::{decode_all, FrameDecoder};
pub use frame::{parse_line, Frame, DATA_PREFIX, TERMINAL_SENTINEL};
pub use stream::FrameStream;
pub use utf8::Utf8Decoder;
