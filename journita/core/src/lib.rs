//! Journita Core - Headless Streaming Chat Client
//!
//! This crate sends a user utterance to the chat backend and hands the
//! assistant's reply back token by token as it streams in, independent of
//! any UI framework.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       UI Surface (CLI, ...)                   │
//! │        next() ─► Ok(delta) ... None | Err(ChatError)          │
//! └───────────────────────────────┬──────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┼──────────────────────────────┐
//! │                        JOURNITA CORE                          │
//! │  ┌────────────────────────────┴───────────────────────────┐   │
//! │  │ ChatStream (Stream Aggregator) ──► MessageAccumulator   │   │
//! │  └────────────────────────────┬───────────────────────────┘   │
//! │  ┌────────────────────────────┴───────────────────────────┐   │
//! │  │ FrameStream ─► FrameDecoder ─► Utf8Decoder              │   │
//! │  └────────────────────────────┬───────────────────────────┘   │
//! │  ┌────────────────────────────┴───────────────────────────┐   │
//! │  │ HttpChatClient (reqwest, chunked response body)         │   │
//! │  └────────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ChatBackend`]: start an exchange, one-shot fallback, health probe
//! - [`ChatStream`]: lazy sequence of text deltas for one exchange
//! - [`MessageAccumulator`]: the growing assistant reply
//! - [`Frame`] / [`FrameDecoder`]: the line protocol
//! - [`ChatError`]: connection and stream failures
//!
//! # Quick Start
//!
//! ```ignore
//! use futures::StreamExt;
//! use journita_core::{load_config, ChatBackend, ChatRequest, HttpChatClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HttpChatClient::new(load_config()?)?;
//!     let mut stream = client.begin(&ChatRequest::new("Find flights to Paris")).await?;
//!
//!     while let Some(delta) = stream.next().await {
//!         print!("{}", delta?);
//!     }
//!     println!();
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`protocol`]: byte chunks to frames
//! - [`aggregator`]: frames to deltas plus the accumulated message
//! - [`accumulator`]: per-exchange message state
//! - [`backend`]: HTTP client and the backend trait
//! - [`messages`]: request/reply bodies and message records
//! - [`config`]: TOML, environment and CLI configuration
//! - [`error`]: error taxonomy

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod accumulator;
pub mod aggregator;
pub mod backend;
pub mod config;
pub mod error;
pub mod messages;
pub mod protocol;

pub use accumulator::{AccumulatorState, MessageAccumulator};
pub use aggregator::ChatStream;
pub use backend::{ChatBackend, ConnectionStatus, HttpChatClient};
pub use config::{
    default_config_path, load_config, load_config_from_path, ClientConfig, ConfigError,
    ConfigOverrides, ConfigSource,
};
pub use error::{ChatError, ConnectionError, StreamError, TextDecodeError};
pub use messages::{ChatMessage, ChatReply, ChatRequest, MessageId, MessageRole};
pub use protocol::{Frame, FrameDecoder, FrameStream};
