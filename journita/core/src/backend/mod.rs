//! Chat Backend Integration
//!
//! Access to the chat service through a common trait interface.
//!
//! # Usage
//!
//! ```ignore
//! use futures::StreamExt;
//! use journita_core::backend::{ChatBackend, HttpChatClient};
//! use journita_core::{load_config, ChatRequest};
//!
//! let client = HttpChatClient::new(load_config()?)?;
//! let mut stream = client.begin(&ChatRequest::new("Hotels in Tokyo?")).await?;
//! while let Some(delta) = stream.next().await {
//!     print!("{}", delta?);
//! }
//! ```

mod http;
mod traits;

pub use http::HttpChatClient;
pub use traits::{ChatBackend, ConnectionStatus};
