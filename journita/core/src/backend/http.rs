//! HTTP Backend Implementation
//!
//! Talks to the chat service over HTTP with `reqwest`.
//!
//! # Endpoints
//!
//! - `POST {stream_path}` - streaming reply, `data: ` framed (see [`crate::protocol`])
//! - `POST {chat_path}` - one-shot JSON reply (`response` or `message` field)
//! - `GET {health_path}` - reachability probe
//!
//! The streaming call carries no whole-request timeout: a reply may stream
//! for as long as the server keeps producing it. Only the connect phase is
//! bounded.

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use super::traits::{ChatBackend, ConnectionStatus};
use crate::aggregator::ChatStream;
use crate::config::ClientConfig;
use crate::error::{ChatError, ConnectionError};
use crate::messages::{ChatReply, ChatRequest};

/// HTTP chat backend client
#[derive(Clone, Debug)]
pub struct HttpChatClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl HttpChatClient {
    /// Create a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Request`] if the HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(config: ClientConfig) -> Result<Self, ChatError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(ConnectionError::Request)?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// The configuration this client was built with
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Turn a non-success response into [`ConnectionError::Status`]
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ConnectionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(status = %status, error = %e, "Failed to read error response body");
            String::new()
        }
    };
    let reason = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_string()
    } else {
        body
    };
    Err(ConnectionError::Status { status, reason })
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn health_check(&self) -> ConnectionStatus {
        let url = self.config.health_url();

        match self
            .http_client
            .get(&url)
            .timeout(self.config.health_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => ConnectionStatus::Connected,
            Ok(response) => ConnectionStatus::Error(format!(
                "Backend responded with status: {}",
                response.status().as_u16()
            )),
            Err(e) => ConnectionStatus::Error(format!("Connection failed: {e}")),
        }
    }

    async fn begin(&self, request: &ChatRequest) -> Result<ChatStream, ChatError> {
        let url = self.config.stream_url();
        tracing::debug!(url = %url, chars = request.message.chars().count(), "Sending streaming chat request");

        let response = self
            .http_client
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(ConnectionError::Request)?;

        let response = check_status(response).await?;
        tracing::debug!(status = %response.status(), "Stream opened");

        Ok(ChatStream::from_byte_stream(response.bytes_stream()))
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let url = self.config.chat_url();
        tracing::debug!(url = %url, "Sending chat request");

        let response = self
            .http_client
            .post(&url)
            .timeout(self.config.request_timeout)
            .json(request)
            .send()
            .await
            .map_err(ConnectionError::Request)?;

        let response = check_status(response).await?;
        let body = response.text().await.map_err(ConnectionError::Request)?;
        let reply: ChatReply = serde_json::from_str(&body)
            .map_err(|e| ConnectionError::InvalidBody(e.to_string()))?;

        Ok(reply.into_text())
    }
}
