//! Journita Chat - Terminal Surface
//!
//! Sends messages to the travel assistant backend and prints the reply as
//! it streams in.
//!
//! # Usage
//!
//! ```bash
//! # One exchange
//! journita-chat "Find flights from Lisbon to Tokyo in May"
//!
//! # One exchange per stdin line
//! journita-chat < questions.txt
//!
//! # Probe the backend
//! journita-chat --check
//!
//! # Custom backend, verbose logging
//! RUST_LOG=debug journita-chat --url http://travel.internal:8000 "hotels in Kyoto"
//! ```
//!
//! # Environment Variables
//!
//! - `JOURNITA_API_URL`: backend base URL
//! - `JOURNITA_CONFIG`: configuration file path
//! - `RUST_LOG`: log level (trace, debug, info, warn, error)
//!
//! Logs go to stderr so stdout carries only the conversation.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use journita_core::{
    default_config_path, load_config_from_path, ChatBackend, ChatError, ChatRequest,
    ClientConfig, ConfigOverrides, HttpChatClient,
};

/// Journita Chat - streaming travel assistant in your terminal
#[derive(Parser, Debug)]
#[command(name = "journita-chat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "JOURNITA_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config file and environment)
    #[arg(short = 'u', long, value_name = "URL")]
    url: Option<String>,

    /// Connect timeout in milliseconds
    #[arg(long, value_name = "MS")]
    connect_timeout_ms: Option<u64>,

    /// Use the non-streaming endpoint
    #[arg(long)]
    no_stream: bool,

    /// Probe the backend and exit
    #[arg(long)]
    check: bool,

    /// Message to send; reads one message per line from stdin when omitted
    #[arg(value_name = "MESSAGE")]
    message: Vec<String>,
}

/// How a single exchange ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Replied,
    Failed,
}

/// Apology shown in place of a reply that could not be produced
fn apology(error: &ChatError) -> String {
    format!("Sorry, I encountered an error: {error}")
}

/// Whether the backend lacks the streaming endpoint
fn streaming_unsupported(error: &ChatError) -> bool {
    matches!(error.status().map(|s| s.as_u16()), Some(404 | 405))
}

/// Run one exchange, writing the reply to `out` as it arrives
async fn exchange<B, W>(backend: &B, message: &str, streaming: bool, out: &mut W) -> Result<Outcome>
where
    B: ChatBackend + ?Sized,
    W: AsyncWrite + Unpin,
{
    let request = ChatRequest::new(message);

    if !streaming {
        return send_once(backend, &request, out).await;
    }

    let mut stream = match backend.begin(&request).await {
        Ok(stream) => stream,
        Err(e) if streaming_unsupported(&e) => {
            info!(error = %e, "Streaming endpoint unavailable, falling back to one-shot reply");
            return send_once(backend, &request, out).await;
        }
        Err(e) => {
            write_line(out, &apology(&e)).await?;
            return Ok(Outcome::Failed);
        }
    };

    while let Some(item) = stream.next().await {
        match item {
            Ok(delta) => {
                out.write_all(delta.as_bytes()).await?;
                out.flush().await?;
            }
            Err(e) => {
                // Terminal output cannot be retracted; end the partial line first
                if !stream.message().text().is_empty() {
                    out.write_all(b"\n").await?;
                }
                write_line(out, &apology(&e)).await?;
                return Ok(Outcome::Failed);
            }
        }
    }

    debug!(
        id = %stream.message().id(),
        deltas = stream.message().delta_count(),
        "Reply complete"
    );
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(Outcome::Replied)
}

async fn send_once<B, W>(backend: &B, request: &ChatRequest, out: &mut W) -> Result<Outcome>
where
    B: ChatBackend + ?Sized,
    W: AsyncWrite + Unpin,
{
    match backend.send(request).await {
        Ok(reply) => {
            write_line(out, &reply).await?;
            Ok(Outcome::Replied)
        }
        Err(e) => {
            write_line(out, &apology(&e)).await?;
            Ok(Outcome::Failed)
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

/// Load file and environment settings, then apply command-line overrides
///
/// Validation runs once, on the final values.
fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut config = load_config_from_path(args.config.clone().or_else(default_config_path))
        .context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(url) = args.url.clone() {
        overrides = overrides.with_base_url(url);
    }
    if let Some(ms) = args.connect_timeout_ms {
        overrides = overrides.with_connect_timeout_ms(ms);
    }
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("journita_chat=info".parse()?)
                .add_directive("journita_core=info".parse()?),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = resolve_config(&args)?;

    info!(
        base_url = %config.base_url,
        source = %config.source(),
        "Using chat backend"
    );

    let client = HttpChatClient::new(config).context("Failed to create HTTP client")?;

    if args.check {
        let status = client.health_check().await;
        println!("{status}");
        return Ok(if status.is_connected() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let streaming = !args.no_stream;
    let mut stdout = tokio::io::stdout();
    let mut failures = 0usize;

    if args.message.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if exchange(&client, line, streaming, &mut stdout).await? == Outcome::Failed {
                failures += 1;
            }
        }
    } else {
        let message = args.message.join(" ");
        if exchange(&client, &message, streaming, &mut stdout).await? == Outcome::Failed {
            failures += 1;
        }
    }

    if failures > 0 {
        warn!(failures, "Some exchanges failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream;
    use journita_core::{ChatStream, ConnectionError, ConnectionStatus};
    use pretty_assertions::assert_eq;

    /// Backend answering from canned bodies
    struct ScriptedBackend {
        stream_status: Option<u16>,
        chunks: Vec<Result<&'static str, std::io::Error>>,
        reply: &'static str,
    }

    impl ScriptedBackend {
        fn streaming(chunks: Vec<Result<&'static str, std::io::Error>>) -> Self {
            Self {
                stream_status: None,
                chunks,
                reply: "",
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> ConnectionStatus {
            ConnectionStatus::Connected
        }

        async fn begin(&self, _request: &ChatRequest) -> Result<ChatStream, ChatError> {
            if let Some(code) = self.stream_status {
                let status = reqwest::StatusCode::from_u16(code).unwrap();
                return Err(ConnectionError::Status {
                    status,
                    reason: "nope".to_string(),
                }
                .into());
            }
            let chunks: Vec<Result<String, std::io::Error>> = self
                .chunks
                .iter()
                .map(|c| match c {
                    Ok(s) => Ok((*s).to_string()),
                    Err(e) => Err(std::io::Error::new(e.kind(), e.to_string())),
                })
                .collect();
            Ok(ChatStream::from_byte_stream(stream::iter(chunks)))
        }

        async fn send(&self, _request: &ChatRequest) -> Result<String, ChatError> {
            Ok(self.reply.to_string())
        }
    }

    async fn run(backend: &ScriptedBackend, streaming: bool) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = exchange(backend, "hi", streaming, &mut out).await.unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_streamed_reply_is_printed() {
        let backend = ScriptedBackend::streaming(vec![
            Ok("data: {\"message\":\"Hel\"}\n"),
            Ok("data: {\"message\":\"lo\"}\ndata: [DONE]\n"),
        ]);

        assert_eq!(run(&backend, true).await, (Outcome::Replied, "Hello\n".to_string()));
    }

    #[tokio::test]
    async fn test_fault_prints_apology() {
        let backend = ScriptedBackend::streaming(vec![
            Ok("data: {\"message\":\"Hel\"}\n"),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);

        let (outcome, output) = run(&backend, true).await;
        assert_eq!(outcome, Outcome::Failed);
        assert!(output.starts_with("Hel\nSorry, I encountered an error: "));
    }

    #[tokio::test]
    async fn test_missing_stream_endpoint_falls_back_to_send() {
        let backend = ScriptedBackend {
            stream_status: Some(404),
            chunks: Vec::new(),
            reply: "One-shot answer",
        };

        assert_eq!(
            run(&backend, true).await,
            (Outcome::Replied, "One-shot answer\n".to_string())
        );
    }

    #[tokio::test]
    async fn test_server_error_does_not_fall_back() {
        let backend = ScriptedBackend {
            stream_status: Some(500),
            chunks: Vec::new(),
            reply: "unused",
        };

        let (outcome, output) = run(&backend, true).await;
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(
            output,
            "Sorry, I encountered an error: connection failed: server responded with 500 Internal Server Error: nope\n"
        );
    }

    #[tokio::test]
    async fn test_no_stream_uses_send() {
        let backend = ScriptedBackend {
            stream_status: None,
            chunks: Vec::new(),
            reply: "Direct",
        };

        assert_eq!(run(&backend, false).await, (Outcome::Replied, "Direct\n".to_string()));
    }

    #[test]
    fn test_url_flag_overrides_invalid_env_url() {
        std::env::set_var("JOURNITA_API_URL", "localhost:8000");
        let missing = "/nonexistent/journita/client.toml";

        let rescued = Args::parse_from(["journita-chat", "--config", missing, "--url", "http://ok:8000"]);
        let rejected = Args::parse_from(["journita-chat", "--config", missing]);
        let rescued = resolve_config(&rescued);
        let rejected = resolve_config(&rejected);
        std::env::remove_var("JOURNITA_API_URL");

        assert_eq!(rescued.unwrap().base_url, "http://ok:8000");
        assert!(rejected.is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["journita-chat", "--url", "http://x:1", "hotels", "in", "Rome"]);
        assert_eq!(args.url.as_deref(), Some("http://x:1"));
        assert_eq!(args.message.join(" "), "hotels in Rome");
        assert!(!args.check);
        assert!(!args.no_stream);
    }
}
