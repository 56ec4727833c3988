//! MCP-compliant Standard I/O transport implementation

use crate::{
    batch::{create_error_response, process_message, JsonRpcMessage},
    config::StdioConfig,
    validation::{extract_id_from_malformed, validate_message_string},
    RequestHandler, Transport, TransportError,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use weather_mcp_protocol::{Error as McpError, Response};

/// Standard I/O transport for MCP protocol
///
/// Implements the MCP stdio transport rules:
/// - Messages are delimited by newlines
/// - Messages MUST NOT contain embedded newlines
/// - Messages must be valid UTF-8
/// - Supports JSON-RPC batching
/// - Error responses keep the request ID whenever it can be recovered
///
/// Every incoming line is handled on its own task, so a slow tool call does
/// not hold up other requests. Responses are funneled through a single writer
/// and therefore never interleave, but they may be written in a different
/// order than the requests arrived.
///
/// The reader and writer default to the process stdin and stdout; any pair of
/// async streams can be supplied with [`StdioTransport::from_io`].
pub struct StdioTransport<R = BufReader<Stdin>, W = Stdout> {
    io: Mutex<Option<(R, W)>>,
    running: Arc<AtomicBool>,
    config: StdioConfig,
}

impl StdioTransport {
    /// Create a new stdio transport with default configuration
    pub fn new() -> Self {
        Self::with_config(StdioConfig::default())
    }

    /// Create a new stdio transport over the process stdin/stdout
    pub fn with_config(config: StdioConfig) -> Self {
        Self::from_io(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), config)
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Create a transport over arbitrary streams
    pub fn from_io(reader: R, writer: W, config: StdioConfig) -> Self {
        Self {
            io: Mutex::new(Some((reader, writer))),
            running: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    pub fn config(&self) -> &StdioConfig {
        &self.config
    }

    fn take_io(&mut self) -> Result<(R, W), TransportError> {
        self.io
            .get_mut()
            .map_err(|_| TransportError::Config("stdio transport state poisoned".to_string()))?
            .take()
            .ok_or_else(|| TransportError::Config("stdio transport already started".to_string()))
    }
}

/// Process a single line and produce the line to write back, if any
pub async fn process_line(
    line: &str,
    handler: &RequestHandler,
    config: &StdioConfig,
) -> Option<String> {
    if config.validate_messages {
        if let Err(e) = validate_message_string(line, Some(config.max_message_size)) {
            warn!("Message validation failed: {}", e);
            return encode_response(&create_error_response(
                McpError::invalid_request(format!("Message validation failed: {e}")),
                extract_id_from_malformed(line),
            ));
        }
    }

    debug!("Processing message: {}", line);

    let message = match JsonRpcMessage::parse(line) {
        Ok(message) => message,
        Err(e) => {
            error!("Failed to parse JSON: {}", e);
            return encode_response(&create_error_response(
                McpError::parse_error(format!("Invalid JSON: {e}")),
                extract_id_from_malformed(line),
            ));
        }
    };

    match process_message(message, handler).await {
        Ok(Some(response_message)) => match response_message.to_string() {
            Ok(json) => Some(json),
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                None
            }
        },
        Ok(None) => {
            debug!("No response needed for message");
            None
        }
        Err(e) => {
            warn!("JSON-RPC validation failed: {}", e);
            encode_response(&create_error_response(
                McpError::invalid_request(format!("Invalid JSON-RPC: {e}")),
                extract_id_from_malformed(line),
            ))
        }
    }
}

fn encode_response(response: &Response) -> Option<String> {
    serde_json::to_string(response)
        .map_err(|e| error!("Failed to serialize error response: {}", e))
        .ok()
}

/// Outcome of reading one newline-terminated message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineRead {
    Eof,
    /// The buffer holds a whole line, terminator included when present
    Complete,
    /// The line is longer than the limit; the buffer holds its first bytes only
    Oversized,
}

/// Read one line into `buf`, never buffering more than `limit` bytes of content
///
/// Up to two extra bytes are allowed for the `\r\n` terminator. On overflow the
/// rest of the line is left in the reader; see [`discard_line`].
pub(crate) async fn read_line_bounded<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let ceiling = limit.saturating_add(2);
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(if buf.is_empty() { LineRead::Eof } else { LineRead::Complete });
        }

        let (chunk, found_newline) = match available.iter().position(|b| *b == b'\n') {
            Some(end) => (&available[..=end], true),
            None => (available, false),
        };

        let room = ceiling - buf.len();
        if chunk.len() > room {
            let keep = limit.saturating_sub(buf.len()).min(chunk.len());
            buf.extend_from_slice(&chunk[..keep]);
            buf.truncate(limit);
            // The newline, if any, lies past `room` and is left for discard_line
            reader.consume(room);
            return Ok(LineRead::Oversized);
        }

        let used = chunk.len();
        buf.extend_from_slice(chunk);
        reader.consume(used);
        if found_newline {
            return Ok(LineRead::Complete);
        }
    }
}

/// Skip input up to and including the next newline
async fn discard_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let used = available.len();
                reader.consume(used);
            }
        }
        // A peer streaming without newlines must not starve other tasks.
        tokio::task::yield_now().await;
    }
}

fn oversized_response(prefix: &[u8], limit: usize) -> Option<String> {
    let prefix = String::from_utf8_lossy(prefix);
    encode_response(&create_error_response(
        McpError::invalid_request(format!("Message exceeds maximum size of {limit} bytes")),
        extract_id_from_malformed(&prefix),
    ))
}

/// Strip the line terminator and decode; undecodable lines become a parse error
fn decode_line(raw: &[u8]) -> Result<&str, String> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    std::str::from_utf8(raw).map_err(|e| {
        let error = create_error_response(
            McpError::parse_error(format!("Message is not valid UTF-8: {e}")),
            Value::Null,
        );
        serde_json::to_string(&error).unwrap_or_default()
    })
}

async fn write_loop<W>(mut writer: W, mut outgoing: mpsc::UnboundedReceiver<String>) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = outgoing.recv().await {
        debug!("Sending response: {}", line);

        writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|e| TransportError::Connection(format!("Failed to write to stdout: {e}")))?;

        writer
            .flush()
            .await
            .map_err(|e| TransportError::Connection(format!("Failed to flush stdout: {e}")))?;
    }

    Ok(())
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn start(&mut self, handler: RequestHandler) -> Result<(), TransportError> {
        let (mut reader, writer) = self.take_io()?;

        info!("Starting MCP-compliant stdio transport");
        info!("Max message size: {} bytes", self.config.max_message_size);
        info!("Message validation: {}", self.config.validate_messages);

        self.running.store(true, Ordering::Relaxed);

        let handler = Arc::new(handler);
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(write_loop(writer, outgoing_rx));
        let mut in_flight = JoinSet::new();
        let mut buf = Vec::new();

        let outcome = loop {
            if !self.running.load(Ordering::Relaxed) {
                break Ok(());
            }

            buf.clear();
            match read_line_bounded(&mut reader, &mut buf, self.config.max_message_size).await {
                Ok(LineRead::Eof) => {
                    debug!("EOF reached, stopping stdio transport");
                    break Ok(());
                }
                Ok(LineRead::Oversized) => {
                    warn!(
                        "Message exceeds {} bytes, discarding the rest of the line",
                        self.config.max_message_size
                    );
                    if let Some(response) = oversized_response(&buf, self.config.max_message_size) {
                        let _ = outgoing.send(response);
                    }
                    if let Err(e) = discard_line(&mut reader).await {
                        error!("Failed to read from stdin: {}", e);
                        break Err(TransportError::Connection(format!("Stdin read error: {e}")));
                    }
                }
                Ok(LineRead::Complete) => {
                    let line = match decode_line(&buf) {
                        Ok(line) if line.trim().is_empty() => continue,
                        Ok(line) => line.to_string(),
                        Err(error_line) => {
                            warn!("Dropping message that is not valid UTF-8");
                            let _ = outgoing.send(error_line);
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let outgoing = outgoing.clone();
                    let config = self.config.clone();
                    in_flight.spawn(async move {
                        if let Some(response) = process_line(&line, &handler, &config).await {
                            if outgoing.send(response).is_err() {
                                warn!("Output closed, response dropped");
                            }
                        }
                    });

                    while let Some(joined) = in_flight.try_join_next() {
                        if let Err(e) = joined {
                            error!("Request task failed: {}", e);
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break Err(TransportError::Connection(format!("Stdin read error: {e}")));
                }
            }
        };

        // Let in-flight requests finish and flush before reporting back.
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!("Request task failed: {}", e);
            }
        }
        drop(outgoing);

        match writer_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Stdio writer stopped: {}", e),
            Err(e) => error!("Stdio writer task failed: {}", e),
        }

        self.running.store(false, Ordering::Relaxed);
        info!("Stdio transport stopped");
        outcome
    }

    async fn stop(&mut self) -> Result<(), TransportError> {
        info!("Stopping stdio transport");
        self.running.store(false, Ordering::Relaxed);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        if self.running.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(TransportError::Connection(
                "Transport not running".to_string(),
            ))
        }
    }
}
