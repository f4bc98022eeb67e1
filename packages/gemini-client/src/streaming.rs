//! SSE streaming parser for Gemini `streamGenerateContent?alt=sse`.
//!
//! Converts a raw `reqwest` byte stream into `GenerateChunk` values.
//! Handles partial lines and multi-byte characters split across reads.
//! Gemini has no `[DONE]` sentinel; the stream ends with the connection.

use bytes::Bytes;
use futures::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::GeminiError;
use crate::types::GenerateResponseRaw;

/// A single chunk from a streamed generation.
#[derive(Debug, Clone)]
pub struct GenerateChunk {
    /// The text delta for this chunk.
    pub text: String,
    /// Set on the chunk that carries a finish reason.
    pub finish_reason: Option<String>,
}

/// Stream adapter that converts raw SSE bytes into `GenerateChunk` values.
pub struct GenerateStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: String,
    pending: Vec<u8>,
}

impl GenerateStream {
    pub(crate) fn new(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            buffer: String::new(),
            pending: Vec::new(),
        }
    }

    /// Append bytes, holding back an incomplete trailing UTF-8 sequence.
    fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), GeminiError> {
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                self.buffer.push_str(text);
                self.pending.clear();
                Ok(())
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                // valid_up_to guarantees this prefix is UTF-8
                let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.buffer.push_str(&text);
                self.pending.drain(..valid);
                Ok(())
            }
            Err(e) => Err(GeminiError::Parse(format!("Invalid UTF-8 in stream: {}", e))),
        }
    }
}

impl Stream for GenerateStream {
    type Item = Result<GenerateChunk, GeminiError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            // Try to parse a complete line from the buffer
            if let Some(chunk) = try_parse_line(&mut this.buffer) {
                return Poll::Ready(Some(chunk));
            }

            // Need more data from the byte stream
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    if let Err(e) = this.push_bytes(&bytes) {
                        return Poll::Ready(Some(Err(e)));
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(GeminiError::Network(e.to_string()))));
                }
                Poll::Ready(None) => {
                    // Stream ended: flush a final line without trailing newline
                    if this.buffer.trim().is_empty() {
                        return Poll::Ready(None);
                    }
                    this.buffer.push('\n');
                    if let Some(chunk) = try_parse_line(&mut this.buffer) {
                        return Poll::Ready(Some(chunk));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Try to extract and parse a complete SSE line from the buffer.
/// Returns `None` if no complete data line is available yet.
fn try_parse_line(buffer: &mut String) -> Option<Result<GenerateChunk, GeminiError>> {
    loop {
        let newline_pos = buffer.find('\n')?;
        let line = buffer[..newline_pos].trim().to_string();
        buffer.drain(..=newline_pos);

        let Some(data) = line.strip_prefix("data:") else {
            // Blank separators and "event:", "id:", "retry:" lines
            continue;
        };

        let data = data.trim();
        if data.is_empty() {
            continue;
        }

        return Some(match serde_json::from_str::<GenerateResponseRaw>(data) {
            Ok(raw) => match raw.block_reason() {
                Some(reason) => Err(GeminiError::Api(format!("Prompt blocked: {}", reason))),
                None => Ok(GenerateChunk {
                    text: raw.text(),
                    finish_reason: raw.finish_reason(),
                }),
            },
            Err(e) => {
                let end = data
                    .char_indices()
                    .nth(200)
                    .map(|(idx, _)| idx)
                    .unwrap_or(data.len());
                Err(GeminiError::Parse(format!(
                    "Failed to parse stream chunk: {} (data: {})",
                    e,
                    &data[..end]
                )))
            }
        });
    }
}
