//! Errors surfaced by [`GeminiClient`](crate::GeminiClient) and
//! [`GenerateStream`](crate::GenerateStream).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    /// `GEMINI_API_KEY` missing or blank.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request never got a response, or the SSE body broke off mid-stream.
    #[error("Network error: {0}")]
    Network(String),

    /// Gemini answered but refused the work: a non-2xx status (message taken
    /// from the `error` envelope when present), `promptFeedback.blockReason`
    /// set on a whole or streamed response, or no candidates at all.
    #[error("API error: {0}")]
    Api(String),

    /// Body or `data:` line was not the JSON shape `generateContent` returns.
    #[error("Parse error: {0}")]
    Parse(String),
}
