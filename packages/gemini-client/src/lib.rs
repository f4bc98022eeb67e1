//! Minimal Gemini REST client
//!
//! Text generation only: a single-shot `generateContent` call and a
//! streamed `streamGenerateContent` call over server-sent events.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::{GeminiClient, GenerateRequest, DEFAULT_MODEL};
//! use futures::StreamExt;
//!
//! let client = GeminiClient::from_env()?;
//!
//! // Whole response
//! let response = client
//!     .generate(GenerateRequest::new(DEFAULT_MODEL, "Resuma o FII HGLG11"))
//!     .await?;
//!
//! // Streamed
//! let mut stream = client
//!     .generate_stream(GenerateRequest::new(DEFAULT_MODEL, "Resuma o FII HGLG11"))
//!     .await?;
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?.text);
//! }
//! ```

pub mod error;
pub mod streaming;
pub mod types;

pub use error::{GeminiError, Result};
pub use streaming::{GenerateChunk, GenerateStream};
pub use types::*;

use reqwest::{header, Client, Response};
use tracing::{debug, warn};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    async fn post(&self, url: String, request: &GenerateRequest) -> Result<Response> {
        let response = self
            .http_client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, model = %request.model, "Gemini request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Gemini API error");
            return Err(GeminiError::Api(describe_api_error(status.as_u16(), &error_text)));
        }

        Ok(response)
    }

    /// Streaming generation.
    ///
    /// Returns once the response headers arrive; text deltas follow on the
    /// returned stream.
    pub async fn generate_stream(&self, request: GenerateRequest) -> Result<GenerateStream> {
        let url = format!(
            "{}?alt=sse",
            self.endpoint(&request.model, "streamGenerateContent")
        );
        let response = self.post(url, &request).await?;

        debug!(model = %request.model, "Gemini stream opened");
        Ok(GenerateStream::new(response.bytes_stream()))
    }

    /// Single-shot generation.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let start = std::time::Instant::now();

        let url = self.endpoint(&request.model, "generateContent");
        let response = self.post(url, &request).await?;

        let raw: types::GenerateResponseRaw = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        if let Some(reason) = raw.block_reason() {
            return Err(GeminiError::Api(format!("Prompt blocked: {}", reason)));
        }
        if raw.candidates.is_empty() {
            return Err(GeminiError::Api("No response from Gemini".into()));
        }

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Gemini generation"
        );

        Ok(GenerateResponse {
            text: raw.text(),
            finish_reason: raw.finish_reason(),
            usage: raw.usage_metadata,
        })
    }
}

/// Prefer the structured error message when the body carries one.
fn describe_api_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<types::ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = if envelope.error.code == 0 {
                status
            } else {
                envelope.error.code
            };
            format!(
                "Gemini API error {} {}: {}",
                code, envelope.error.status, envelope.error.message
            )
        }
        Err(_) => format!("Gemini API error {}: {}", status, body),
    }
}
