// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Prompt assembly lives in the analysis domain and only uses these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAnalysisModel)

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Text deltas from a streamed completion.
pub type TextStream = BoxStream<'static, Result<String>>;

// =============================================================================
// Model Trait (Infrastructure - text generation)
// =============================================================================

#[async_trait]
pub trait BaseAnalysisModel: Send + Sync {
    /// Complete a prompt and return the whole text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Complete a prompt as a stream of text deltas.
    ///
    /// Resolves once the model has accepted the request.
    async fn complete_stream(&self, prompt: &str) -> Result<TextStream>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str {
        "unknown"
    }
}
