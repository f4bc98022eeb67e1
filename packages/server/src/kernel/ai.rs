use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use gemini_client::{GeminiClient, GenerateRequest, GenerationConfig};

use super::traits::{BaseAnalysisModel, TextStream};

/// Gemini-backed implementation of [`BaseAnalysisModel`].
#[derive(Clone)]
pub struct GeminiModel {
    client: GeminiClient,
    model: String,
    generation: GenerationConfig,
}

impl GeminiModel {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    fn request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest::new(&self.model, prompt).config(self.generation.clone())
    }
}

#[async_trait]
impl BaseAnalysisModel for GeminiModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::info!(model = %self.model, prompt_length = prompt.len(), "Calling Gemini API");

        let response = self
            .client
            .generate(self.request(prompt))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, model = %self.model, "Gemini API call failed");
                e
            })
            .context("Failed to call Gemini API")?;

        tracing::info!(
            response_length = response.text.len(),
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            total_tokens = response.usage.as_ref().map(|u| u.total_token_count).unwrap_or(0),
            model = %self.model,
            "Gemini API response received"
        );

        Ok(response.text)
    }

    async fn complete_stream(&self, prompt: &str) -> Result<TextStream> {
        tracing::info!(model = %self.model, prompt_length = prompt.len(), "Opening Gemini stream");

        let stream = self
            .client
            .generate_stream(self.request(prompt))
            .await
            .context("Failed to open Gemini stream")?;

        Ok(stream
            .map_ok(|chunk| chunk.text)
            .map_err(anyhow::Error::from)
            .boxed())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
