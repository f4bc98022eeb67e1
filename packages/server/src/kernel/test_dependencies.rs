// TestDependencies - mock implementations for testing
//
// Provides a scripted model that can be injected into the app state for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use super::traits::{BaseAnalysisModel, TextStream};

// =============================================================================
// Mock Analysis Model
// =============================================================================

/// One scripted stream item.
#[derive(Debug, Clone)]
pub enum MockChunk {
    Text(String),
    /// Wait before the next item.
    Pause(Duration),
    /// Fail the stream at this point.
    Fail(String),
}

#[derive(Clone)]
pub struct MockModel {
    response: String,
    chunks: Option<Vec<MockChunk>>,
    connect_delay: Duration,
    failure: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            response: "Mock analysis".to_string(),
            chunks: None,
            connect_delay: Duration::ZERO,
            failure: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Text returned by `complete` (and streamed as one chunk when no chunks are set).
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    /// Script the streamed output.
    pub fn with_chunks(mut self, chunks: Vec<MockChunk>) -> Self {
        self.chunks = Some(chunks);
        self
    }

    /// Delay before the model answers (both modes).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Make every call fail with the given message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Get all prompts that were sent to the model
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the last prompt sent to the model
    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Get the number of times the model was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn answer(&self, prompt: &str) -> Result<()> {
        // Record the call
        self.calls.lock().unwrap().push(prompt.to_string());

        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }
        match &self.failure {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BaseAnalysisModel for MockModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.answer(prompt).await?;
        Ok(self.response.clone())
    }

    async fn complete_stream(&self, prompt: &str) -> Result<TextStream> {
        self.answer(prompt).await?;

        let chunks = self
            .chunks
            .clone()
            .unwrap_or_else(|| vec![MockChunk::Text(self.response.clone())]);

        let stream = stream::iter(chunks).filter_map(|chunk| async move {
            match chunk {
                MockChunk::Text(text) => Some(Ok(text)),
                MockChunk::Pause(duration) => {
                    tokio::time::sleep(duration).await;
                    None
                }
                MockChunk::Fail(message) => Some(Err(anyhow!(message))),
            }
        });

        Ok(stream.boxed())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_prompts() {
        let model = MockModel::new().with_response("ok");

        assert_eq!(model.complete("first").await.unwrap(), "ok");
        assert_eq!(model.complete("second").await.unwrap(), "ok");

        assert_eq!(model.calls(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(model.last_prompt().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_scripted_stream() {
        let model = MockModel::new().with_chunks(vec![
            MockChunk::Text("a".into()),
            MockChunk::Pause(Duration::from_millis(1)),
            MockChunk::Text("b".into()),
            MockChunk::Fail("boom".into()),
        ]);

        let items: Vec<Result<String>> = model.complete_stream("p").await.unwrap().collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), "a");
        assert_eq!(items[1].as_ref().unwrap(), "b");
        assert!(items[2].is_err());
    }

    #[tokio::test]
    async fn test_failure_applies_to_both_modes() {
        let model = MockModel::new().with_failure("quota exceeded");

        assert!(model.complete("p").await.is_err());
        assert!(model.complete_stream("p").await.is_err());
        assert_eq!(model.call_count(), 2);
    }
}
