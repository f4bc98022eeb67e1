//! Mock page source for testing.
//!
//! Serves canned bodies, statuses, errors and delays per URL and records
//! every URL it was asked for.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FetchError, FetchOutcome};
use crate::source::PageSource;

/// Canned behaviour for one URL.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with this body
    Body(String),
    /// Non-2xx status
    Status(u16),
    /// Connection-level failure
    NetworkError(String),
    /// Sleep, then behave like the inner response
    Delayed(Duration, Box<MockResponse>),
}

/// Mock page source.
///
/// # Example
///
/// ```rust
/// use asset_extract::testing::MockPageSource;
///
/// let source = MockPageSource::new()
///     .with_status("https://site/acoes/x/", 404)
///     .with_page("https://site/fiis/x11/", "<p>Preço: 10</p>");
/// ```
#[derive(Default, Clone)]
pub struct MockPageSource {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    fallback: Option<MockResponse>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockPageSource {
    /// Unknown URLs answer 404.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: impl Into<String>, response: MockResponse) -> Self {
        self.responses.write().unwrap().insert(url.into(), response);
        self
    }

    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_response(url, MockResponse::Body(body.into()))
    }

    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.with_response(url, MockResponse::Status(status))
    }

    pub fn with_network_error(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_response(url, MockResponse::NetworkError(message.into()))
    }

    /// Answer `body` for `url` after `delay`.
    pub fn with_delayed_page(
        self,
        url: impl Into<String>,
        delay: Duration,
        body: impl Into<String>,
    ) -> Self {
        self.with_response(
            url,
            MockResponse::Delayed(delay, Box::new(MockResponse::Body(body.into()))),
        )
    }

    /// Behaviour for URLs without a specific response.
    pub fn with_fallback(mut self, response: MockResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    async fn fetch(&self, url: &str) -> FetchOutcome<String> {
        self.calls.write().unwrap().push(url.to_string());

        let configured = self.responses.read().unwrap().get(url).cloned();
        let mut response = match configured.or_else(|| self.fallback.clone()) {
            Some(response) => response,
            None => MockResponse::Status(404),
        };

        loop {
            match response {
                MockResponse::Body(body) => return Ok(body),
                MockResponse::Status(status) => {
                    return Err(FetchError::Http {
                        url: url.to_string(),
                        status,
                    })
                }
                MockResponse::NetworkError(message) => {
                    return Err(FetchError::Network {
                        url: url.to_string(),
                        message,
                    })
                }
                MockResponse::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    response = *inner;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_responses() {
        let source = MockPageSource::new()
            .with_page("https://a/", "hello")
            .with_status("https://b/", 503)
            .with_network_error("https://c/", "connection reset");

        assert_eq!(source.fetch("https://a/").await.unwrap(), "hello");
        assert!(matches!(
            source.fetch("https://b/").await,
            Err(FetchError::Http { status: 503, .. })
        ));
        assert!(matches!(
            source.fetch("https://c/").await,
            Err(FetchError::Network { .. })
        ));
        assert!(matches!(
            source.fetch("https://unknown/").await,
            Err(FetchError::Http { status: 404, .. })
        ));
        assert_eq!(source.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_response() {
        let source = MockPageSource::new().with_delayed_page("https://slow/", Duration::from_secs(5), "late");
        let start = tokio::time::Instant::now();

        assert_eq!(source.fetch("https://slow/").await.unwrap(), "late");
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let source = MockPageSource::new().with_fallback(MockResponse::Body("ok".into()));
        let clone = source.clone();

        clone.fetch("https://x/").await.unwrap();
        assert_eq!(source.calls(), vec!["https://x/".to_string()]);
    }
}
