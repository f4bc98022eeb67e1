//! Page sources: where candidate URLs are actually fetched from.
//!
//! The extractor only depends on [`PageSource`], so tests can swap the
//! network for [`MockPageSource`](crate::testing::MockPageSource).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT};
use tracing::{debug, warn};

use crate::config::ExtractorConfig;
use crate::error::{FetchError, FetchOutcome};

/// Fetches one document by URL.
///
/// Implementations report failures as [`FetchError`]; they do not need
/// to enforce the per-candidate timeout, the extractor does that.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// GET `url` and return the body of a 2xx response.
    async fn fetch(&self, url: &str) -> FetchOutcome<String>;

    /// Source name (for logging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// HTTP page source backed by `reqwest`.
///
/// Sends the configured user agent and accept-language, and asks
/// intermediaries not to serve cached copies.
#[derive(Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPageSource {
    /// Build a client from the extractor configuration.
    pub fn new(config: &ExtractorConfig) -> FetchOutcome<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| FetchError::ClientBuild(format!("invalid user agent: {}", e)))?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| FetchError::ClientBuild(format!("invalid accept-language: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        // Backstop only; the extractor races each attempt against its own timer.
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.per_candidate_timeout)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.per_candidate_timeout,
        })
    }

    /// Use a pre-built client whose own timeout is `timeout`.
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn network_error(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            };
        }
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> FetchOutcome<String> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            self.network_error(url, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.network_error(url, e))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one connection on loopback: wait `delay`, then write `response`.
    /// The handle yields the lowercased request head.
    async fn serve_once(response: &'static str, delay: Duration) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            tokio::time::sleep(delay).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&head).to_lowercase()
        });

        (base, handle)
    }

    #[test]
    fn test_rejects_invalid_header_values() {
        let config = ExtractorConfig::new().with_user_agent("bad\nagent");
        let err = HttpPageSource::new(&config).err().unwrap();
        assert!(matches!(err, FetchError::ClientBuild(_)));
    }

    #[test]
    fn test_builds_with_defaults() {
        let source = HttpPageSource::new(&ExtractorConfig::default()).unwrap();
        assert_eq!(source.name(), "http");
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 16\r\nconnection: close\r\n\r\n<p>Cotação</p>",
            Duration::ZERO,
        )
        .await;
        let source = HttpPageSource::new(&ExtractorConfig::default()).unwrap();

        let body = source.fetch(&format!("{}/fiis/hglg11/", base)).await.unwrap();
        let head = server.await.unwrap();

        assert_eq!(body, "<p>Cotação</p>");
        assert!(head.starts_with("get /fiis/hglg11/ http/1.1"));
        assert!(head.contains("user-agent: mozilla/5.0"));
        assert!(head.contains("accept-language: pt-br,pt;q=0.9,en;q=0.8"));
        assert!(head.contains("cache-control: no-cache"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let (base, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            Duration::ZERO,
        )
        .await;
        let source = HttpPageSource::new(&ExtractorConfig::default()).unwrap();

        let url = format!("{}/acoes/xpto3/", base);
        let err = source.fetch(&url).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(&err, FetchError::Http { url: got, status: 404 } if *got == url));
    }

    #[tokio::test]
    async fn test_slow_reply_is_timeout_error() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
            Duration::from_secs(1),
        )
        .await;
        let config = ExtractorConfig::new().with_timeout(Duration::from_millis(100));
        let source = HttpPageSource::new(&config).unwrap();

        let err = source.fetch(&format!("{}/fiis/hglg11/", base)).await.unwrap_err();
        server.abort();

        assert!(err.is_timeout());
        assert!(err.to_string().starts_with("timeout after 100 ms"));
    }
}
