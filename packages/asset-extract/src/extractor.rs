//! The resilient fetch-and-extract pipeline.
//!
//! ```text
//! FetchRequest → build_candidates → fetch_first_success → reduce_to_plain_text → extract_relevant_lines
//! ```
//!
//! Every stage is linear and every failure becomes an `ok == false`
//! [`FetchResult`]; nothing here returns `Err` to the caller.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::candidates;
use crate::config::ExtractorConfig;
use crate::error::{FetchError, FetchOutcome};
use crate::excerpt;
use crate::html;
use crate::source::{HttpPageSource, PageSource};
use crate::types::{Category, ExcerptMode, FetchRequest, FetchResult};

/// Turns an instrument identifier into best-effort plain text from the data site.
///
/// Cheap to clone; clones share the page source.
#[derive(Clone)]
pub struct ResilientFetchExtractor {
    config: Arc<ExtractorConfig>,
    source: Arc<dyn PageSource>,
}

impl ResilientFetchExtractor {
    /// Create an extractor that fetches over HTTP.
    pub fn new(config: ExtractorConfig) -> FetchOutcome<Self> {
        let source = HttpPageSource::new(&config)?;
        Ok(Self::with_source(config, source))
    }

    /// Create an extractor over any page source.
    pub fn with_source(config: ExtractorConfig, source: impl PageSource + 'static) -> Self {
        Self {
            config: Arc::new(config),
            source: Arc::new(source),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Ordered, duplicate-free candidate URLs for `identifier`.
    pub fn build_candidates(&self, identifier: &str, category: Category) -> Vec<String> {
        candidates::build_candidates(&self.config.base_url, identifier, category)
    }

    /// Try `candidates` in order until one answers 2xx.
    ///
    /// Each attempt is bounded by the per-candidate timeout; an attempt
    /// that runs over is dropped, which cancels the in-flight request.
    pub async fn fetch_first_success(&self, candidates: &[String]) -> FetchResult {
        let Some(first) = candidates.first() else {
            return FetchResult::failure(FetchResult::NO_URL, "no candidate URLs");
        };

        let timeout = self.config.per_candidate_timeout;
        let mut last_error: Option<FetchError> = None;

        for (attempt, url) in candidates.iter().enumerate() {
            debug!(
                url = %url,
                attempt = attempt + 1,
                of = candidates.len(),
                source = self.source.name(),
                "Trying candidate"
            );

            let error = match tokio::time::timeout(timeout, self.source.fetch(url)).await {
                Ok(Ok(body)) => {
                    info!(url = %url, attempt = attempt + 1, bytes = body.len(), "Candidate fetched");
                    return FetchResult::success(url.clone(), body);
                }
                Ok(Err(e)) => e,
                Err(_) => FetchError::Timeout {
                    url: url.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                },
            };

            warn!(url = %url, error = %error, timed_out = error.is_timeout(), "Candidate failed");
            last_error = Some(error);
        }

        let error = FetchError::AllCandidatesFailed {
            attempts: candidates.len(),
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        };
        FetchResult::failure(first.clone(), error.to_string())
    }

    /// Reduce HTML to plain text capped at the configured length.
    pub fn reduce_to_plain_text(&self, html: &str) -> String {
        html::reduce_to_plain_text(html, self.config.max_text_chars)
    }

    /// Keyword-filtered excerpt using the configured keywords and bounds.
    pub fn extract_relevant_lines(&self, plain_text: &str) -> String {
        excerpt::extract_with_limits(plain_text, &self.config.keywords, &self.config.limits)
    }

    /// Run the whole pipeline for one request.
    ///
    /// On success `raw_text` holds the excerpt selected by `mode`, not the
    /// page HTML.
    pub async fn lookup(&self, request: &FetchRequest, mode: ExcerptMode) -> FetchResult {
        let start = Instant::now();
        let candidates = self.build_candidates(&request.identifier, request.category);

        if candidates.is_empty() {
            let error = FetchError::InvalidIdentifier {
                identifier: request.identifier.clone(),
            };
            warn!(error = %error, "Rejected lookup before any network attempt");
            return FetchResult::failure(FetchResult::NO_URL, error.to_string());
        }

        info!(
            identifier = %request.identifier,
            category = request.category.label(),
            candidates = candidates.len(),
            "Lookup starting"
        );

        let result = self
            .fetch_first_success(&candidates)
            .await
            .map_text(|body| {
                let text = self.reduce_to_plain_text(body);
                match mode {
                    ExcerptMode::FullText => text,
                    ExcerptMode::Keywords => self.extract_relevant_lines(&text),
                }
            });

        info!(
            ok = result.ok(),
            url = %result.url(),
            chars = result.raw_text().chars().count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Lookup finished"
        );

        result
    }
}
