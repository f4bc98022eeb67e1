//! Typed errors for the fetch pipeline.
//!
//! These never cross the [`ResilientFetchExtractor`](crate::ResilientFetchExtractor)
//! boundary as `Err` values. The extractor renders them into
//! [`FetchResult::error_detail`](crate::FetchResult::error_detail).

use thiserror::Error;

/// Errors that can occur while building candidates or fetching pages.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Identifier is empty after normalization
    #[error("invalid identifier: {identifier:?}")]
    InvalidIdentifier { identifier: String },

    /// Every candidate URL failed
    #[error("all {attempts} candidates failed; last error: {last_error}")]
    AllCandidatesFailed { attempts: usize, last_error: String },

    /// A single attempt exceeded the per-candidate timeout
    #[error("timeout after {timeout_ms} ms: {url}")]
    Timeout { url: String, timeout_ms: u64 },

    /// Non-2xx response
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// Connection, TLS or body read failure
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    /// HTTP client could not be constructed from the configuration
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl FetchError {
    /// True for the timeout case, whether raised by the extractor or the client.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

/// Result type alias for fetch operations.
pub type FetchOutcome<T> = std::result::Result<T, FetchError>;
