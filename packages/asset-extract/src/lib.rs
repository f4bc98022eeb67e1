//! Resilient fetch-and-extract pipeline for financial data pages.
//!
//! Given an instrument identifier and a category, the pipeline builds an
//! ordered list of candidate URLs on the data site, tries them one at a
//! time under a per-candidate timeout, reduces the first page that answers
//! to plain text, and optionally narrows it to indicator lines.
//!
//! Failures are values: every public pipeline operation returns a
//! [`FetchResult`], never an error.
//!
//! # Usage
//!
//! ```rust,ignore
//! use asset_extract::{Category, ExcerptMode, ExtractorConfig, FetchRequest, ResilientFetchExtractor};
//!
//! let extractor = ResilientFetchExtractor::new(ExtractorConfig::default())?;
//! let result = extractor
//!     .lookup(&FetchRequest::new("hglg", Category::RealEstateFund), ExcerptMode::Keywords)
//!     .await;
//!
//! if result.ok() {
//!     println!("{}: {}", result.url(), result.raw_text());
//! }
//! ```
//!
//! # Modules
//!
//! - [`candidates`] - Identifier normalization and candidate URLs
//! - [`html`] - HTML to plain text
//! - [`excerpt`] - Keyword-relevance extraction
//! - [`source`] - Page source trait and HTTP implementation
//! - [`testing`] - Mock page source

pub mod candidates;
pub mod config;
pub mod error;
pub mod excerpt;
pub mod extractor;
pub mod html;
pub mod source;
pub mod testing;
pub mod types;

pub use candidates::{build_candidates, canonical_ticker, normalize_identifier};
pub use config::{ExcerptLimits, ExtractorConfig, DEFAULT_BASE_URL, DEFAULT_KEYWORDS};
pub use error::{FetchError, FetchOutcome};
pub use excerpt::{extract_relevant_lines, extract_with_limits, ELLIPSIS};
pub use extractor::ResilientFetchExtractor;
pub use html::reduce_to_plain_text;
pub use source::{HttpPageSource, PageSource};
pub use testing::{MockPageSource, MockResponse};
pub use types::{Category, ExcerptMode, FetchRequest, FetchResult};
