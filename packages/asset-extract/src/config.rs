//! Configuration for the fetch-and-extract pipeline.

use std::time::Duration;

/// Default host of the financial data site.
pub const DEFAULT_BASE_URL: &str = "https://investidor10.com.br";

/// Indicator terms that mark a line as relevant.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "preço",
    "cotação",
    "price",
    "variação",
    "dividend",
    "dividendo",
    "dy",
    "yield",
    "p/l",
    "p/vp",
    "p/e",
    "roe",
    "roic",
    "margem",
    "margin",
    "dívida",
    "debt",
    "ebitda",
    "lucro",
    "receita",
    "setor",
    "sector",
    "segmento",
    "vacância",
    "vacancy",
    "liquidez",
    "valor de mercado",
    "market cap",
    "patrimônio",
    "rentabilidade",
];

/// Bounds applied by keyword extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcerptLimits {
    /// Maximum number of kept lines. Default: 35.
    pub max_lines: usize,

    /// Maximum characters per kept line before the ellipsis. Default: 220.
    pub max_line_chars: usize,

    /// Lines shorter than this are treated as noise. Default: 12.
    pub min_line_chars: usize,

    /// Prefix length returned when no line matches. Default: 1,200.
    pub fallback_prefix_chars: usize,
}

impl Default for ExcerptLimits {
    fn default() -> Self {
        Self {
            max_lines: 35,
            max_line_chars: 220,
            min_line_chars: 12,
            fallback_prefix_chars: 1_200,
        }
    }
}

/// Configuration passed to [`ResilientFetchExtractor`](crate::ResilientFetchExtractor).
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Scheme and host of the data site, without a trailing path.
    pub base_url: String,

    /// Wait for a single candidate before moving on. Default: 12 s.
    pub per_candidate_timeout: Duration,

    /// `User-Agent` sent with every request.
    pub user_agent: String,

    /// `Accept-Language` sent with every request.
    pub accept_language: String,

    /// Lower-case keywords for relevance filtering.
    pub keywords: Vec<String>,

    pub limits: ExcerptLimits,

    /// Cap on reduced plain text. Default: 12,000 characters.
    pub max_text_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            per_candidate_timeout: Duration::from_secs(12),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            accept_language: "pt-BR,pt;q=0.9,en;q=0.8".to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            limits: ExcerptLimits::default(),
            max_text_chars: 12_000,
        }
    }
}

impl ExtractorConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data site host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-candidate timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_candidate_timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace the keyword list. Keywords are lower-cased.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .collect();
        self
    }

    /// Set excerpt bounds.
    pub fn with_limits(mut self, limits: ExcerptLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Upper bound on total time spent trying `candidate_count` URLs.
    pub fn max_elapsed(&self, candidate_count: usize) -> Duration {
        self.per_candidate_timeout
            .saturating_mul(u32::try_from(candidate_count).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.max_text_chars, 12_000);
        assert_eq!(config.limits.max_lines, 35);
        assert_eq!(config.limits.max_line_chars, 220);
        assert_eq!(config.limits.fallback_prefix_chars, 1_200);
        assert!(config.keywords.iter().any(|k| k == "vacância"));
    }

    #[test]
    fn test_builder() {
        let config = ExtractorConfig::new()
            .with_base_url("http://localhost:9999")
            .with_timeout(Duration::from_millis(500))
            .with_keywords(["Preço", "DY"]);

        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.per_candidate_timeout, Duration::from_millis(500));
        assert_eq!(config.keywords, vec!["preço", "dy"]);
        assert_eq!(config.max_elapsed(4), Duration::from_secs(2));
    }

    #[test]
    fn test_max_elapsed_saturates() {
        let config = ExtractorConfig::new().with_timeout(Duration::from_secs(12));
        assert_eq!(
            config.max_elapsed(usize::MAX),
            Duration::from_secs(12 * u64::from(u32::MAX))
        );

        let config = ExtractorConfig::new().with_timeout(Duration::MAX);
        assert_eq!(config.max_elapsed(2), Duration::MAX);
    }
}
