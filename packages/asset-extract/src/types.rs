//! Request and result types for the fetch pipeline.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::candidates::normalize_identifier;

/// Investment instrument category.
///
/// Selects the URL template used for the first candidate. Categories
/// without a dedicated page on the data site fall back to the default
/// (stock) template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Stock,
    RealEstateFund,
    Etf,
    Bdr,
    Crypto,
    Index,
    FixedIncome,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Stock,
        Category::RealEstateFund,
        Category::Etf,
        Category::Bdr,
        Category::Crypto,
        Category::Index,
        Category::FixedIncome,
    ];

    /// Parse a form label such as `"acoes"`, `"FII"` or `"Ações"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let folded: String = label
            .trim()
            .nfd()
            .filter(|c| c.is_ascii())
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match folded.as_str() {
            "acoes" | "acao" | "stock" | "stocks" => Some(Self::Stock),
            "fii" | "fiis" | "real_estate_fund" => Some(Self::RealEstateFund),
            "etf" | "etfs" => Some(Self::Etf),
            "bdr" | "bdrs" => Some(Self::Bdr),
            "cripto" | "criptomoeda" | "criptomoedas" | "crypto" => Some(Self::Crypto),
            "indice" | "indices" | "index" => Some(Self::Index),
            "renda_fixa" | "fixed_income" => Some(Self::FixedIncome),
            _ => None,
        }
    }

    /// Canonical form label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stock => "acoes",
            Self::RealEstateFund => "fii",
            Self::Etf => "etf",
            Self::Bdr => "bdr",
            Self::Crypto => "cripto",
            Self::Index => "indice",
            Self::FixedIncome => "renda_fixa",
        }
    }

    /// Path template on the data site; `{slug}` is substituted.
    pub fn url_template(&self) -> &'static str {
        match self {
            Self::Stock => "/acoes/{slug}/",
            Self::RealEstateFund => "/fiis/{slug}/",
            Self::Etf => "/etfs/{slug}/",
            Self::Bdr => "/bdrs/{slug}/",
            Self::Crypto => "/criptomoedas/{slug}/",
            Self::Index => "/indices/{slug}/",
            Self::FixedIncome => DEFAULT_TEMPLATE,
        }
    }

    /// Two-digit ticker suffix the category requires when absent.
    pub fn required_suffix(&self) -> Option<&'static str> {
        match self {
            Self::RealEstateFund | Self::Etf => Some("11"),
            Self::Bdr => Some("34"),
            _ => None,
        }
    }
}

/// Template used when a category has no page of its own.
pub const DEFAULT_TEMPLATE: &str = "/acoes/{slug}/";

/// A lookup of one instrument on the data site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub identifier: String,
    pub category: Category,
}

impl FetchRequest {
    pub fn new(identifier: impl Into<String>, category: Category) -> Self {
        Self {
            identifier: identifier.into(),
            category,
        }
    }

    /// Identifier folded to upper-case ASCII alphanumerics.
    pub fn normalized_identifier(&self) -> String {
        normalize_identifier(&self.identifier)
    }

    pub fn is_valid(&self) -> bool {
        !self.normalized_identifier().is_empty()
    }
}

/// Final stage of [`lookup`](crate::ResilientFetchExtractor::lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcerptMode {
    /// Whole page reduced to plain text, capped
    FullText,
    /// Only lines mentioning a configured keyword
    #[default]
    Keywords,
}

/// Outcome of one fetch.
///
/// Built once and read-only afterwards. Failures are carried as data:
/// `ok == false` with a non-empty `error_detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    ok: bool,
    url: String,
    raw_text: String,
    error_detail: String,
}

impl FetchResult {
    /// Sentinel URL when no candidate could be built.
    pub const NO_URL: &'static str = "N/A";

    pub fn success(url: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            ok: true,
            url: url.into(),
            raw_text: raw_text.into(),
            error_detail: String::new(),
        }
    }

    pub fn failure(url: impl Into<String>, error_detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            url: url.into(),
            raw_text: String::new(),
            error_detail: error_detail.into(),
        }
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Page body, or the excerpt when produced by `lookup`.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn error_detail(&self) -> &str {
        &self.error_detail
    }

    /// Replace the body of a successful result, consuming it.
    pub(crate) fn map_text(self, f: impl FnOnce(&str) -> String) -> Self {
        if !self.ok {
            return self;
        }
        let raw_text = f(&self.raw_text);
        Self { raw_text, ..self }
    }
}
