//! Candidate URL generation.
//!
//! Turns a loosely typed identifier plus a declared category into an
//! ordered, duplicate-free list of page URLs. The declared category comes
//! first; the remaining entries guess other categories in case the user
//! picked the wrong one.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

use crate::types::Category;

/// Categories tried after the declared one, in this order.
pub const FALLBACK_PRIORITY: [Category; 4] = [
    Category::Stock,
    Category::RealEstateFund,
    Category::Etf,
    Category::Bdr,
];

/// Shorthand names mapped to canonical site slugs.
const ALIASES: &[(&str, &str)] = &[
    ("IBOV", "ibovespa"),
    ("IBOVESPA", "ibovespa"),
    ("IFIX", "ifix"),
    ("SP500", "sp500"),
    ("SPX", "sp500"),
    ("BTC", "bitcoin"),
    ("BITCOIN", "bitcoin"),
    ("ETH", "ethereum"),
    ("ETHEREUM", "ethereum"),
    ("DOLAR", "dolar"),
    ("USD", "dolar"),
    ("OURO", "ouro"),
    ("GOLD", "ouro"),
];

/// Trim, fold diacritics, keep ASCII alphanumerics, upper-case.
///
/// `" Itaúsa-4 "` becomes `"ITAUSA4"`.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim()
        .nfd()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Look up the alias table for an already-normalized identifier.
pub fn resolve_alias(normalized: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, slug)| *slug)
}

/// Ticker as the site expects it for `category`, e.g. `HGLG` → `HGLG11` for FIIs.
///
/// Returns `None` when the identifier normalizes to nothing.
pub fn canonical_ticker(identifier: &str, category: Category) -> Option<String> {
    let normalized = normalize_identifier(identifier);
    if normalized.is_empty() {
        return None;
    }
    if resolve_alias(&normalized).is_some() {
        return Some(normalized);
    }
    Some(apply_suffix_rule(&normalized, category))
}

fn apply_suffix_rule(ticker: &str, category: Category) -> String {
    match category.required_suffix() {
        Some(suffix) if !has_two_digit_suffix(ticker) => format!("{}{}", ticker, suffix),
        _ => ticker.to_string(),
    }
}

fn has_two_digit_suffix(ticker: &str) -> bool {
    let bytes = ticker.as_bytes();
    bytes.len() >= 2 && bytes[bytes.len() - 2..].iter().all(u8::is_ascii_digit)
}

fn slug_for(normalized: &str, category: Category) -> String {
    match resolve_alias(normalized) {
        Some(slug) => slug.to_string(),
        None => apply_suffix_rule(normalized, category).to_ascii_lowercase(),
    }
}

/// Build the ordered candidate list under `base_url`.
///
/// Pure function of its inputs. Empty only when the identifier
/// normalizes to an empty string.
pub fn build_candidates(base_url: &str, identifier: &str, category: Category) -> Vec<String> {
    let normalized = normalize_identifier(identifier);
    if normalized.is_empty() {
        return Vec::new();
    }

    let base = base_url.trim_end_matches('/');
    let order = std::iter::once(category).chain(
        FALLBACK_PRIORITY
            .iter()
            .copied()
            .filter(move |c| *c != category),
    );

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for cat in order {
        let path = cat
            .url_template()
            .replace("{slug}", &slug_for(&normalized, cat));
        let url = format!("{}{}", base, path);
        if seen.insert(url.clone()) {
            candidates.push(url);
        }
    }
    candidates
}
