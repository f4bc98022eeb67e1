//! Keyword-relevance extraction over reduced plain text.

use crate::config::ExcerptLimits;
use crate::html::truncate_chars;

/// Marker appended to anything that was cut.
pub const ELLIPSIS: &str = "…";

/// Keep the lines that mention a keyword, bounded by `max_lines` and `max_line_chars`.
///
/// Uses the default noise threshold and fallback prefix length. See
/// [`extract_with_limits`] for full control.
pub fn extract_relevant_lines<K: AsRef<str>>(
    plain_text: &str,
    keywords: &[K],
    max_lines: usize,
    max_line_chars: usize,
) -> String {
    let limits = ExcerptLimits {
        max_lines,
        max_line_chars,
        ..ExcerptLimits::default()
    };
    extract_with_limits(plain_text, keywords, &limits)
}

/// Keyword extraction with explicit bounds.
///
/// Falls back to a capped prefix of `plain_text` when no line matches, so
/// the caller always gets some context.
pub fn extract_with_limits<K: AsRef<str>>(
    plain_text: &str,
    keywords: &[K],
    limits: &ExcerptLimits,
) -> String {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let kept: Vec<String> = plain_text
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() >= limits.min_line_chars)
        .filter(|line| {
            let lower = line.to_lowercase();
            keywords.iter().any(|k| contains_keyword(&lower, k))
        })
        .take(limits.max_lines)
        .map(|line| cap(line, limits.max_line_chars))
        .collect();

    if kept.is_empty() {
        return cap(plain_text.trim(), limits.fallback_prefix_chars);
    }

    kept.join("\n")
}

fn cap(text: &str, max_chars: usize) -> String {
    match truncate_chars(text, max_chars) {
        (head, true) => format!("{}{}", head.trim_end(), ELLIPSIS),
        (whole, false) => whole.to_string(),
    }
}

/// Short keywords ("dy", "roe") must not touch letters on either side; digits
/// are fine ("DY12M"). Longer ones match anywhere.
fn contains_keyword(line: &str, keyword: &str) -> bool {
    if keyword.chars().count() > 3 {
        return line.contains(keyword);
    }

    line.match_indices(keyword).any(|(idx, matched)| {
        let before = line[..idx].chars().next_back();
        let after = line[idx + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphabetic) && !after.is_some_and(char::is_alphabetic)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYWORDS: &[&str] = &["preço", "dy", "p/vp", "vacância"];

    #[test]
    fn test_keeps_only_matching_lines() {
        let text = "Menu principal do site\nPreço atual: R$ 160,00\nFale conosco pelo chat\nDY (12M): 8,5%\nP/VP: 0,95 vezes";
        let excerpt = extract_relevant_lines(text, KEYWORDS, 35, 220);

        assert_eq!(excerpt, "Preço atual: R$ 160,00\nDY (12M): 8,5%\nP/VP: 0,95 vezes");
    }

    #[test]
    fn test_short_keyword_needs_word_boundary() {
        let text = "Everybody loves this study group\nDY do fundo em 12 meses: 9%";
        let excerpt = extract_relevant_lines(text, &["dy"], 35, 220);
        assert_eq!(excerpt, "DY do fundo em 12 meses: 9%");
    }

    #[test]
    fn test_short_keyword_glued_to_digits() {
        let text = "Everybody loves this study group\nDY12M do fundo: 9,1%";
        let excerpt = extract_relevant_lines(text, &["dy"], 35, 220);
        assert_eq!(excerpt, "DY12M do fundo: 9,1%");
    }

    #[test]
    fn test_noise_lines_dropped() {
        let text = "DY\nDY 12 meses: 9,1%";
        let excerpt = extract_relevant_lines(text, KEYWORDS, 35, 220);
        assert_eq!(excerpt, "DY 12 meses: 9,1%");
    }

    #[test]
    fn test_line_and_length_caps() {
        let long = format!("Preço {}", "9".repeat(400));
        let text = std::iter::repeat(long).take(100).collect::<Vec<_>>().join("\n");

        let excerpt = extract_relevant_lines(&text, KEYWORDS, 35, 220);
        let lines: Vec<_> = excerpt.lines().collect();

        assert_eq!(lines.len(), 35);
        for line in lines {
            assert!(line.ends_with(ELLIPSIS));
            assert!(line.chars().count() <= 220 + ELLIPSIS.chars().count());
        }
    }

    #[test]
    fn test_fallback_prefix_when_nothing_matches() {
        let text = "Conteúdo sem indicadores relevantes. ".repeat(100);
        let excerpt = extract_relevant_lines(&text, KEYWORDS, 35, 220);

        assert!(!excerpt.is_empty());
        assert!(excerpt.ends_with(ELLIPSIS));
        assert!(excerpt.chars().count() <= 1_200 + ELLIPSIS.chars().count());
        assert!(text.starts_with(excerpt.trim_end_matches(ELLIPSIS)));
    }

    #[test]
    fn test_fallback_short_text_not_marked() {
        let excerpt = extract_relevant_lines("Página em manutenção", KEYWORDS, 35, 220);
        assert_eq!(excerpt, "Página em manutenção");
    }

    #[test]
    fn test_case_insensitive_match() {
        let excerpt = extract_relevant_lines("VACÂNCIA FÍSICA: 3,2%", KEYWORDS, 35, 220);
        assert_eq!(excerpt, "VACÂNCIA FÍSICA: 3,2%");
    }
}
