//! HTML to plain text reduction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Blocks whose content is never text
    static ref SCRIPT_REGEX: Regex = Regex::new(r"(?is)<script\b[^>]*>.*?(?:</script\s*>|\z)").unwrap();
    static ref STYLE_REGEX: Regex = Regex::new(r"(?is)<style\b[^>]*>.*?(?:</style\s*>|\z)").unwrap();
    static ref NOSCRIPT_REGEX: Regex = Regex::new(r"(?is)<noscript\b[^>]*>.*?(?:</noscript\s*>|\z)").unwrap();
    static ref COMMENT_REGEX: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();

    // Block closers and line breaks become newlines
    static ref BLOCK_BREAK_REGEX: Regex =
        Regex::new(r"(?i)</(?:div|p|li|tr|h[1-6])\s*>|<br\s*/?>").unwrap();

    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref HSPACE_REGEX: Regex = Regex::new(r"[ \t\x0B\x0C\u{00A0}]+").unwrap();
    static ref MULTI_NEWLINE_REGEX: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Reduce an HTML document to readable plain text of at most `max_chars` characters.
pub fn reduce_to_plain_text(html: &str, max_chars: usize) -> String {
    let mut text = SCRIPT_REGEX.replace_all(html, "").into_owned();
    text = STYLE_REGEX.replace_all(&text, "").into_owned();
    text = NOSCRIPT_REGEX.replace_all(&text, "").into_owned();
    text = COMMENT_REGEX.replace_all(&text, "").into_owned();

    text = text.replace("\r\n", "\n").replace('\r', "\n");
    text = BLOCK_BREAK_REGEX.replace_all(&text, "\n").into_owned();
    text = TAG_REGEX.replace_all(&text, "").into_owned();

    // &amp; last so "&amp;lt;" stays "&lt;"
    text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    text = HSPACE_REGEX.replace_all(&text, " ").into_owned();
    text = text.lines().map(str::trim).collect::<Vec<_>>().join("\n");
    text = MULTI_NEWLINE_REGEX.replace_all(&text, "\n\n").into_owned();

    truncate_chars(text.trim(), max_chars).0.to_string()
}

/// Split `text` at `max_chars` characters. The flag reports whether anything was cut.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}
