//! Small helpers over the `scraper` DOM shared by the extractors.

use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Trimmed, non-empty text pieces of `element` joined with `sep`.
pub(crate) fn joined_text(element: ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

pub(crate) fn has_text(element: ElementRef<'_>) -> bool {
    element.text().any(|piece| !piece.trim().is_empty())
}

/// Collapses every whitespace run to a single space and trims the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Escapes text so it can be re-parsed as HTML without changing meaning.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_joined_text_trims_pieces() {
        let html = Html::parse_fragment("<p>  Hello <b> bold </b>\n world  </p>");
        let selector = Selector::parse("p").unwrap();
        let p = html.select(&selector).next().unwrap();
        assert_eq!(joined_text(p, " "), "Hello bold world");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Our \n\t plan  "), "Our plan");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }
}
