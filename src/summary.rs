use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use crate::dom;

/// Meta tags tried in order when looking for a page description.
const DESCRIPTION_SELECTORS: [&str; 4] = [
    r#"meta[name="description"]"#,
    r#"meta[name="Description"]"#,
    r#"meta[property="og:description"]"#,
    r#"meta[name="twitter:description"]"#,
];

/// Sentence-ending punctuation, the whitespace gap, then the first character
/// of the next sentence. Group 1 is the gap.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](\s+)[A-ZÉÈÊÀÂÎÔÛÇa-z0-9]").unwrap());

static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

/// First non-empty `content` among the description meta tags.
pub fn meta_description(document: &Html) -> Option<String> {
    for selector_str in DESCRIPTION_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let content = document
            .select(&selector)
            .next()
            .and_then(|tag| tag.value().attr("content"))
            .map(str::trim)
            .filter(|content| !content.is_empty());

        if let Some(content) = content {
            debug!("Summary taken from {}", selector_str);
            return Some(content.to_string());
        }
    }
    None
}

/// Text of the first `<p>` that contains anything besides whitespace.
pub fn first_paragraph(document: &Html) -> Option<String> {
    document
        .select(&PARAGRAPH)
        .find(|p| dom::has_text(*p))
        .map(|p| dom::joined_text(p, " "))
}

/// Keeps at most `max_sentences` sentences of `text`, joined by single spaces.
///
/// Text without a detectable boundary counts as one sentence and is returned
/// whole.
pub fn truncate_sentences(text: &str, max_sentences: usize) -> String {
    let text = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;

    for caps in SENTENCE_BOUNDARY.captures_iter(text) {
        if sentences.len() == max_sentences {
            break;
        }
        let Some(gap) = caps.get(1) else { continue };
        sentences.push(&text[start..gap.start()]);
        start = gap.end();
    }
    if sentences.len() < max_sentences {
        sentences.push(&text[start..]);
    }

    sentences.join(" ").trim().to_string()
}

/// Short page summary: meta description, else the first paragraph, else empty.
pub fn extract_summary(document: &Html, max_sentences: usize) -> String {
    let candidate = meta_description(document)
        .or_else(|| first_paragraph(document))
        .unwrap_or_default();
    truncate_sentences(&candidate, max_sentences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_description_priority() {
        let html = Html::parse_document(
            r#"<html><head>
                <meta property="og:description" content="From Open Graph">
                <meta name="description" content="  Standard one.  ">
            </head><body></body></html>"#,
        );
        assert_eq!(meta_description(&html), Some("Standard one.".to_string()));
    }

    #[test]
    fn test_meta_description_skips_empty_content() {
        let html = Html::parse_document(
            r#"<html><head>
                <meta name="description" content="   ">
                <meta name="Description" content="">
                <meta name="twitter:description" content="From Twitter">
            </head></html>"#,
        );
        assert_eq!(meta_description(&html), Some("From Twitter".to_string()));
    }

    #[test]
    fn test_meta_description_capitalized_variant() {
        let html = Html::parse_document(
            r#"<html><head><meta name="Description" content="Capitalized"></head></html>"#,
        );
        assert_eq!(meta_description(&html), Some("Capitalized".to_string()));
    }

    #[test]
    fn test_first_paragraph_skips_blank() {
        let html = Html::parse_document(
            "<body><p>   </p><p><span></span></p><p>First <em>real</em>\n paragraph.</p><p>Second.</p></body>",
        );
        assert_eq!(
            first_paragraph(&html),
            Some("First real paragraph.".to_string())
        );
    }

    #[test]
    fn test_truncate_to_three_sentences() {
        let text = "One is here. Two follows! Three asks? Four is cut. Five too.";
        assert_eq!(
            truncate_sentences(text, 3),
            "One is here. Two follows! Three asks?"
        );
    }

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate_sentences("  Only one.  ", 3), "Only one.");
        assert_eq!(truncate_sentences("A. B.", 3), "A. B.");
        assert_eq!(truncate_sentences("", 3), "");
    }

    #[test]
    fn test_truncate_normalizes_gap_whitespace() {
        assert_eq!(truncate_sentences("First.\n\n  Second.", 3), "First. Second.");
    }

    #[test]
    fn test_truncate_accented_capitals() {
        let text = "La ville change. École ouverte. Ça roule. Trop tard.";
        assert_eq!(
            truncate_sentences(text, 3),
            "La ville change. École ouverte. Ça roule."
        );
    }

    #[test]
    fn test_truncate_ignores_decimal_points() {
        assert_eq!(
            truncate_sentences("Fares drop 2.5 percent. Then more. And more. Done.", 2),
            "Fares drop 2.5 percent. Then more."
        );
    }

    #[test]
    fn test_extract_summary_falls_back_to_paragraph() {
        let html = Html::parse_document(
            "<html><body><h2>Intro</h2><p>Alpha. Beta. Gamma. Delta.</p></body></html>",
        );
        assert_eq!(extract_summary(&html, 3), "Alpha. Beta. Gamma.");
    }

    #[test]
    fn test_extract_summary_empty_document() {
        let html = Html::parse_document("<html><body><div></div></body></html>");
        assert_eq!(extract_summary(&html, 3), "");
    }
}
