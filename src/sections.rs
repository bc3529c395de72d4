use scraper::{ElementRef, Html};

use crate::dom;

/// Heading levels that open a new section.
const SECTION_HEADINGS: [&str; 2] = ["h2", "h3"];

/// One heading and the HTML that follows it up to the next section heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub content_html: String,
}

fn is_section_heading(element: &ElementRef<'_>) -> bool {
    SECTION_HEADINGS.contains(&element.value().name())
}

/// Lazily yields one [`Section`] per `h2`/`h3` in document order.
///
/// Content is gathered from the heading's following siblings only, never
/// from their parents, so a heading nested in a wrapper `<div>` collects
/// just what sits next to it inside that wrapper.
pub fn iter_sections(document: &Html) -> impl Iterator<Item = Section> + '_ {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(is_section_heading)
        .map(section_at)
}

fn section_at(heading: ElementRef<'_>) -> Section {
    let title = clean_heading(&dom::joined_text(heading, " "));

    let mut parts = Vec::new();
    for sibling in heading.next_siblings() {
        if let Some(element) = ElementRef::wrap(sibling) {
            if is_section_heading(&element) {
                break;
            }
            let html = element.html();
            if !html.trim().is_empty() {
                parts.push(html);
            }
        } else if let Some(text) = sibling.value().as_text() {
            if !text.trim().is_empty() {
                parts.push(dom::escape_text(text));
            }
        }
    }

    Section {
        title,
        content_html: parts.join("\n").trim().to_string(),
    }
}

/// Collapses internal whitespace in a heading title.
pub fn clean_heading(title: &str) -> String {
    dom::collapse_whitespace(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(html: &str) -> Vec<Section> {
        let document = Html::parse_document(html);
        iter_sections(&document).collect()
    }

    #[test]
    fn test_two_sections_do_not_share_content() {
        let found = sections(
            "<body><h2>First</h2><p>Alpha text</p><h2>Second</h2><p>Beta text</p></body>",
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].title, "First");
        assert_eq!(found[0].content_html, "<p>Alpha text</p>");
        assert!(!found[0].content_html.contains("Beta"));
        assert_eq!(found[1].title, "Second");
        assert_eq!(found[1].content_html, "<p>Beta text</p>");
        assert!(!found[1].content_html.contains("Alpha"));
    }

    #[test]
    fn test_h3_also_splits_and_h4_does_not() {
        let found = sections(
            "<body><h2>Plan</h2><p>a</p><h4>Detail</h4><p>b</p><h3>Costs</h3><ul><li>c</li></ul></body>",
        );
        let titles: Vec<_> = found.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Plan", "Costs"]);
        assert_eq!(found[0].content_html, "<p>a</p>\n<h4>Detail</h4>\n<p>b</p>");
        assert_eq!(found[1].content_html, "<ul><li>c</li></ul>");
    }

    #[test]
    fn test_heading_without_content_is_empty() {
        let found = sections("<body><h2>Empty</h2>\n  \n<h2>Full</h2><p>x</p></body>");
        assert_eq!(found[0].content_html, "");
        assert_eq!(found[1].content_html, "<p>x</p>");
    }

    #[test]
    fn test_only_direct_siblings_are_collected() {
        let found = sections(
            "<body><div><h2>Inside</h2><p>kept</p></div><p>outside</p><h2>After</h2></body>",
        );
        assert_eq!(found[0].content_html, "<p>kept</p>");
        assert_eq!(found[1].content_html, "");
    }

    #[test]
    fn test_nested_heading_in_sibling_does_not_stop_scan() {
        let found = sections(
            "<body><h2>Outer</h2><div><h3>Inner</h3><p>deep</p></div><p>tail</p></body>",
        );
        assert_eq!(found.len(), 2);
        assert!(found[0].content_html.contains("<h3>Inner</h3>"));
        assert!(found[0].content_html.ends_with("<p>tail</p>"));
        assert_eq!(found[1].title, "Inner");
        assert_eq!(found[1].content_html, "<p>deep</p>");
    }

    #[test]
    fn test_text_siblings_are_escaped_and_comments_dropped() {
        let found = sections("<body><h2>T</h2>Fish &amp; chips<!-- note --><p>p</p></body>");
        assert_eq!(found[0].content_html, "Fish &amp; chips\n<p>p</p>");
    }

    #[test]
    fn test_heading_title_whitespace_is_collapsed() {
        let found = sections("<body><h2>\n  Our   <span>bold</span>\n plan </h2></body>");
        assert_eq!(found[0].title, "Our bold plan");
    }

    #[test]
    fn test_no_headings_yields_nothing() {
        assert!(sections("<body><p>No structure</p></body>").is_empty());
    }

    #[test]
    fn test_clean_heading() {
        assert_eq!(clean_heading("  A \n\t B  "), "A B");
    }
}
