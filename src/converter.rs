//! HTML fragment to Markdown conversion.
//!
//! Two strategies sit behind [`MarkdownConverter`]:
//! - [`HtmdConverter`]: full conversion through `htmd` (ATX headings, `*`
//!   bullets, `<script>`/`<style>` dropped)
//! - [`FallbackConverter`]: a minimal text-oriented rendering that only knows
//!   line breaks, links, lists and paragraphs
//!
//! The strategy is picked once, up front, through [`ConverterKind`].

use htmd::options::{BulletListMarker, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;

use crate::error::{Result, ScrapeError};

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Elements whose text never reaches the output.
const SILENT_TAGS: [&str; 4] = ["script", "style", "template", "noscript"];

pub trait MarkdownConverter {
    /// Converts an HTML fragment. Empty input yields an empty string.
    fn convert(&self, html: &str) -> Result<String>;
}

/// Which converter to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ConverterKind {
    /// Full-featured conversion via htmd
    #[default]
    Htmd,
    /// Minimal built-in rendering
    Fallback,
}

impl ConverterKind {
    pub fn build(self) -> Box<dyn MarkdownConverter> {
        match self {
            ConverterKind::Htmd => Box::new(HtmdConverter::new()),
            ConverterKind::Fallback => Box::new(FallbackConverter),
        }
    }
}

/// Wraps one configured `htmd` converter, reused for every fragment.
pub struct HtmdConverter {
    inner: HtmlToMarkdown,
}

impl HtmdConverter {
    pub fn new() -> Self {
        let inner = HtmlToMarkdown::builder()
            .skip_tags(vec!["script", "style"])
            .options(Options {
                heading_style: HeadingStyle::Atx,
                bullet_list_marker: BulletListMarker::Asterisk,
                ..Default::default()
            })
            .build();

        Self { inner }
    }
}

impl Default for HtmdConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter for HtmdConverter {
    fn convert(&self, html: &str) -> Result<String> {
        if html.trim().is_empty() {
            return Ok(String::new());
        }

        self.inner
            .convert(html)
            .map(|markdown| markdown.trim().to_string())
            .map_err(|e| ScrapeError::Convert(e.to_string()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackConverter;

/// Output of the fallback walk before it is stitched into text.
#[derive(Debug)]
enum Piece {
    Text(String),
    LineBreak,
    ParagraphBreak,
}

impl MarkdownConverter for FallbackConverter {
    fn convert(&self, html: &str) -> Result<String> {
        if html.trim().is_empty() {
            return Ok(String::new());
        }

        let fragment = Html::parse_fragment(html);
        let mut pieces = Vec::new();
        render_children(fragment.root_element(), &mut pieces);

        Ok(stitch(pieces))
    }
}

fn render_children(element: ElementRef<'_>, pieces: &mut Vec<Piece>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => pieces.push(Piece::Text(text.trim().to_string())),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, pieces);
                }
            }
            _ => {}
        }
    }
}

fn render_element(element: ElementRef<'_>, pieces: &mut Vec<Piece>) {
    match element.value().name() {
        "br" => pieces.push(Piece::LineBreak),
        "a" => pieces.push(Piece::Text(link_text(element))),
        "ul" | "ol" => pieces.push(Piece::Text(list_lines(element))),
        "p" => {
            render_children(element, pieces);
            pieces.push(Piece::ParagraphBreak);
        }
        name if SILENT_TAGS.contains(&name) => {}
        _ => render_children(element, pieces),
    }
}

/// `text (href)`, or just the text when the link has no target.
fn link_text(link: ElementRef<'_>) -> String {
    let text = flatten(link);
    match link.value().attr("href") {
        Some(href) if !href.is_empty() => format!("{} ({})", text, href),
        _ => text,
    }
}

/// One `* item` line per direct `<li>` child. Anything nested inside an item,
/// sub-lists included, is folded into that item's line.
fn list_lines(list: ElementRef<'_>) -> String {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(|item| format!("* {}", flatten(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// All visible text under `element` as one space-joined line, links rendered
/// as `text (href)`.
fn flatten(element: ElementRef<'_>) -> String {
    let mut words = Vec::new();
    collect_words(element, &mut words);
    words.join(" ")
}

fn collect_words(element: ElementRef<'_>, words: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    words.push(text.to_string());
                }
            }
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if name == "a" {
                    let text = link_text(child);
                    if !text.is_empty() {
                        words.push(text);
                    }
                } else if !SILENT_TAGS.contains(&name) {
                    collect_words(child, words);
                }
            }
            _ => {}
        }
    }
}

/// Joins text pieces with newlines, honoring explicit breaks, then squeezes
/// blank-line runs down to one blank line.
fn stitch(pieces: Vec<Piece>) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(text);
            }
            Piece::LineBreak => out.push('\n'),
            Piece::ParagraphBreak => out.push_str("\n\n"),
        }
    }

    EXCESS_NEWLINES
        .replace_all(&out, "\n\n")
        .trim()
        .to_string()
}
