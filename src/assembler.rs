use anyhow::{Context, Result};
use colored::*;
use futures_util::stream::{self, StreamExt};
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::config::{self, Layout, PageJob, ScrapeConfig};
use crate::converter::{ConverterKind, MarkdownConverter};
use crate::error::ScrapeError;
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::sections::{self, Section};
use crate::summary;

const SEPARATOR: &str = "\n---\n";
const SUMMARY_HEADING: &str = "## In just a few sentences...\n";
const CONTENT_HEADING: &str = "## [CONTENT]\n";
const NO_SUMMARY: &str = "_(No short summary detected — see sections below.)_\n";
const NO_SECTION_CONTENT: &str = "_(No content under this heading.)_";

/// Result of scraping one job. `chunk` is always present; failed pages carry
/// the placeholder chunk and the error text.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub job: PageJob,
    pub chunk: String,
    pub error: Option<String>,
}

impl PageOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Drives fetch, extraction and conversion for every job and writes the
/// combined Markdown document.
pub struct Assembler {
    config: ScrapeConfig,
    fetcher: Box<dyn PageFetcher>,
    converter: Box<dyn MarkdownConverter>,
}

impl Assembler {
    pub fn new(
        config: ScrapeConfig,
        fetcher: Box<dyn PageFetcher>,
        converter: Box<dyn MarkdownConverter>,
    ) -> Self {
        Self {
            config,
            fetcher,
            converter,
        }
    }

    /// Builds an assembler that fetches over HTTP with the configured user
    /// agent and timeout.
    pub fn with_http(config: ScrapeConfig, kind: ConverterKind) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let fetcher = HttpFetcher::new(&config.user_agent, config.timeout)?;
        Ok(Self::new(config, Box::new(fetcher), kind.build()))
    }

    pub async fn run(&self) -> Result<PathBuf> {
        info!(
            "Scraping {} pages into \"{}\"",
            self.config.jobs.len(),
            self.config.output.display().to_string().blue()
        );

        let outcomes = self.scrape_all().await;
        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            "Scraped {} pages ({} ok, {} failed)",
            outcomes.len(),
            outcomes.len() - failed,
            failed
        );

        let document = assemble(&outcomes);
        let written = write_output(&self.config.output, &document).await?;

        println!("\nWrote: {}", written.display());
        Ok(written)
    }

    /// One outcome per job, in job order. Fetches overlap up to the
    /// configured concurrency; a failing page never stops the others.
    pub async fn scrape_all(&self) -> Vec<PageOutcome> {
        stream::iter(self.config.jobs.iter())
            .map(|job| self.scrape_page(job))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    async fn scrape_page(&self, job: &PageJob) -> PageOutcome {
        info!("Visiting \"{}\"", job.url.green());

        let result = match config::parse_job_url(job) {
            Ok(_) => self
                .fetcher
                .fetch(&job.url)
                .await
                .and_then(|html| self.render_page(job, &html)),
            Err(e) => Err(e),
        };

        match result {
            Ok(chunk) => {
                println!("[ok] Scraped: {} -> {}", job.name, job.url);
                PageOutcome {
                    job: job.clone(),
                    chunk,
                    error: None,
                }
            }
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::new(e));
                debug!("Failed to scrape {}: {}", job.url, message);
                eprintln!("[fail] {} -> {}: {}", job.name, job.url, message);
                PageOutcome {
                    job: job.clone(),
                    chunk: placeholder_chunk(job),
                    error: Some(message),
                }
            }
        }
    }

    /// Renders one fetched page into its Markdown chunk.
    pub fn render_page(&self, job: &PageJob, html: &str) -> Result<String, ScrapeError> {
        let document = Html::parse_document(html);

        let summary = summary::extract_summary(&document, self.config.max_sentences);
        let sections: Vec<Section> = sections::iter_sections(&document).collect();
        debug!(
            "{}: summary of {} chars, {} sections",
            job.name,
            summary.len(),
            sections.len()
        );

        let mut lines = vec![format!("# Name: {}", job.name), format!("URL: {}\n", job.url)];

        match self.config.layout {
            Layout::Plain => {
                lines.push(self.converter.convert(&summary)?);
                if sections.is_empty() {
                    lines.push(self.converter.convert(&body_html(&document))?);
                } else {
                    for section in &sections {
                        lines.push(section.title.clone());
                        lines.push(self.converter.convert(&section.content_html)?);
                    }
                }
            }
            Layout::Annotated => {
                if summary.is_empty() {
                    lines.push(NO_SUMMARY.to_string());
                } else {
                    lines.push(self.converter.convert(&summary)?);
                }

                if sections.is_empty() {
                    lines.push(CONTENT_HEADING.to_string());
                    lines.push(self.converter.convert(&body_html(&document))?);
                } else {
                    for section in sections.iter().filter(|s| !s.title.is_empty()) {
                        lines.push(format!("## [{}]\n", section.title));
                        if section.content_html.is_empty() {
                            lines.push(NO_SECTION_CONTENT.to_string());
                        } else {
                            lines.push(self.converter.convert(&section.content_html)?);
                        }
                    }
                }
            }
        }

        lines.push(SEPARATOR.to_string());
        Ok(lines.join("\n"))
    }
}

/// `<body>` markup, or the whole document when there is no body element.
fn body_html(document: &Html) -> String {
    Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next().map(|body| body.html()))
        .unwrap_or_else(|| document.html())
}

/// Chunk emitted in place of a page that could not be scraped.
pub fn placeholder_chunk(job: &PageJob) -> String {
    format!(
        "# Name: {}\nURL: {}\n\n\
         {}_(Error scraping this page — fill manually.)_\n\n\
         {}_(No content scraped due to error.)_\n\n---\n",
        job.name, job.url, SUMMARY_HEADING, CONTENT_HEADING
    )
}

/// Joins chunks in order, one newline between each.
pub fn assemble(outcomes: &[PageOutcome]) -> String {
    outcomes
        .iter()
        .map(|outcome| outcome.chunk.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Overwrites `path` with `document` and returns its absolute path.
async fn write_output(path: &Path, document: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, document)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let resolved = fs::canonicalize(path)
        .await
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    info!("Markdown saved to: {}", resolved.display().to_string().blue());

    Ok(resolved)
}
