use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) TransitionScraper/1.0 (+script)";
pub const DEFAULT_OUTPUT: &str = "transition_mtl_platform.md";
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;
pub const DEFAULT_MAX_SENTENCES: usize = 3;

const TRANSITION_MTL_PAGES: &[(&str, &str)] = &[
    ("Divesting from genocide", "https://www.transitionmtl.org/desinvestissement"),
    ("Ambitious mass transit", "https://www.transitionmtl.org/transport-collectif"),
    ("Ambitious municipal electoral reform", "https://www.transitionmtl.org/reforme-electorale"),
    ("Public safety centered on dignity", "https://www.transitionmtl.org/securite-publique"),
    ("A safe environment around schools", "https://www.transitionmtl.org/securite-autour-ecoles"),
    ("A protected nightlife", "https://www.transitionmtl.org/vie-nocturne-protegee"),
    ("A public and community food market", "https://www.transitionmtl.org/marche-alimentaire-public-communautaire"),
    ("Social pricing for public transit", "https://www.transitionmtl.org/tarification-sociale-transports"),
    ("A taskforce for simple public works: Infra-Montréal", "https://www.transitionmtl.org/escouade-travaux-publics-infra-montreal"),
    ("A tax on the ultra-wealthy", "https://www.transitionmtl.org/taxe-ultras-riches"),
];

/// A page to scrape: a friendly name and the URL it lives at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageJob {
    pub name: String,
    pub url: String,
}

impl PageJob {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Built-in job list: the Transition Montréal platform pages.
pub fn default_jobs() -> Vec<PageJob> {
    TRANSITION_MTL_PAGES
        .iter()
        .map(|(name, url)| PageJob::new(*name, *url))
        .collect()
}

/// Reads a JSON array of `{ "name": ..., "url": ... }` objects.
pub fn load_jobs(path: &Path) -> Result<Vec<PageJob>> {
    let data = std::fs::read_to_string(path)?;
    let jobs: Vec<PageJob> = serde_json::from_str(&data)?;
    debug!("Loaded {} jobs from {}", jobs.len(), path.display());
    Ok(jobs)
}

/// How each page chunk is laid out in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Layout {
    /// Bare section titles followed by their content
    #[default]
    Plain,
    /// `## [Title]` headings with placeholders for missing summary or content
    Annotated,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub jobs: Vec<PageJob>,
    pub output: PathBuf,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_sentences: usize,
    pub concurrency: usize,
    pub layout: Layout,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            max_sentences: DEFAULT_MAX_SENTENCES,
            concurrency: 1,
            layout: Layout::Plain,
        }
    }
}

impl ScrapeConfig {
    /// Rejects settings that make a run impossible. Per-page problems, bad
    /// URLs included, are left to the run so they only affect their own page.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(ScrapeError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses a job URL, accepting only absolute http(s) URLs.
pub fn parse_job_url(job: &PageJob) -> Result<Url> {
    let url = Url::parse(&job.url).map_err(|source| ScrapeError::InvalidUrl {
        url: job.url.clone(),
        source,
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ScrapeError::Config(format!(
            "unsupported scheme for {}: {}",
            job.name,
            url.scheme()
        )));
    }
    Ok(url)
}
