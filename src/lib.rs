//! # platform2md
//!
//! A CLI utility to turn a list of published policy pages into a single
//! Markdown document.
//!
//! ## Current Features
//!
//! - Page summary from meta descriptions or the first paragraph
//! - Section extraction by `h2`/`h3` headings
//! - HTML to Markdown via `htmd`, or a minimal built-in fallback
//! - Per-page failure isolation: a broken page becomes a placeholder entry
//!
//! ## Usage
//!
//! ```bash
//! platform2md --output transition_mtl_platform.md
//! ```

mod assembler;
mod dom;

pub mod config;
pub mod converter;
pub mod error;
pub mod fetcher;
pub mod sections;
pub mod summary;

pub use assembler::{assemble, placeholder_chunk, Assembler, PageOutcome};
pub use config::{Layout, PageJob, ScrapeConfig};
pub use converter::{ConverterKind, FallbackConverter, HtmdConverter, MarkdownConverter};
pub use error::ScrapeError;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use sections::Section;
