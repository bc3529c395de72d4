use anyhow::Result;
use clap::Parser;
use colored::*;
use platform2md::config::{self, DEFAULT_MAX_SENTENCES, DEFAULT_OUTPUT, DEFAULT_USER_AGENT};
use platform2md::{Assembler, ConverterKind, Layout, ScrapeConfig};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "platform2md")]
#[command(about = "CLI utility to turn a list of published policy pages into a single Markdown document")]
#[command(version = "0.1.0")]
struct Args {
    /// Markdown file to write (overwritten on every run)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// JSON file with [{"name": ..., "url": ...}] entries replacing the built-in page list
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(short = 't', long = "timeout", default_value = "30.0", value_parser = parse_timeout)]
    timeout: f64,

    /// User-Agent header sent with every request
    #[arg(long = "user-agent", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Maximum number of sentences kept in each page summary
    #[arg(long = "max-sentences", default_value_t = DEFAULT_MAX_SENTENCES)]
    max_sentences: usize,

    /// Number of pages fetched at once (output order is unaffected)
    #[arg(short = 'c', long = "concurrency", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    concurrency: u16,

    /// HTML to Markdown strategy
    #[arg(long = "converter", value_enum, default_value_t = ConverterKind::Htmd)]
    converter: ConverterKind,

    /// Layout of each page entry
    #[arg(long = "layout", value_enum, default_value_t = Layout::Plain)]
    layout: Layout,
}

fn parse_timeout(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|_| "Not a number.")?;
    if !value.is_finite() || value <= 0.0 {
        return Err("Must be a positive number.".to_string());
    }
    Ok(value)
}

fn build_config(args: &Args) -> Result<ScrapeConfig> {
    let jobs = match &args.jobs {
        Some(path) => {
            info!("Loading page list from {}", path.display().to_string().green());
            config::load_jobs(path)?
        }
        None => config::default_jobs(),
    };

    Ok(ScrapeConfig {
        jobs,
        output: args.output.clone(),
        user_agent: args.user_agent.clone(),
        timeout: Duration::from_secs_f64(args.timeout),
        max_sentences: args.max_sentences,
        concurrency: usize::from(args.concurrency),
        layout: args.layout,
    })
}

async fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    let assembler = Assembler::with_http(config, args.converter)?;
    assembler.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries only the per-page status lines.
    let filter = EnvFilter::from_default_env()
        .add_directive("platform2md=info".parse().unwrap())
        .add_directive("html5ever=off".parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("{}", format!("Error: {:#}", e).red());
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30"), Ok(30.0));
        assert_eq!(parse_timeout("2.5"), Ok(2.5));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["platform2md"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.jobs, config::default_jobs());
        assert_eq!(config.output, PathBuf::from("transition_mtl_platform.md"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_sentences, 3);
        assert_eq!(config.concurrency, 1);
        assert_eq!(args.converter, ConverterKind::Htmd);
        assert_eq!(config.layout, Layout::Plain);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::parse_from([
            "platform2md",
            "-o",
            "out/doc.md",
            "--converter",
            "fallback",
            "--layout",
            "annotated",
            "-c",
            "4",
            "--max-sentences",
            "2",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.output, PathBuf::from("out/doc.md"));
        assert_eq!(args.converter, ConverterKind::Fallback);
        assert_eq!(config.layout, Layout::Annotated);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.max_sentences, 2);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Args::try_parse_from(["platform2md", "-c", "0"]).is_err());
    }
}
