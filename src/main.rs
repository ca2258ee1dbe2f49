//! `curate`: run the curation pipeline over a JSON array of news items.
//!
//! Reads items from `--input` (or `-` for stdin), writes the selected items as pretty
//! JSON to `--output` (or stdout). Stage summaries go to stderr through tracing.

use ai_digest_curator::{CurationConfig, Curator, NewsItem};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::io::{self as stdio, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "curate")]
#[command(about = "Deduplicate, filter, classify, score and select AI news items for a daily digest")]
struct Args {
    /// JSON array of items; `-` reads stdin
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the selected items (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (default: $CURATION_CONFIG_PATH, then config/curation.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override selection.max_count
    #[arg(short = 'n', long)]
    max_count: Option<usize>,

    /// Skip the external judge; keyword layers only
    #[arg(long)]
    offline: bool,

    /// JSON log lines instead of compact text
    #[arg(long)]
    log_json: bool,

    /// Reference time for recency scoring (RFC 3339, default: now)
    #[arg(long)]
    now: Option<String>,
}

/// Logs go to stderr so stdout stays clean for the JSON output.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(stdio::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(stdio::stderr))
            .init();
    }
}

fn read_items(path: &Path) -> Result<Vec<NewsItem>> {
    let raw = if path.as_os_str() == "-" {
        let mut s = String::new();
        stdio::stdin()
            .read_to_string(&mut s)
            .context("reading items from stdin")?;
        s
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading items from {}", path.display()))?
    };
    serde_json::from_str(&raw).context("input is not a JSON array of news items")
}

fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("--now is not RFC 3339: {s}"))?
            .with_timezone(&Utc)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; provider keys usually live there.
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut config = match &args.config {
        Some(p) => {
            let mut c = CurationConfig::load_from_file(p)?;
            c.apply_env_overrides();
            c
        }
        None => CurationConfig::load_default()?,
    };
    if let Some(n) = args.max_count {
        config.selection.max_count = n;
    }

    let curator = if args.offline {
        Curator::offline(config)?
    } else {
        Curator::from_config(config)?
    };
    let now = parse_now(args.now.as_deref())?;

    let items = read_items(&args.input)?;
    info!(target: "pipeline", items = items.len(), judge = curator.has_judge(), "starting curation");
    let curation = curator.curate(items, now).await;
    info!(target: "pipeline", stats = ?curation.stats, "run summary");

    let body = serde_json::to_string_pretty(&curation.items)?;
    match &args.output {
        Some(p) => std::fs::write(p, body + "\n")
            .with_context(|| format!("writing output to {}", p.display()))?,
        None => {
            let mut out = stdio::stdout().lock();
            writeln!(out, "{body}")?;
        }
    }
    Ok(())
}
