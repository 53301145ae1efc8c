//! # newsstand
//!
//! Crawls several Spanish news sites and collapses every article they publish
//! onto one normalized record schema.
//!
//! ## Usage
//!
//! ```sh
//! newsstand -o ./articles
//! ```
//!
//! ## Architecture
//!
//! Each source runs as an independent worker; all workers share one storage
//! sink and nothing else:
//! 1. **Classification**: links on section pages are matched against the
//!    source's ordered rules (follow, extract, or ignore)
//! 2. **Extraction**: article pages go through the source's adapter
//! 3. **Normalization**: dates, tags and authors are normalized into an
//!    [`models::ArticleRecord`]
//! 4. **Storage**: the record is appended to a dated JSON-lines file

use clap::Parser;
use futures::future::join_all;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod assemble;
mod classify;
mod cli;
mod config;
mod context;
mod crawl;
mod dates;
mod fetch;
mod models;
mod normalize;
mod profile;
mod sources;
mod storage;
mod utils;

use cli::{Cli, DEFAULT_OUTPUT_DIR};
use config::Config;
use context::RunContext;
use crawl::{CrawlStats, crawl_source};
use fetch::{HttpFetcher, RetryFetch};
use profile::SourceProfile;
use sources::{ExtractionAdapter, SourceId};
use storage::{JsonLinesSink, LogSink, StorageSink};
use utils::ensure_writable_dir;

const FETCH_RETRIES: usize = 3;
const FETCH_BASE_DELAY: Duration = Duration::from_secs(1);

/// Everything one source worker needs.
struct Worker {
    profile: SourceProfile,
    adapter: Box<dyn ExtractionAdapter>,
    fetcher: RetryFetch<HttpFetcher>,
    ctx: RunContext,
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsstand starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref())?;

    let ids: Vec<SourceId> = if args.sources.is_empty() {
        SourceId::ALL
            .into_iter()
            .filter(|id| config.is_enabled(*id))
            .collect()
    } else {
        args.sources.clone()
    };
    if ids.is_empty() {
        warn!("No sources enabled; nothing to do");
        return Ok(());
    }

    let mut workers = Vec::with_capacity(ids.len());
    for id in ids {
        let mut profile = id.profile()?;
        config.apply(&mut profile)?;
        if args.max_pages.is_some() {
            profile.max_pages = args.max_pages;
        }
        let fetcher = RetryFetch::new(
            HttpFetcher::new(&profile.user_agent, config.request_timeout())?,
            FETCH_RETRIES,
            FETCH_BASE_DELAY,
        );
        info!(
            source = %id,
            seeds = profile.seed_urls.len(),
            rules = profile.rules.len(),
            delay_ms = profile.delay.as_millis() as u64,
            "Source ready"
        );
        workers.push(Worker {
            adapter: id.adapter()?,
            ctx: RunContext::new(id.as_str()),
            profile,
            fetcher,
        });
    }

    let totals = if args.dry_run {
        info!("Dry run: records will be logged, not stored");
        run_workers(&workers, &LogSink).await
    } else {
        let output_dir = args
            .output_dir
            .clone()
            .or_else(|| config.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        if let Err(e) = ensure_writable_dir(&output_dir).await {
            error!(
                path = %output_dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
        let sink = JsonLinesSink::new(&output_dir);
        let totals = run_workers(&workers, &sink).await;
        info!(path = %sink.current_file().display(), "Articles written");
        totals
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        pages = totals.pages_fetched,
        fetch_failures = totals.fetch_failures,
        stored = totals.articles_stored,
        storage_failures = totals.storage_failures,
        "Execution complete"
    );

    Ok(())
}

/// Run every worker concurrently against one sink and sum their counters.
#[instrument(level = "info", skip_all, fields(workers = workers.len()))]
async fn run_workers<S: StorageSink>(workers: &[Worker], sink: &S) -> CrawlStats {
    let results = join_all(workers.iter().map(|w| {
        crawl_source(&w.profile, w.adapter.as_ref(), &w.fetcher, sink, &w.ctx)
    }))
    .await;

    results
        .into_iter()
        .fold(CrawlStats::default(), |acc, s| CrawlStats {
            pages_fetched: acc.pages_fetched + s.pages_fetched,
            fetch_failures: acc.fetch_failures + s.fetch_failures,
            articles_stored: acc.articles_stored + s.articles_stored,
            storage_failures: acc.storage_failures + s.storage_failures,
        })
}
