//! Per-source crawl worker.
//!
//! One worker walks one source breadth-first from its seed URLs:
//!
//! 1. **Navigate** pages are fetched and their links classified; accepted
//!    links join the frontier
//! 2. **Extract** pages are run through the source's adapter, assembled and
//!    stored; their links are not followed
//!
//! Every URL is fetched at most once per run, requests to the source are
//! spaced by the profile's politeness delay, and no failure stops the crawl.

use crate::assemble::assemble_and_store;
use crate::classify::{classify, discover_links};
use crate::context::RunContext;
use crate::fetch::{Fetch, FetchedBody};
use crate::models::RawExtraction;
use crate::profile::{Classification, SourceProfile};
use crate::sources::{ExtractionAdapter, FetchedPage};
use crate::storage::StorageSink;
use std::collections::{HashSet, VecDeque};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Counters reported when a worker finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub articles_stored: usize,
    pub storage_failures: usize,
}

/// Crawl one source until its frontier is empty or its page budget is spent.
///
/// # Arguments
///
/// * `profile` - Seeds, rules, delay and page budget of the source
/// * `adapter` - Field extractor for the source's article pages
/// * `fetcher` - Page retrieval, usually a [`crate::fetch::RetryFetch`]
/// * `sink` - Where assembled records go
/// * `ctx` - Source id and run id attached to every log line
///
/// # Returns
///
/// Counters for fetched pages, stored articles and both kinds of failure.
/// Failures are counted and logged, never returned.
#[instrument(level = "info", skip_all, fields(source = %ctx.source, run = %ctx.run_id))]
pub async fn crawl_source<F, S>(
    profile: &SourceProfile,
    adapter: &dyn ExtractionAdapter,
    fetcher: &F,
    sink: &S,
    ctx: &RunContext,
) -> CrawlStats
where
    F: Fetch,
    S: StorageSink,
{
    let mut stats = CrawlStats::default();
    let mut seen: HashSet<Url> = HashSet::new();
    let mut frontier: VecDeque<(Url, Classification)> = VecDeque::new();
    for seed in &profile.seed_urls {
        if seen.insert(seed.clone()) {
            frontier.push_back((seed.clone(), Classification::Navigate));
        }
    }
    info!(newspaper = %profile.name, seeds = frontier.len(), max_pages = ?profile.max_pages, "Starting crawl");

    let mut requests = 0usize;
    while let Some((url, kind)) = frontier.pop_front() {
        if profile.max_pages.is_some_and(|max| requests >= max) {
            info!(remaining = frontier.len() + 1, "Page budget spent; stopping");
            break;
        }
        if requests > 0 && !profile.delay.is_zero() {
            sleep(profile.delay).await;
        }
        requests += 1;

        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, error = %e, "Fetch failed; dropping URL");
                stats.fetch_failures += 1;
                continue;
            }
        };
        stats.pages_fetched += 1;

        match kind {
            Classification::Extract => {
                let raw = extract_page(adapter, body);
                match assemble_and_store(raw, profile, ctx, sink).await {
                    Ok(_) => stats.articles_stored += 1,
                    Err(_) => stats.storage_failures += 1,
                }
            }
            Classification::Navigate => {
                let mut queued = 0usize;
                for (next, class) in follow_links(profile, &body) {
                    if seen.insert(next.clone()) {
                        frontier.push_back((next, class));
                        queued += 1;
                    }
                }
                debug!(%url, queued, frontier = frontier.len(), "Classified page links");
            }
            Classification::Ignore => {}
        }
    }

    info!(
        pages = stats.pages_fetched,
        fetch_failures = stats.fetch_failures,
        stored = stats.articles_stored,
        storage_failures = stats.storage_failures,
        "Crawl finished"
    );
    stats
}

fn extract_page(adapter: &dyn ExtractionAdapter, body: FetchedBody) -> RawExtraction {
    let page = FetchedPage::parse(body.url, &body.html);
    adapter.extract(&page)
}

/// Links on a navigation page worth visiting, with what to do with each.
fn follow_links(profile: &SourceProfile, body: &FetchedBody) -> Vec<(Url, Classification)> {
    let page = FetchedPage::parse(body.url.clone(), &body.html);
    discover_links(&page.document, &page.url, profile)
        .into_iter()
        .filter_map(|link| match classify(profile, &link) {
            Classification::Ignore => None,
            class => Some((link.url, class)),
        })
        .collect()
}
