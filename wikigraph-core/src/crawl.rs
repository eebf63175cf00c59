use crate::frontier::Frontier;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::store::{Store, StoreTotals};
use crate::writer::write_batch;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;
use wikigraph_scraper::scrape_batch;

pub const DEFAULT_START_URL: &str = "https://fr.wikipedia.org/wiki/Barack_Obama";
pub const DEFAULT_MAX_DISTANCE: u32 = 999;
pub const DEFAULT_PARALLEL_SCRAPES: usize = 10;
pub const DEFAULT_QUEUE_CHUNK_SIZE: u32 = 10_000;

const STORE_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Options for configuring a crawl run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    pub start_url: String,
    pub max_distance: u32,
    pub parallel_scrapes: usize,
    pub queue_chunk_size: u32,
    pub start_mode: StartMode,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            max_distance: DEFAULT_MAX_DISTANCE,
            parallel_scrapes: DEFAULT_PARALLEL_SCRAPES,
            queue_chunk_size: DEFAULT_QUEUE_CHUNK_SIZE,
            start_mode: StartMode::ColdStart,
        }
    }
}

/// How the frontier gets its first items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Seed the frontier with the start URL at distance zero
    ColdStart,
    /// Reload pending pages from the store, seeding only if none are left
    Resume,
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("invalid start URL '{url}': {source}")]
    InvalidStartUrl { url: String, source: url::ParseError },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] wikigraph_scraper::ScrapeError),
}

/// Final numbers reported once the frontier is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub rounds: u64,
    pub metrics: MetricsSnapshot,
    pub totals: StoreTotals,
}

/// Wipe every page and link before a fresh start.
pub fn reset_graph(store: &mut Store) -> Result<(), CrawlError> {
    info!("Resetting graph");
    let (pages, links) = store.reset()?;
    info!("Deleted {} links", links);
    info!("Deleted {} pages", pages);
    Ok(())
}

/// Run the crawl until the store has no pending pages left.
///
/// Each round pops a batch of admitted items, scrapes them concurrently,
/// persists the settled results, and refills the frontier from the store
/// when it runs dry. An empty refill means the whole reachable graph
/// within the distance cap has settled.
pub async fn run_crawl(store: &mut Store, options: &CrawlOptions) -> Result<CrawlSummary, CrawlError> {
    Url::parse(&options.start_url).map_err(|source| CrawlError::InvalidStartUrl {
        url: options.start_url.clone(),
        source,
    })?;

    let client = wikigraph_scraper::build_client()?;
    let metrics = Metrics::new();
    let mut frontier = Frontier::new(options.queue_chunk_size, options.max_distance);

    match options.start_mode {
        StartMode::ColdStart => {
            info!("Starting from {}", options.start_url);
            frontier.seed(&options.start_url);
        }
        StartMode::Resume => {
            let loaded = frontier.refill(store)?;
            if loaded == 0 {
                info!("Nothing pending to resume, starting from {}", options.start_url);
                frontier.seed(&options.start_url);
            } else {
                info!("Resuming with {} pending pages", loaded);
            }
        }
    }

    let mut rounds: u64 = 0;
    let mut last_poll = Instant::now();

    loop {
        let batch = frontier.pop_admitted(options.parallel_scrapes, |item| {
            if item.distance >= options.max_distance {
                return Ok(true);
            }
            let handled = store.already_handled(&item.url)?;
            if handled {
                metrics.admission_hits.inc();
            } else {
                metrics.admission_misses.inc();
            }
            Ok(handled)
        })?;

        if !batch.is_empty() {
            rounds += 1;
            debug!("Round {}: scraping {} pages", rounds, batch.len());

            let outcome = scrape_batch(&client, batch).await;

            metrics.scrape_success.add(outcome.successes.len() as u64);
            metrics.scrape_failed.add(outcome.failures.len() as u64);
            let links: u64 = outcome.successes.iter().map(|p| p.links.len() as u64).sum();
            metrics.links_discovered.add(links);

            write_batch(store, &metrics, &outcome);
        }

        if last_poll.elapsed() >= STORE_POLL_INTERVAL {
            last_poll = Instant::now();
            log_progress(store, &metrics, frontier.len());
        }

        if frontier.is_empty() && frontier.refill(store)? == 0 {
            break;
        }
    }

    info!("Frontier exhausted, stopping");
    let totals = store.totals()?;
    Ok(CrawlSummary {
        rounds,
        metrics: metrics.snapshot(0),
        totals,
    })
}

fn log_progress(store: &Store, metrics: &Metrics, frontier_size: usize) {
    match store.totals() {
        Ok(totals) => {
            let snapshot = metrics.snapshot(frontier_size);
            info!(
                "Store: {} pages ({} completed, {} failed, {} pending), {} links; frontier {}, uptime {}s",
                totals.pages,
                totals.completed,
                totals.failed,
                totals.pending,
                totals.links,
                snapshot.frontier_size,
                snapshot.uptime_secs,
            );
        }
        Err(e) => warn!("Failed to poll store totals: {}", e),
    }
}
