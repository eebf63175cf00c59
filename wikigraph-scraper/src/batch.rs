use crate::result::{PageScrape, ScrapeFailure, WorkItem};
use crate::scrape::scrape;
use futures::future::join_all;
use reqwest::Client;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::warn;

/// Settled results of one concurrent batch, already deduplicated.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub successes: Vec<PageScrape>,
    pub failures: Vec<ScrapeFailure>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.failures.is_empty()
    }
}

/// Scrape every item concurrently and wait for the whole batch to settle.
///
/// A failed fetch never aborts its siblings; it is collected alongside the
/// successes. Successes are deduplicated by canonical URL (two aliases of a
/// renamed page can land in one batch), failures by requested URL. First
/// occurrence wins.
pub async fn scrape_batch(client: &Client, items: Vec<WorkItem>) -> BatchOutcome {
    let scrapes: Vec<_> = items.iter().map(|item| scrape(client, item)).collect();
    let settled = join_all(scrapes).await;

    let mut outcome = BatchOutcome::default();
    for (item, result) in items.into_iter().zip(settled) {
        match result {
            Ok(page) => outcome.successes.push(page),
            Err(error) => {
                warn!("Scrape failed for {}: {}", item.url, error);
                outcome.failures.push(ScrapeFailure { item, error });
            }
        }
    }

    outcome.successes = dedup_by_key(outcome.successes, |page| page.canonical_url.clone());
    outcome.failures = dedup_by_key(outcome.failures, |failure| failure.item.url.clone());
    outcome
}

fn dedup_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}
