use crate::metrics::Metrics;
use crate::store::Store;
use rusqlite::Result;
use tracing::{debug, error, info};
use wikigraph_scraper::{BatchOutcome, PageScrape};

/// Persist one settled batch.
///
/// Renamed pages are folded into their canonical node first so the
/// completion upserts land on the right row. Store errors are logged and
/// absorbed: the affected pages keep their pending state and a later
/// refill hands them out again.
pub fn write_batch(store: &mut Store, metrics: &Metrics, outcome: &BatchOutcome) {
    if let Err(e) = save_successes(store, metrics, &outcome.successes) {
        error!("Error while saving pages and links: {}", e);
    }

    if !outcome.failures.is_empty() {
        for failure in &outcome.failures {
            error!("{} - {}", failure.item.url, failure.error);
        }
        if let Err(e) = store.save_failures(&outcome.failures) {
            error!("Error while saving scrape failures: {}", e);
        }
    }
}

fn save_successes(store: &mut Store, metrics: &Metrics, successes: &[PageScrape]) -> Result<()> {
    if successes.is_empty() {
        return Ok(());
    }

    let renamed: Vec<&PageScrape> = successes.iter().filter(|page| page.is_renamed()).collect();
    if !renamed.is_empty() {
        for page in &renamed {
            info!("Merging {} into {}", page.requested_url, page.canonical_url);
        }
        store.merge_renamed_pages(&renamed)?;
        metrics.merged_pages.add(renamed.len() as u64);
    }

    store.save_scrapes(successes)?;
    for page in successes {
        debug!(
            "Saved '{}' (distance {}) with {} outgoing links",
            page.canonical_url,
            page.distance,
            page.links.len()
        );
    }
    Ok(())
}
