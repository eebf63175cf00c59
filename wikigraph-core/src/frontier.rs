use crate::store::Store;
use rusqlite::Result;
use std::collections::VecDeque;
use tracing::debug;
use wikigraph_scraper::WorkItem;

/// In-memory view of the crawl queue.
///
/// The store holds the durable queue (pending pages); the frontier caches a
/// chunk of it so each round does not go back to SQLite per item. Items can
/// go stale while cached, so every pop is re-checked through the admission
/// filter.
pub struct Frontier {
    queue: VecDeque<WorkItem>,
    chunk_size: u32,
    max_distance: u32,
}

impl Frontier {
    pub fn new(chunk_size: u32, max_distance: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            chunk_size,
            max_distance,
        }
    }

    /// Queue the start page at distance zero.
    pub fn seed(&mut self, url: &str) {
        self.queue.push_back(WorkItem::new(url, 0));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pop up to `batch_size` items the filter admits. The filter returns
    /// true for items that must be skipped; skipped items are dropped, not
    /// requeued.
    pub fn pop_admitted<F>(&mut self, batch_size: usize, mut already_handled: F) -> Result<Vec<WorkItem>>
    where
        F: FnMut(&WorkItem) -> Result<bool>,
    {
        let mut admitted = Vec::new();
        while admitted.len() < batch_size {
            let Some(item) = self.queue.pop_front() else {
                break;
            };
            if already_handled(&item)? {
                debug!("Skipping {}", item.url);
                continue;
            }
            admitted.push(item);
        }
        Ok(admitted)
    }

    /// Pull the next chunk of pending pages out of the store. Returns how
    /// many items arrived; zero means the crawl has nothing left to do.
    pub fn refill(&mut self, store: &Store) -> Result<usize> {
        let items = store.load_frontier_chunk(self.chunk_size, self.max_distance)?;
        let loaded = items.len();
        if loaded > 0 {
            debug!("Loaded frontier chunk of {} pages", loaded);
        }
        self.queue.extend(items);
        Ok(loaded)
    }
}
