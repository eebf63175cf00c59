use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wikigraph_scraper::{PageScrape, ScrapeFailure, WorkItem};

/// Graph store over SQLite. Pages are nodes, links are edges, and the
/// pending rows double as the durable crawl queue.
pub struct Store {
    conn: Connection,
}

/// One row of the pages table.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRow {
    pub url: String,
    pub title: String,
    pub distance: u32,
    pub discovered_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub has_error: bool,
    pub error_message: Option<String>,
    pub errored_at: Option<i64>,
}

/// Whole-graph counts polled for progress logging and the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTotals {
    pub pages: i64,
    pub links: i64,
    pub completed: i64,
    pub failed: i64,
    pub pending: i64,
}

fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Optimize for write-heavy batches
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;  -- 64MB cache
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            -- Pages in the graph, keyed by URL. A row is pending until a
            -- scrape attempt settles it: completed_at for a success,
            -- has_error for a failure.
            CREATE TABLE IF NOT EXISTS pages (
                url TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                distance INTEGER NOT NULL DEFAULT 0,
                discovered_at INTEGER,
                completed_at INTEGER,
                has_error INTEGER NOT NULL DEFAULT 0,
                error_message TEXT,
                errored_at INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_pages_pending ON pages(has_error, completed_at, distance);

            -- Links between pages, at most one per ordered pair
            CREATE TABLE IF NOT EXISTS links (
                from_url TEXT NOT NULL,
                to_url TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (from_url, to_url),
                FOREIGN KEY (from_url) REFERENCES pages(url) ON DELETE CASCADE,
                FOREIGN KEY (to_url) REFERENCES pages(url) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_links_to ON links(to_url);
            ",
        )?;
        Ok(())
    }

    // Admission

    /// True when the page already settled in this or an earlier run, which
    /// means it must not be fetched again.
    pub fn already_handled(&self, url: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT 1 FROM pages
             WHERE url = ?1 AND (completed_at IS NOT NULL OR has_error = 1)",
        )?;

        let hit: Option<i64> = stmt.query_row(params![url], |row| row.get(0)).optional()?;
        Ok(hit.is_some())
    }

    // Frontier queue

    /// Load the next chunk of pending pages, nearest first.
    ///
    /// A page is pending while it has neither settled nor produced outgoing
    /// links. Pages at or beyond `max_distance` stay in the store but are
    /// never handed out, otherwise a capped crawl could reload them forever.
    pub fn load_frontier_chunk(&self, chunk_size: u32, max_distance: u32) -> Result<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, distance FROM pages
             WHERE has_error = 0
               AND completed_at IS NULL
               AND distance < ?2
               AND NOT EXISTS (SELECT 1 FROM links WHERE links.from_url = pages.url)
             ORDER BY distance ASC
             LIMIT ?1",
        )?;

        let items = stmt
            .query_map(params![chunk_size, max_distance], |row| {
                Ok(WorkItem {
                    url: row.get(0)?,
                    distance: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(items)
    }

    // Batch writes

    /// Fold pages the wiki renamed into their canonical node.
    ///
    /// Upserts the canonical page, re-points every edge touching the
    /// requested URL, then drops the requested node. Re-pointing an edge
    /// that already exists on the canonical side just deletes the
    /// duplicate, so running this twice settles on the same graph.
    pub fn merge_renamed_pages(&mut self, pages: &[&PageScrape]) -> Result<()> {
        if pages.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        {
            let mut upsert = tx.prepare(
                "INSERT INTO pages (url, title, distance)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(url) DO UPDATE SET
                     title = excluded.title,
                     distance = MIN(pages.distance, excluded.distance)",
            )?;
            let mut repoint_incoming =
                tx.prepare("UPDATE OR IGNORE links SET to_url = ?2 WHERE to_url = ?1")?;
            let mut repoint_outgoing =
                tx.prepare("UPDATE OR IGNORE links SET from_url = ?2 WHERE from_url = ?1")?;
            // Cascades to edges the re-point left behind as duplicates
            let mut drop_requested = tx.prepare("DELETE FROM pages WHERE url = ?1")?;

            for page in pages {
                upsert.execute(params![page.canonical_url, page.title, page.distance])?;
                repoint_incoming.execute(params![page.requested_url, page.canonical_url])?;
                repoint_outgoing.execute(params![page.requested_url, page.canonical_url])?;
                drop_requested.execute(params![page.requested_url])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Persist one batch of successful scrapes: complete each fetched page
    /// under its canonical URL, upsert every link target one hop further
    /// out, and record the edges.
    ///
    /// Targets keep the smallest distance any scrape has claimed for them,
    /// and their first discovery time sticks. Settled flags of targets are
    /// never touched here since they are only discovered, not fetched.
    pub fn save_scrapes(&mut self, pages: &[PageScrape]) -> Result<()> {
        if pages.is_empty() {
            return Ok(());
        }
        let now = current_timestamp();

        let tx = self.conn.transaction()?;
        {
            let mut complete = tx.prepare(
                "INSERT INTO pages (url, title, distance, completed_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(url) DO UPDATE SET
                     title = excluded.title,
                     distance = MIN(pages.distance, excluded.distance),
                     completed_at = excluded.completed_at",
            )?;
            let mut discover = tx.prepare(
                "INSERT INTO pages (url, title, distance, discovered_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(url) DO UPDATE SET
                     title = excluded.title,
                     distance = MIN(pages.distance, excluded.distance),
                     discovered_at = COALESCE(pages.discovered_at, excluded.discovered_at)",
            )?;
            let mut link = tx.prepare(
                "INSERT OR IGNORE INTO links (from_url, to_url, created_at) VALUES (?1, ?2, ?3)",
            )?;

            for page in pages {
                complete.execute(params![page.canonical_url, page.title, page.distance, now])?;
                for target in &page.links {
                    discover.execute(params![target.url, target.title, page.distance + 1, now])?;
                    link.execute(params![page.canonical_url, target.url, now])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Record failed scrape attempts on their page rows, creating the row
    /// when the page was never discovered (a seed that failed on first
    /// fetch, say). Failed pages are terminal for admission and refill.
    pub fn save_failures(&mut self, failures: &[ScrapeFailure]) -> Result<()> {
        if failures.is_empty() {
            return Ok(());
        }
        let now = current_timestamp();

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO pages (url, distance, has_error, error_message, errored_at)
                 VALUES (?1, ?2, 1, ?3, ?4)
                 ON CONFLICT(url) DO UPDATE SET
                     has_error = 1,
                     error_message = excluded.error_message,
                     errored_at = excluded.errored_at",
            )?;

            for failure in failures {
                stmt.execute(params![
                    failure.item.url,
                    failure.item.distance,
                    failure.error.to_string(),
                    now,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // Maintenance

    /// Delete every link and page. Returns (pages deleted, links deleted).
    pub fn reset(&mut self) -> Result<(usize, usize)> {
        let tx = self.conn.transaction()?;
        let links = tx.execute("DELETE FROM links", [])?;
        let pages = tx.execute("DELETE FROM pages", [])?;
        tx.commit()?;
        Ok((pages, links))
    }

    // Queries

    pub fn get_page(&self, url: &str) -> Result<Option<PageRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, title, distance, discovered_at, completed_at,
                    has_error, error_message, errored_at
             FROM pages WHERE url = ?1",
        )?;

        let row = stmt
            .query_row(params![url], |row| {
                Ok(PageRow {
                    url: row.get(0)?,
                    title: row.get(1)?,
                    distance: row.get(2)?,
                    discovered_at: row.get(3)?,
                    completed_at: row.get(4)?,
                    has_error: row.get(5)?,
                    error_message: row.get(6)?,
                    errored_at: row.get(7)?,
                })
            })
            .optional()?;

        Ok(row)
    }

    pub fn link_exists(&self, from_url: &str, to_url: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM links WHERE from_url = ?1 AND to_url = ?2")?;

        let hit: Option<i64> = stmt
            .query_row(params![from_url, to_url], |row| row.get(0))
            .optional()?;
        Ok(hit.is_some())
    }

    pub fn totals(&self) -> Result<StoreTotals> {
        Ok(StoreTotals {
            pages: self.count("SELECT COUNT(*) FROM pages")?,
            links: self.count("SELECT COUNT(*) FROM links")?,
            completed: self.count("SELECT COUNT(*) FROM pages WHERE completed_at IS NOT NULL")?,
            failed: self.count("SELECT COUNT(*) FROM pages WHERE has_error = 1")?,
            pending: self
                .count("SELECT COUNT(*) FROM pages WHERE completed_at IS NULL AND has_error = 0")?,
        })
    }

    fn count(&self, sql: &str) -> Result<i64> {
        self.conn.query_row(sql, [], |row| row.get(0))
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}
