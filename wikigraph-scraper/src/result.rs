use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};

/// A frontier entry: a page URL awaiting a scrape attempt, tagged with its
/// hop distance from the start page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub url: String,
    pub distance: u32,
}

impl WorkItem {
    pub fn new(url: impl Into<String>, distance: u32) -> Self {
        Self {
            url: url.into(),
            distance,
        }
    }
}

/// An anchor found in the page body, already filtered down to plain
/// article links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundLink {
    pub url: String,
    pub title: String,
}

/// Everything extracted from one successfully fetched page.
///
/// `canonical_url` differs from `requested_url` when the wiki redirected or
/// renamed the page; `distance` is the hop count of the fetched page itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageScrape {
    pub requested_url: String,
    pub canonical_url: String,
    pub title: String,
    pub distance: u32,
    pub links: Vec<OutboundLink>,
}

impl PageScrape {
    pub fn is_renamed(&self) -> bool {
        self.canonical_url != self.requested_url
    }
}

/// A scrape attempt that failed, still carrying the item that caused it so
/// the failure can be recorded against the page.
#[derive(Debug)]
pub struct ScrapeFailure {
    pub item: WorkItem,
    pub error: ScrapeError,
}
