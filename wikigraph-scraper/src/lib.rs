pub mod batch;
pub mod error;
pub mod result;
pub mod scrape;

pub use batch::{scrape_batch, BatchOutcome};
pub use error::ScrapeError;
pub use result::{OutboundLink, PageScrape, ScrapeFailure, WorkItem};
pub use scrape::{build_client, scrape};
