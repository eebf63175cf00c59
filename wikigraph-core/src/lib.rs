pub mod crawl;
pub mod frontier;
pub mod metrics;
pub mod store;
pub mod writer;

pub use crawl::{
    run_crawl, reset_graph, CrawlError, CrawlOptions, CrawlSummary, StartMode,
    DEFAULT_MAX_DISTANCE, DEFAULT_PARALLEL_SCRAPES, DEFAULT_QUEUE_CHUNK_SIZE, DEFAULT_START_URL,
};
pub use frontier::Frontier;
pub use metrics::{Metrics, MetricsSnapshot};
pub use store::{PageRow, Store, StoreTotals};
pub use writer::write_batch;
