// Include CLI modules directly from their source files
#[path = "commands.rs"]
pub mod commands;

#[path = "options.rs"]
pub mod options;

// Re-export commonly used helpers for convenience
pub use commands::command_argument_builder;
pub use options::{crawl_options_from, database_path_from, startup_banner};

// Re-export crawl functionality from wikigraph-core
pub use wikigraph_core::crawl::{
    reset_graph, run_crawl, CrawlError, CrawlOptions, CrawlSummary, StartMode,
};
pub use wikigraph_core::store::Store;
