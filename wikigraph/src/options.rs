use clap::ArgMatches;
use std::path::PathBuf;
use url::Url;
use wikigraph_core::crawl::{CrawlOptions, StartMode};

/// Assemble crawl options from parsed command line arguments.
pub fn crawl_options_from(matches: &ArgMatches) -> CrawlOptions {
    let start_mode = if matches.get_flag("resume") {
        StartMode::Resume
    } else {
        StartMode::ColdStart
    };

    CrawlOptions {
        start_url: matches
            .get_one::<Url>("url")
            .unwrap()
            .as_str()
            .to_string(),
        max_distance: *matches.get_one::<u32>("max-distance").unwrap(),
        parallel_scrapes: *matches.get_one::<usize>("parallel-scrapes").unwrap(),
        queue_chunk_size: *matches.get_one::<u32>("queue-chunk-size").unwrap(),
        start_mode,
    }
}

/// Resolve the store location, expanding a leading tilde.
pub fn database_path_from(matches: &ArgMatches) -> PathBuf {
    let raw = matches.get_one::<String>("database").unwrap();
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Render the settings block printed once at startup.
pub fn startup_banner(matches: &ArgMatches) -> String {
    let options = crawl_options_from(matches);
    let mut banner = String::new();
    banner.push_str("------------------------------ Initialization ------------------------------\n");
    banner.push_str(&format!("  Start URL:         {}\n", options.start_url));
    banner.push_str(&format!("  Max distance:      {}\n", options.max_distance));
    banner.push_str(&format!("  Parallel scrapes:  {}\n", options.parallel_scrapes));
    banner.push_str(&format!("  Queue chunk size:  {}\n", options.queue_chunk_size));
    banner.push_str(&format!(
        "  Database:          {}\n",
        database_path_from(matches).display()
    ));
    banner.push_str(&format!(
        "  Resume:            {}\n",
        matches.get_flag("resume")
    ));
    banner.push_str(&format!(
        "  Reset:             {} (and stop: {})\n",
        matches.get_flag("reset"),
        matches.get_flag("reset-and-stop")
    ));
    banner.push_str(&format!(
        "  Debug:             {}\n",
        matches.get_flag("debug")
    ));
    banner.push_str("-----------------------------------------------------------------------------");
    banner
}
