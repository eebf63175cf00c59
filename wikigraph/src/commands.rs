use clap::arg;
use url::Url;
use wikigraph_core::crawl::DEFAULT_START_URL;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("wikigraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wikigraph")
        .styles(CLAP_STYLING)
        .about("Incremental, resumable Wikipedia link-graph scraper")
        .arg(
            arg!(-u --"url" <URL>)
                .required(false)
                .help("The page to start crawling from")
                .value_parser(clap::value_parser!(Url))
                .default_value(DEFAULT_START_URL),
        )
        .arg(
            arg!(-d --"max-distance" <HOPS>)
                .required(false)
                .help("Only fetch pages up to this many hops from the start page")
                .value_parser(clap::value_parser!(u32))
                .default_value("999"),
        )
        .arg(
            arg!(-s --"parallel-scrapes" <NUM>)
                .required(false)
                .help("How many pages to fetch concurrently per round")
                .value_parser(clap::value_parser!(usize))
                .default_value("10"),
        )
        .arg(
            arg!(-q --"queue-chunk-size" <SIZE>)
                .required(false)
                .help("How many pending pages to reload from the store at a time")
                .value_parser(clap::value_parser!(u32))
                .default_value("10000"),
        )
        .arg(
            arg!(--"database" <PATH>)
                .required(false)
                .help("Location of the SQLite store")
                .default_value("~/.local/share/wikigraph/wikigraph.db"),
        )
        .arg(
            arg!(--"resume")
                .required(false)
                .help("Reload pending pages from the store instead of starting over")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-r --"reset")
                .required(false)
                .help("Wipe all pages and links before crawling")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("resume"),
        )
        .arg(
            arg!(--"reset-and-stop")
                .required(false)
                .help("Wipe all pages and links, then exit without crawling")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("resume"),
        )
        .arg(
            arg!(--"debug")
                .required(false)
                .help("Verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
}
