use wikigraph::commands::command_argument_builder;
use wikigraph::options::{crawl_options_from, database_path_from, startup_banner};
use wikigraph_core::crawl::{StartMode, DEFAULT_START_URL};

fn matches_for(args: &[&str]) -> clap::ArgMatches {
    command_argument_builder().get_matches_from(args)
}

#[test]
fn test_default_options() {
    let matches = matches_for(&["wikigraph"]);
    let options = crawl_options_from(&matches);

    assert_eq!(options.start_url, DEFAULT_START_URL);
    assert_eq!(options.max_distance, 999);
    assert_eq!(options.parallel_scrapes, 10);
    assert_eq!(options.queue_chunk_size, 10_000);
    assert_eq!(options.start_mode, StartMode::ColdStart);
}

#[test]
fn test_explicit_options() {
    let matches = matches_for(&[
        "wikigraph",
        "--url",
        "https://en.wikipedia.org/wiki/Rust",
        "--max-distance",
        "3",
        "--parallel-scrapes",
        "5",
        "--queue-chunk-size",
        "50",
    ]);
    let options = crawl_options_from(&matches);

    assert_eq!(options.start_url, "https://en.wikipedia.org/wiki/Rust");
    assert_eq!(options.max_distance, 3);
    assert_eq!(options.parallel_scrapes, 5);
    assert_eq!(options.queue_chunk_size, 50);
}

#[test]
fn test_short_flags() {
    let matches = matches_for(&[
        "wikigraph",
        "-u",
        "https://en.wikipedia.org/wiki/Paris",
        "-d",
        "2",
        "-s",
        "4",
        "-q",
        "100",
    ]);
    let options = crawl_options_from(&matches);

    assert_eq!(options.start_url, "https://en.wikipedia.org/wiki/Paris");
    assert_eq!(options.max_distance, 2);
    assert_eq!(options.parallel_scrapes, 4);
    assert_eq!(options.queue_chunk_size, 100);
}

#[test]
fn test_resume_flag_switches_start_mode() {
    let matches = matches_for(&["wikigraph", "--resume"]);
    let options = crawl_options_from(&matches);

    assert_eq!(options.start_mode, StartMode::Resume);
}

#[test]
fn test_flags_default_off() {
    let matches = matches_for(&["wikigraph"]);

    assert!(!matches.get_flag("resume"));
    assert!(!matches.get_flag("reset"));
    assert!(!matches.get_flag("reset-and-stop"));
    assert!(!matches.get_flag("debug"));
}

#[test]
fn test_reset_conflicts_with_resume() {
    let result =
        command_argument_builder().try_get_matches_from(["wikigraph", "--reset", "--resume"]);

    assert!(result.is_err());
}

#[test]
fn test_reset_and_stop_conflicts_with_resume() {
    let result = command_argument_builder()
        .try_get_matches_from(["wikigraph", "--reset-and-stop", "--resume"]);

    assert!(result.is_err());
}

#[test]
fn test_database_path_expands_tilde() {
    let matches = matches_for(&["wikigraph", "--database", "~/graphs/wiki.db"]);
    let path = database_path_from(&matches);

    assert!(!path.to_string_lossy().starts_with('~'));
    assert!(path.to_string_lossy().ends_with("graphs/wiki.db"));
}

#[test]
fn test_database_plain_path_untouched() {
    let matches = matches_for(&["wikigraph", "--database", "/tmp/graphs/wiki.db"]);
    let path = database_path_from(&matches);

    assert_eq!(path.to_string_lossy(), "/tmp/graphs/wiki.db");
}

#[test]
fn test_startup_banner_reports_settings() {
    let matches = matches_for(&[
        "wikigraph",
        "--url",
        "https://en.wikipedia.org/wiki/Rust",
        "--max-distance",
        "7",
        "--database",
        "/tmp/wiki.db",
        "--resume",
    ]);
    let banner = startup_banner(&matches);

    assert!(banner.contains("Initialization"));
    assert!(banner.contains("https://en.wikipedia.org/wiki/Rust"));
    assert!(banner.contains("Max distance:      7"));
    assert!(banner.contains("/tmp/wiki.db"));
    assert!(banner.contains("Resume:            true"));
    assert!(banner.contains("Debug:             false"));
}
