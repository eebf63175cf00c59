use anyhow::Context;
use clap::ArgMatches;
use std::fs;
use tracing::{error, info};
use wikigraph::commands::command_argument_builder;
use wikigraph::options::{crawl_options_from, database_path_from, startup_banner};
use wikigraph_core::crawl::{reset_graph, run_crawl};
use wikigraph_core::store::Store;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();

    init_tracing(matches.get_flag("debug"));
    println!("{}", startup_banner(&matches));

    if let Err(e) = run(&matches).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let db_path = database_path_from(matches);
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut store = Store::open(&db_path)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))?;

    let reset_and_stop = matches.get_flag("reset-and-stop");
    if matches.get_flag("reset") || reset_and_stop {
        reset_graph(&mut store)?;
        if reset_and_stop {
            info!("Store reset, exiting");
            return Ok(());
        }
    }

    let options = crawl_options_from(matches);
    let summary = run_crawl(&mut store, &options).await?;
    info!("Crawl finished: {}", serde_json::to_string(&summary)?);
    Ok(())
}
