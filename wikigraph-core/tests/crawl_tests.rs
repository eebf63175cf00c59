// End-to-end crawl loop tests against a mock wiki

use wikigraph_core::crawl::{reset_graph, run_crawl, CrawlOptions, StartMode};
use wikigraph_core::store::Store;
use wikigraph_scraper::{OutboundLink, PageScrape};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

async fn mount_article(server: &MockServer, page_path: &str, title: &str, links: &[&str]) {
    mount_article_with_head(server, page_path, title, links, "").await;
}

async fn mount_renamed_article(
    server: &MockServer,
    page_path: &str,
    canonical_path: &str,
    title: &str,
    links: &[&str],
) {
    let head = format!(
        r#"<link rel="canonical" href="{}{}"/>"#,
        server.uri(),
        canonical_path
    );
    mount_article_with_head(server, page_path, title, links, &head).await;
}

async fn mount_article_with_head(
    server: &MockServer,
    page_path: &str,
    title: &str,
    links: &[&str],
    head: &str,
) {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}" title="{}">x</a>"#, l, l))
        .collect();
    let html = format!(
        r#"<html><head>{}</head><body>
            <h1 id="firstHeading"><span class="mw-page-title-main">{}</span></h1>
            <div class="mw-content-ltr">{}</div>
        </body></html>"#,
        head, title, anchors
    );

    Mock::given(method("GET"))
        .and(path(page_path.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(html.into_bytes()),
        )
        .mount(server)
        .await;
}

async fn mount_broken_page(server: &MockServer, page_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(page_path.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn wiki_url(server: &MockServer, page_path: &str) -> String {
    format!("{}{}", server.uri(), page_path)
}

fn options_for(server: &MockServer, start_path: &str) -> CrawlOptions {
    CrawlOptions {
        start_url: wiki_url(server, start_path),
        queue_chunk_size: 100,
        ..CrawlOptions::default()
    }
}

// ============================================================================
// Cold Start Tests
// ============================================================================

#[tokio::test]
async fn test_crawl_walks_and_settles_the_graph() {
    let server = MockServer::start().await;
    mount_article(&server, "/wiki/A", "A", &["/wiki/B"]).await;
    mount_article(&server, "/wiki/B", "B", &[]).await;

    let mut store = Store::open_in_memory().unwrap();
    let summary = run_crawl(&mut store, &options_for(&server, "/wiki/A")).await.unwrap();

    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.totals.pages, 2);
    assert_eq!(summary.totals.links, 1);
    assert_eq!(summary.totals.completed, 2);
    assert_eq!(summary.totals.pending, 0);
    assert_eq!(summary.metrics.scrape_success, 2);
    assert_eq!(summary.metrics.links_discovered, 1);

    let seed = store.get_page(&wiki_url(&server, "/wiki/A")).unwrap().unwrap();
    assert_eq!(seed.title, "A");
    assert_eq!(seed.distance, 0);
    assert!(seed.completed_at.is_some());

    let target = store.get_page(&wiki_url(&server, "/wiki/B")).unwrap().unwrap();
    assert_eq!(target.distance, 1);
    assert!(target.completed_at.is_some());

    assert!(store
        .link_exists(&wiki_url(&server, "/wiki/A"), &wiki_url(&server, "/wiki/B"))
        .unwrap());
}

#[tokio::test]
async fn test_shortest_distance_wins_over_later_sightings() {
    let server = MockServer::start().await;
    mount_article(&server, "/wiki/A", "A", &["/wiki/B", "/wiki/C"]).await;
    mount_article(&server, "/wiki/B", "B", &["/wiki/C"]).await;
    mount_article(&server, "/wiki/C", "C", &[]).await;

    let mut store = Store::open_in_memory().unwrap();
    run_crawl(&mut store, &options_for(&server, "/wiki/A")).await.unwrap();

    // C is two hops away through B but one hop straight from A
    let page = store.get_page(&wiki_url(&server, "/wiki/C")).unwrap().unwrap();
    assert_eq!(page.distance, 1);
    assert!(page.completed_at.is_some());
}

#[tokio::test]
async fn test_small_queue_chunks_still_finish() {
    let server = MockServer::start().await;
    mount_article(&server, "/wiki/A", "A", &["/wiki/B"]).await;
    mount_article(&server, "/wiki/B", "B", &["/wiki/C"]).await;
    mount_article(&server, "/wiki/C", "C", &[]).await;

    let mut store = Store::open_in_memory().unwrap();
    let options = CrawlOptions {
        queue_chunk_size: 1,
        ..options_for(&server, "/wiki/A")
    };
    let summary = run_crawl(&mut store, &options).await.unwrap();

    assert_eq!(summary.rounds, 3);
    assert_eq!(summary.totals.completed, 3);
    assert_eq!(summary.totals.pending, 0);
}

// ============================================================================
// Rename Handling Tests
// ============================================================================

#[tokio::test]
async fn test_renamed_page_merges_into_canonical_node() {
    let server = MockServer::start().await;
    mount_article(&server, "/wiki/X", "X", &["/wiki/Old"]).await;
    mount_renamed_article(&server, "/wiki/Old", "/wiki/New", "New", &[]).await;

    let mut store = Store::open_in_memory().unwrap();
    let summary = run_crawl(&mut store, &options_for(&server, "/wiki/X")).await.unwrap();

    assert_eq!(summary.metrics.merged_pages, 1);
    assert!(store.get_page(&wiki_url(&server, "/wiki/Old")).unwrap().is_none());

    let canonical = store.get_page(&wiki_url(&server, "/wiki/New")).unwrap().unwrap();
    assert_eq!(canonical.title, "New");
    assert_eq!(canonical.distance, 1);
    assert!(canonical.completed_at.is_some());

    assert!(store
        .link_exists(&wiki_url(&server, "/wiki/X"), &wiki_url(&server, "/wiki/New"))
        .unwrap());
    assert!(!store
        .link_exists(&wiki_url(&server, "/wiki/X"), &wiki_url(&server, "/wiki/Old"))
        .unwrap());
}

// ============================================================================
// Failure Handling Tests
// ============================================================================

#[tokio::test]
async fn test_failed_pages_are_recorded_and_terminal() {
    let server = MockServer::start().await;
    mount_article(&server, "/wiki/X", "X", &["/wiki/Broken"]).await;
    mount_broken_page(&server, "/wiki/Broken", 500).await;

    let mut store = Store::open_in_memory().unwrap();
    let summary = run_crawl(&mut store, &options_for(&server, "/wiki/X")).await.unwrap();

    assert_eq!(summary.totals.failed, 1);
    assert_eq!(summary.metrics.scrape_failed, 1);

    let broken = store.get_page(&wiki_url(&server, "/wiki/Broken")).unwrap().unwrap();
    assert!(broken.has_error);
    assert!(broken.error_message.unwrap().contains("500"));

    // A resume run finds nothing to redo: the failed page stays settled
    let resume = CrawlOptions {
        start_mode: StartMode::Resume,
        ..options_for(&server, "/wiki/X")
    };
    let second = run_crawl(&mut store, &resume).await.unwrap();
    assert_eq!(second.rounds, 0);
    assert_eq!(second.metrics.admission_hits, 1);
}

// ============================================================================
// Distance Cap Tests
// ============================================================================

#[tokio::test]
async fn test_distance_cap_leaves_far_pages_pending() {
    let server = MockServer::start().await;
    mount_article(&server, "/wiki/A", "A", &["/wiki/B", "/wiki/C"]).await;
    mount_article(&server, "/wiki/B", "B", &[]).await;
    mount_article(&server, "/wiki/C", "C", &[]).await;

    let mut store = Store::open_in_memory().unwrap();
    let options = CrawlOptions {
        max_distance: 1,
        ..options_for(&server, "/wiki/A")
    };
    let summary = run_crawl(&mut store, &options).await.unwrap();

    // One round: the seed. Its targets sit at the cap and stay pending.
    assert_eq!(summary.rounds, 1);
    assert_eq!(summary.totals.completed, 1);
    assert_eq!(summary.totals.pending, 2);

    let capped = store.get_page(&wiki_url(&server, "/wiki/B")).unwrap().unwrap();
    assert!(capped.completed_at.is_none());
    assert!(!capped.has_error);
    assert!(capped.discovered_at.is_some());
}

// ============================================================================
// Resume Tests
// ============================================================================

#[tokio::test]
async fn test_resume_picks_up_pending_pages() {
    let server = MockServer::start().await;
    mount_article(&server, "/wiki/B", "B", &[]).await;

    // A finished in an earlier run and left B pending
    let mut store = Store::open_in_memory().unwrap();
    store
        .save_scrapes(&[PageScrape {
            requested_url: wiki_url(&server, "/wiki/A"),
            canonical_url: wiki_url(&server, "/wiki/A"),
            title: "A".to_string(),
            distance: 0,
            links: vec![OutboundLink {
                url: wiki_url(&server, "/wiki/B"),
                title: "B".to_string(),
            }],
        }])
        .unwrap();

    let options = CrawlOptions {
        start_mode: StartMode::Resume,
        ..options_for(&server, "/wiki/A")
    };
    let summary = run_crawl(&mut store, &options).await.unwrap();

    assert_eq!(summary.rounds, 1);
    assert_eq!(summary.totals.completed, 2);
    assert_eq!(summary.totals.pending, 0);
}

#[tokio::test]
async fn test_resume_on_empty_store_falls_back_to_seed() {
    let server = MockServer::start().await;
    mount_article(&server, "/wiki/A", "A", &[]).await;

    let mut store = Store::open_in_memory().unwrap();
    let options = CrawlOptions {
        start_mode: StartMode::Resume,
        ..options_for(&server, "/wiki/A")
    };
    let summary = run_crawl(&mut store, &options).await.unwrap();

    assert_eq!(summary.rounds, 1);
    assert_eq!(summary.totals.completed, 1);
}

// ============================================================================
// Reset Tests
// ============================================================================

#[tokio::test]
async fn test_reset_clears_the_way_for_a_fresh_crawl() {
    let server = MockServer::start().await;
    mount_article(&server, "/wiki/A", "A", &["/wiki/B"]).await;
    mount_article(&server, "/wiki/B", "B", &[]).await;

    let mut store = Store::open_in_memory().unwrap();
    run_crawl(&mut store, &options_for(&server, "/wiki/A")).await.unwrap();
    assert_eq!(store.totals().unwrap().pages, 2);

    reset_graph(&mut store).unwrap();
    assert_eq!(store.totals().unwrap().pages, 0);
    assert_eq!(store.totals().unwrap().links, 0);

    let summary = run_crawl(&mut store, &options_for(&server, "/wiki/A")).await.unwrap();
    assert_eq!(summary.totals.completed, 2);
}
