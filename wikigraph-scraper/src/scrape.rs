use crate::error::{Result, ScrapeError};
use crate::result::{OutboundLink, PageScrape, WorkItem};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = "wikigraph/0.2 (https://github.com/wikigraph/wikigraph)";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Build the HTTP client shared by every scrape in the process.
pub fn build_client() -> Result<Client> {
    build_client_with_timeout(DEFAULT_TIMEOUT_SECS)
}

pub fn build_client_with_timeout(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
        .pool_max_idle_per_host(50) // Connection pooling
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

/// Fetch one page and extract its title, canonical URL and outbound
/// article links.
///
/// The returned scrape keeps the item's distance: link targets are one hop
/// further and the store layer accounts for that when it persists them.
pub async fn scrape(client: &Client, item: &WorkItem) -> Result<PageScrape> {
    debug!("Fetching {}", item.url);

    let response = client.get(&item.url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::HttpStatus(status));
    }
    let body = response.text().await?;

    let page_url = Url::parse(&item.url)
        .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", item.url, e)))?;

    let (title, canonical_url, links) = extract_page(&body, &page_url, &item.url);

    Ok(PageScrape {
        requested_url: item.url.clone(),
        canonical_url,
        title,
        distance: item.distance,
        links,
    })
}

fn extract_page(html: &str, page_url: &Url, requested_url: &str) -> (String, String, Vec<OutboundLink>) {
    let document = Html::parse_document(html);

    let title = find_title(&document).unwrap_or_else(|| {
        warn!("Unable to find title for {}", requested_url);
        String::new()
    });

    let canonical_url = find_canonical_url(&document, page_url, requested_url);
    let links = extract_article_links(&document, page_url);

    (title, canonical_url, links)
}

/// Page titles moved between skins over the years, so try the modern
/// `.mw-page-title-main` span first and fall back to `#firstHeading`.
fn find_title(document: &Html) -> Option<String> {
    let main_title = Selector::parse(".mw-page-title-main").unwrap();
    let heading = Selector::parse("#firstHeading").unwrap();
    let heading_span = Selector::parse("#firstHeading span").unwrap();
    let span = Selector::parse("span").unwrap();

    if let Some(element) = document.select(&main_title).next() {
        let text = element_text(&element);
        if !text.is_empty() {
            return Some(text);
        }
    }

    // Headings without an inner span hold the title as bare text
    if let Some(element) = document.select(&heading).next()
        && element.select(&span).next().is_none()
    {
        return Some(element_text(&element));
    }

    if let Some(element) = document.select(&heading_span).next() {
        let text = element_text(&element);
        if !text.is_empty() {
            return Some(text);
        }
    }

    None
}

/// The wiki reports renames and redirects through `link[rel=canonical]`;
/// absent that, the page is canonical under the URL we asked for.
fn find_canonical_url(document: &Html, page_url: &Url, requested_url: &str) -> String {
    let canonical = Selector::parse("link[rel=canonical]").unwrap();

    document
        .select(&canonical)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href).ok())
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|| requested_url.to_string())
}

/// Collect `/wiki/` anchors from the article body, skipping API and
/// namespaced pages (Category:, Help:, File: and friends), resolving each
/// href against the page and dropping fragments and duplicates.
fn extract_article_links(document: &Html, page_url: &Url) -> Vec<OutboundLink> {
    let content = Selector::parse(".mw-content-ltr").unwrap();
    let anchor = Selector::parse("a[href]").unwrap();

    let Some(body) = document.select(&content).next() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in body.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.starts_with("/wiki/") || href.contains("/API_") || href.contains(':') {
            continue;
        }
        let Ok(mut target) = page_url.join(href) else {
            continue;
        };
        target.set_fragment(None);
        let target = target.to_string();

        if seen.insert(target.clone()) {
            links.push(OutboundLink {
                url: target,
                title: element.value().attr("title").unwrap_or_default().to_string(),
            });
        }
    }

    links
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
