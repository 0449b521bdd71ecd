//! Fetching a page and reducing it to readable plain text, one block per line.

use reqwest::{Client, ClientBuilder};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use once_cell::sync::Lazy;
use crate::error::{AppError, Result};

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .user_agent(concat!("recipe-planner/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client")
});

// Content roots, most specific first.
static ROOT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", "body"]
        .iter()
        .map(|tag| Selector::parse(tag).expect("Failed to parse root selector"))
        .collect()
});

static BLOCK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(&BLOCK_TAGS.join(", ")).expect("Failed to parse block selector")
});

const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "dt", "dd", "td", "th", "pre", "blockquote",
    "figcaption",
];

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "nav", "aside", "footer", "form", "template"];

pub async fn fetch_html(url: &str) -> Result<String> {
    let response = CLIENT.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;
    Ok(html)
}

/// Fetches `url` within `timeout`. Any failure is reported the same way.
pub async fn fetch_page(url: &str, timeout: Duration) -> Result<String> {
    let fetch_start = std::time::Instant::now();
    match tokio::time::timeout(timeout, fetch_html(url)).await {
        Ok(Ok(html)) => {
            tracing::debug!(url, elapsed = ?fetch_start.elapsed(), bytes = html.len(), "fetched page");
            Ok(html)
        }
        Ok(Err(err)) => {
            tracing::warn!(url, error = %err, "page fetch failed");
            Err(AppError::Extraction("Unable to retrieve the requested URL".to_string()))
        }
        Err(_) => {
            tracing::warn!(url, ?timeout, "page fetch timed out");
            Err(AppError::Extraction("Unable to retrieve the requested URL".to_string()))
        }
    }
}

/// Readable text of the page's main content, or `None` when nothing is left.
pub fn extract_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let root = ROOT_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())?;

    let mut blocks = Vec::new();
    for block in root.select(&BLOCK_SELECTOR) {
        if is_nested_or_hidden(&block, &root) {
            continue;
        }
        let text = block.text().collect::<String>();
        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            blocks.push(line);
        }
    }

    let text = if blocks.is_empty() {
        format_text(&visible_text(&root))
    } else {
        blocks.join("\n")
    };

    if text.is_empty() { None } else { Some(text) }
}

/// Only ancestors below `root` count; layout wrappers above it are ignored.
fn is_nested_or_hidden(block: &ElementRef, root: &ElementRef) -> bool {
    block
        .ancestors()
        .take_while(|node| node.id() != root.id())
        .filter_map(|node| node.value().as_element())
        .any(|element| BLOCK_TAGS.contains(&element.name()) || SKIPPED_TAGS.contains(&element.name()))
}

/// Text of `root` without scripts, styles and page chrome.
fn visible_text(root: &ElementRef) -> String {
    root.descendants()
        .filter(|node| {
            !node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != root.id())
                .filter_map(|ancestor| ancestor.value().as_element())
                .any(|element| SKIPPED_TAGS.contains(&element.name()))
        })
        .filter_map(|node| node.value().as_text().map(|text| str::to_string(text)))
        .collect()
}

/// Trims every line and drops the blank ones.
pub fn format_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_was_whitespace = true;

    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            if !last_was_whitespace {
                result.push('\n');
            }
            result.push_str(trimmed);
            last_was_whitespace = false;
        }
    }

    result
}
