use super::types::{Architecture, ListingEntry, MatchPolicy};
use crate::utils::tokens_match;
use itertools::Itertools;
use reqwest::{Client, Response};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("Failed to fetch listing from {url}: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },
}

pub async fn fetch_listing(
    client: &Client,
    index_url: &Url,
) -> Result<Vec<ListingEntry>, ListingError> {
    tracing::info!("Fetching package listing from {}", index_url);

    let network_error = |source| ListingError::Network {
        url: index_url.to_string(),
        source,
    };

    let body = client
        .get(index_url.clone())
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(network_error)?
        .text()
        .await
        .map_err(network_error)?;

    let entries = extract_links(&body);
    tracing::debug!(url = %index_url, entries = entries.len(), "Parsed package listing");
    Ok(entries)
}

/// Collects every `<a href>` target of the page in document order.
///
/// Non-ASCII characters are dropped before parsing. Duplicates are kept.
pub fn extract_links(body: &str) -> Vec<ListingEntry> {
    let ascii_body: String = body.chars().filter(char::is_ascii).collect();
    let document = Html::parse_document(&ascii_body);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(ListingEntry::new)
        .collect()
}

pub fn select_candidates(
    entries: &[ListingEntry],
    architecture: Architecture,
    version: &str,
    policy: MatchPolicy,
) -> Vec<ListingEntry> {
    let mut candidates = Vec::new();

    for entry in entries {
        if policy == MatchPolicy::StopAtFirstMiss && !entry.href.contains(version) {
            tracing::debug!(href = %entry.href, "Version token missing, stopping scan");
            break;
        }

        if !tokens_match(&entry.href, architecture.as_str(), version) {
            continue;
        }

        // Links to directories carry no file to download.
        if entry.file_name().is_empty() {
            tracing::debug!(href = %entry.href, "Skipping matching link without a file name");
            continue;
        }

        candidates.push(entry.clone());
    }

    tracing::debug!(
        candidates = %candidates.iter().map(ListingEntry::file_name).join(", "),
        "Selected listing candidates"
    );
    candidates
}
