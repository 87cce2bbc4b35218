//! Steam store search scraper.
//!
//! Searches the store for a title and reads the release date shown on the
//! first result row.
//!
//! # URL Pattern
//!
//! `https://store.steampowered.com/search/?term=Hollow+Knight+Silksong`
//!
//! The release date lives in the `div.search_released` element of each result
//! row; only the first one on the page is used.

use crate::scrapers::ReleaseDateSource;
use crate::utils::truncate_for_log;
use reqwest::Client;
use scraper::{Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Default search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://store.steampowered.com/search/";

/// Release-date source backed by the Steam store search page.
#[derive(Debug, Clone)]
pub struct SteamSearch {
    client: Client,
    search_url: Url,
}

impl SteamSearch {
    /// Build a searcher with a fixed per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `search_url` does not parse or the HTTP client
    /// cannot be constructed.
    pub fn new(search_url: &str, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let search_url = Url::parse(search_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, search_url })
    }

    /// Search URL for a title. Spaces are form-encoded as `+`.
    pub fn search_url_for(&self, title: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair("term", title);
        url
    }
}

impl ReleaseDateSource for SteamSearch {
    #[instrument(level = "info", skip(self))]
    async fn fetch_release_text(&self, title: &str) -> Result<Option<String>, Box<dyn Error>> {
        let url = self.search_url_for(title);
        debug!(%url, "Searching store");

        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let raw = extract_release_text(&html);
        match &raw {
            Some(text) => info!(%title, scraped = %truncate_for_log(text, 80), "Scraped release date"),
            None => info!(%title, "No search result with a release date"),
        }
        Ok(raw)
    }
}

/// Pull the trimmed release-date text out of the first search result.
pub fn extract_release_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let released_selector = Selector::parse("div.search_released").ok()?;
    document
        .select(&released_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}
