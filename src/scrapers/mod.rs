//! Release-date sources.
//!
//! The updater does not care where raw release-date text comes from; it only
//! needs something implementing [`ReleaseDateSource`]. The production source
//! is the Steam store search page ([`steam`]); tests plug in fakes.
//!
//! # Contract
//!
//! - `Ok(Some(text))`: a release-date display was found (text may be empty)
//! - `Ok(None)`: the page had no matching result
//! - `Err(_)`: network or HTTP failure
//!
//! The updater treats the last two the same way: as empty input.

use std::error::Error;

pub mod steam;

/// Something that can look up the raw release-date text for a title.
pub trait ReleaseDateSource {
    /// Fetch the release-date display text for `title`.
    async fn fetch_release_text(&self, title: &str) -> Result<Option<String>, Box<dyn Error>>;
}
