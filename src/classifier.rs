//! Release-date text classification.
//!
//! Storefront pages show release dates as free-form text: `"5 Feb, 2026"`,
//! `"2026"`, `"Q3 2025"`, `"Coming soon"`, or whatever the publisher typed.
//! [`classify`] folds any such fragment into a [`DateRecord`] by trying a fixed
//! cascade of patterns, first match wins:
//!
//! | Rule | Matches | Output |
//! |------|---------|--------|
//! | 1 | `<day> <Mon>[...], <year>` | `DD/MM/YYYY` (`date`) |
//! | 2 | a `20xx` year in input shorter than 10 chars | `EXPECTED: YYYY` (`expected`) |
//! | 3 | `Q1`-`Q4`, `Summer`, `Winter`, `Late`, `Early` + `20xx` | `WINDOW: <FRAGMENT>` (`window`) |
//! | 4 | anything else non-empty | `WINDOW: <first 20 chars>` (`window`) |
//! | - | empty or "coming soon" | `TBA` (`window`) |
//!
//! The output is a display format and is not meant to be fed back in.

use crate::models::DateRecord;
use crate::utils::capitalize;
use once_cell::sync::Lazy;
use regex::Regex;

/// Day then month abbreviation (extra letters allowed, e.g. "Sept"), comma, year.
static EXACT_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,2})\s*([A-Za-z]{3})\w*,\s*([0-9]{4})").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"20[0-9]{2}").unwrap());

static WINDOW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(Q[1-4]|Summer|Winter|Late|Early)\s+20[0-9]{2}").unwrap()
});

/// Inputs this long or longer are treated as sentences, not bare years.
const YEAR_ONLY_MAX_CHARS: usize = 10;

/// Fallback windows keep at most this many characters of the input.
const FALLBACK_MAX_CHARS: usize = 20;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Map a three-letter month abbreviation (any case) to its number.
///
/// Unknown abbreviations map to January rather than failing.
pub fn month_number(abbrev: &str) -> u32 {
    let normalized = capitalize(abbrev);
    MONTHS
        .iter()
        .position(|m| *m == normalized)
        .map(|i| i as u32 + 1)
        .unwrap_or(1)
}

/// Classify a scraped release-date fragment. Never fails.
pub fn classify(raw: &str) -> DateRecord {
    let text = raw.trim();

    exact_date(text)
        .or_else(|| expected_year(text))
        .or_else(|| named_window(text))
        .unwrap_or_else(|| fallback(text))
}

fn exact_date(text: &str) -> Option<DateRecord> {
    let caps = EXACT_DATE_RE.captures(text)?;
    let month = month_number(&caps[2]);
    Some(DateRecord::exact(&caps[1], month, &caps[3]))
}

// A short input like "Q3 2026" also holds a 20xx year; it is a window, not a
// bare year, so window phrases are excluded here.
fn expected_year(text: &str) -> Option<DateRecord> {
    if text.chars().count() >= YEAR_ONLY_MAX_CHARS || WINDOW_RE.is_match(text) {
        return None;
    }
    let year = YEAR_RE.find(text)?;
    Some(DateRecord::expected(year.as_str()))
}

fn named_window(text: &str) -> Option<DateRecord> {
    let fragment = WINDOW_RE.find(text)?;
    Some(DateRecord::window(fragment.as_str()))
}

fn fallback(text: &str) -> DateRecord {
    if text.is_empty() || text.to_lowercase() == "coming soon" {
        return DateRecord::tba();
    }
    let head: String = text.chars().take(FALLBACK_MAX_CHARS).collect();
    DateRecord::window(&head)
}
