//! Data models for release-date records and game entries.
//!
//! This module defines the core data structures used throughout the application:
//! - [`DateRecord`]: Normalized release date produced by the classifier
//! - [`ReleaseType`]: Tag identifying which display shape a record has
//! - [`GameEntry`]: Parsed view over one record block of the games file

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which canonical shape a [`DateRecord`] text takes.
///
/// Serialized in lower case (`"date"`, `"expected"`, `"window"`), which is
/// also the literal written into the `release_type` field of the games file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// Exact day known, text is `DD/MM/YYYY`.
    Date,
    /// Only the year is known, text is `EXPECTED: YYYY`.
    Expected,
    /// Fuzzy period or nothing usable, text is `WINDOW: ...` or `TBA`.
    Window,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Date => "date",
            ReleaseType::Expected => "expected",
            ReleaseType::Window => "window",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized release date ready for display.
///
/// Fields are private and records are only built through the constructors
/// below, so `release_type` always agrees with the shape of `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRecord {
    /// Display string written to `release_info`.
    text: String,
    /// Shape tag written to `release_type`.
    #[serde(rename = "type")]
    release_type: ReleaseType,
}

impl DateRecord {
    /// Display string, one of `DD/MM/YYYY`, `EXPECTED: YYYY`, `WINDOW: ...` or `TBA`.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn release_type(&self) -> ReleaseType {
        self.release_type
    }

    /// Exact date. `day` and `month` are zero-padded to two digits.
    pub fn exact(day: &str, month: u32, year: &str) -> Self {
        Self {
            text: format!("{:0>2}/{:02}/{}", day, month, year),
            release_type: ReleaseType::Date,
        }
    }

    pub fn expected(year: &str) -> Self {
        Self {
            text: format!("EXPECTED: {}", year),
            release_type: ReleaseType::Expected,
        }
    }

    /// Fuzzy window. The token is upper-cased.
    pub fn window(token: &str) -> Self {
        Self {
            text: format!("WINDOW: {}", token.to_uppercase()),
            release_type: ReleaseType::Window,
        }
    }

    /// Nothing usable was found.
    pub fn tba() -> Self {
        Self {
            text: "TBA".to_string(),
            release_type: ReleaseType::Window,
        }
    }

    pub fn is_tba(&self) -> bool {
        self.text == "TBA"
    }
}

/// One record block of the games file, as seen by the updater.
///
/// Exists only as a view over the text store: created by parsing a block,
/// refreshed by field substitution, persisted by rewriting the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEntry {
    /// Title used both as the store key and as the search term.
    pub name: String,
    /// Current `release_info` value, if the block has one.
    pub release_info: Option<String>,
    /// Current `release_type` value, if the block has one.
    pub release_type: Option<String>,
}

impl GameEntry {
    /// Replace both release fields wholesale with a fresh record.
    pub fn apply(&mut self, record: &DateRecord) {
        self.release_info = Some(record.text.clone());
        self.release_type = Some(record.release_type.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_zero_pads() {
        let record = DateRecord::exact("5", 2, "2026");
        assert_eq!(record.text, "05/02/2026");
        assert_eq!(record.release_type, ReleaseType::Date);
    }

    #[test]
    fn test_window_uppercases() {
        let record = DateRecord::window("Late 2026");
        assert_eq!(record.text, "WINDOW: LATE 2026");
        assert_eq!(record.release_type, ReleaseType::Window);
    }

    #[test]
    fn test_tba() {
        let record = DateRecord::tba();
        assert!(record.is_tba());
        assert_eq!(record.release_type, ReleaseType::Window);
        assert!(!DateRecord::expected("2026").is_tba());
    }

    #[test]
    fn test_date_record_serialization() {
        let json = serde_json::to_string(&DateRecord::expected("2027")).unwrap();
        assert_eq!(json, r#"{"text":"EXPECTED: 2027","type":"expected"}"#);
    }

    #[test]
    fn test_release_type_display() {
        assert_eq!(ReleaseType::Date.to_string(), "date");
        assert_eq!(ReleaseType::Expected.to_string(), "expected");
        assert_eq!(ReleaseType::Window.to_string(), "window");
    }

    #[test]
    fn test_game_entry_apply_replaces_fields() {
        let mut entry = GameEntry {
            name: "Hollow Knight: Silksong".to_string(),
            release_info: Some("TBA".to_string()),
            release_type: Some("window".to_string()),
        };
        entry.apply(&DateRecord::exact("04", 9, "2025"));
        assert_eq!(entry.release_info.as_deref(), Some("04/09/2025"));
        assert_eq!(entry.release_type.as_deref(), Some("date"));
    }
}
