//! Structured JSON snapshot of the refreshed entries.
//!
//! The games file stays the source the site reads; this snapshot is a
//! machine-friendly copy of the same data that does not need regex patching
//! to consume.

use crate::models::GameEntry;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// The serialized snapshot document.
#[derive(Debug, Deserialize, Serialize)]
pub struct Snapshot {
    /// RFC 3339 UTC timestamp of the run.
    pub generated_at: String,
    /// Entries in the order they appear in the games file.
    pub games: Vec<GameEntry>,
}

/// Write `entries` as a pretty-printed JSON snapshot.
///
/// # Arguments
///
/// * `entries` - Refreshed entries, in games-file order
/// * `path` - Output file; missing parent directories are created
///
/// # Returns
///
/// `Ok(())` on success, or an error if directory creation, serialization or
/// the file write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_snapshot(entries: &[GameEntry], path: &Path) -> Result<(), Box<dyn Error>> {
    let snapshot = Snapshot {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        games: entries.to_vec(),
    };
    let json = serde_json::to_string_pretty(&snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create snapshot dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(count = entries.len(), "Wrote JSON snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_snapshot_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/coming_soon.json");
        let entries = vec![GameEntry {
            name: "Hades II".to_string(),
            release_info: Some("25/09/2025".to_string()),
            release_type: Some("date".to_string()),
        }];

        write_snapshot(&entries, &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let snapshot: Snapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(snapshot.games, entries);
        assert!(snapshot.generated_at.ends_with('Z'));
    }
}
