use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::store::schema::HistoryEntry;

pub fn export_result(dir: &Path, entry: &HistoryEntry) -> Result<PathBuf> {
    write_pretty(dir, "mind-maze-results", entry)
}

/// Writes whatever the caller passes, typically the filtered view.
pub fn export_history(dir: &Path, entries: &[HistoryEntry]) -> Result<PathBuf> {
    write_pretty(dir, "mind-maze-history", entries)
}

fn write_pretty<T: serde::Serialize + ?Sized>(dir: &Path, stem: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir {}", dir.display()))?;
    let path = unique_path(dir, stem);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "exported");
    Ok(path)
}

fn unique_path(dir: &Path, stem: &str) -> PathBuf {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let path = dir.join(format!("{stem}-{millis}.json"));
        if !path.exists() {
            return path;
        }
        millis += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::result::QuizResult;
    use crate::session::setup::{QuizConfiguration, ScoringMode};
    use tempfile::TempDir;

    fn sample(id: i64) -> HistoryEntry {
        HistoryEntry::new(
            id,
            Utc::now(),
            &QuizConfiguration::default(),
            ScoringMode::Challenge,
            QuizResult::new(),
            12,
        )
    }

    #[test]
    fn test_export_result_writes_pretty_json() {
        let dir = TempDir::new().unwrap();
        let path = export_result(dir.path(), &sample(3)).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("mind-maze-results-"));
        assert!(name.ends_with(".json"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        let back: HistoryEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(back.id, 3);
        assert_eq!(back.mode, "challenge");
    }

    #[test]
    fn test_export_history_writes_array() {
        let dir = TempDir::new().unwrap();
        let path = export_history(dir.path(), &[sample(1), sample(2)]).unwrap();
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("mind-maze-history-")
        );
        let back: Vec<HistoryEntry> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn test_repeated_exports_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let a = export_history(dir.path(), &[]).unwrap();
        let b = export_history(dir.path(), &[]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_export_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = export_history(&nested, &[]).unwrap();
        assert!(path.starts_with(&nested));
    }
}
