use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::store::json_store::StorageBackend;
use crate::store::schema::{HISTORY_KEY, HistoryEntry, entry_from_value};

/// Category/mode selection for the history view. An empty set admits
/// everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub categories: BTreeSet<String>,
    pub modes: BTreeSet<String>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        (self.categories.is_empty() || self.categories.contains(&entry.category))
            && (self.modes.is_empty() || self.modes.contains(&entry.mode))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.modes.is_empty()
    }

    pub fn toggle_category(&mut self, category: &str) {
        if !self.categories.remove(category) {
            self.categories.insert(category.to_string());
        }
    }

    pub fn toggle_mode(&mut self, mode: &str) {
        if !self.modes.remove(mode) {
            self.modes.insert(mode.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.categories.clear();
        self.modes.clear();
    }
}

pub fn filter_entries<'a>(entries: &'a [HistoryEntry], filter: &HistoryFilter) -> Vec<&'a HistoryEntry> {
    entries.iter().filter(|e| filter.matches(e)).collect()
}

/// Distinct categories and modes present, for building filter toggles.
pub fn filter_options(entries: &[HistoryEntry]) -> (Vec<String>, Vec<String>) {
    let categories: BTreeSet<&str> = entries.iter().map(|e| e.category.as_str()).collect();
    let modes: BTreeSet<&str> = entries.iter().map(|e| e.mode.as_str()).collect();
    (
        categories.into_iter().map(str::to_string).collect(),
        modes.into_iter().map(str::to_string).collect(),
    )
}

/// Append-only list of past quizzes kept under a single key.
pub struct HistoryStore {
    backend: Box<dyn StorageBackend>,
}

impl HistoryStore {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// All entries in insertion order. A missing or unreadable store reads
    /// as empty; individual entries that fail to decode are skipped.
    pub fn list(&self) -> Vec<HistoryEntry> {
        let raw = match self.backend.read(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("could not read history: {e:#}");
                return Vec::new();
            }
        };
        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!("history is not a JSON array, treating as empty: {e}");
                return Vec::new();
            }
        };

        let needs_backfill = values
            .iter()
            .any(|v| v.is_object() && (v.get("id").is_none() || v.get("date").is_none()));
        let now = Utc::now();
        let base_id = now.timestamp_millis();
        let total = values.len();
        let entries: Vec<HistoryEntry> = values
            .into_iter()
            .enumerate()
            .filter_map(|(i, v)| entry_from_value(v, base_id - i as i64, now))
            .collect();
        if entries.len() < total {
            warn!(skipped = total - entries.len(), "skipped unreadable history entries");
        }
        if needs_backfill {
            // Generated ids and dates must survive the next read.
            match serde_json::to_string(&entries) {
                Ok(json) => match self.backend.write(HISTORY_KEY, &json) {
                    Ok(()) => info!(count = entries.len(), "filled in legacy history entries"),
                    Err(e) => warn!("could not rewrite legacy history: {e:#}"),
                },
                Err(e) => warn!("could not encode history: {e}"),
            }
        }
        entries
    }

    pub fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.list();
        entries.push(entry);
        let json = serde_json::to_string(&entries)?;
        self.backend
            .write(HISTORY_KEY, &json)
            .context("failed to write history")?;
        info!(count = entries.len(), "history saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.backend
            .remove(HISTORY_KEY)
            .context("failed to clear history")?;
        info!("history cleared");
        Ok(())
    }

    pub fn filter(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        self.list().into_iter().filter(|e| filter.matches(e)).collect()
    }

    /// Millisecond timestamp id, bumped past the newest stored id so two
    /// saves in the same millisecond stay distinct.
    pub fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let max_existing = self.list().iter().map(|e| e.id).max().unwrap_or(i64::MIN);
        now.max(max_existing.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::result::QuizResult;
    use crate::session::setup::{Category, QuizConfiguration, ScoringMode};
    use crate::store::json_store::MemoryStore;
    use anyhow::bail;

    fn entry(id: i64, category: Category, mode: ScoringMode) -> HistoryEntry {
        let config = QuizConfiguration {
            category,
            ..QuizConfiguration::default()
        };
        HistoryEntry::new(id, Utc::now(), &config, mode, QuizResult::new(), 0)
    }

    fn memory_history() -> HistoryStore {
        HistoryStore::new(Box::new(MemoryStore::new()))
    }

    struct BrokenBackend;

    impl StorageBackend for BrokenBackend {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            bail!("disk on fire")
        }
        fn write(&self, _key: &str, _value: &str) -> Result<()> {
            bail!("read-only")
        }
        fn remove(&self, _key: &str) -> Result<()> {
            bail!("read-only")
        }
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let history = memory_history();
        history.append(entry(1, Category::Python, ScoringMode::Standard)).unwrap();
        history.append(entry(2, Category::Ruby, ScoringMode::Timed)).unwrap();
        let ids: Vec<i64> = history.list().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_clear_empties_history() {
        let history = memory_history();
        history.append(entry(1, Category::Python, ScoringMode::Standard)).unwrap();
        history.clear().unwrap();
        assert!(history.list().is_empty());
    }

    #[test]
    fn test_corrupted_store_reads_empty() {
        let backend = MemoryStore::new();
        backend.write(HISTORY_KEY, "{not json").unwrap();
        let history = HistoryStore::new(Box::new(backend));
        assert!(history.list().is_empty());
    }

    #[test]
    fn test_corrupted_store_is_replaced_on_append() {
        let backend = MemoryStore::new();
        backend.write(HISTORY_KEY, "\"a string\"").unwrap();
        let history = HistoryStore::new(Box::new(backend));
        history.append(entry(5, Category::Java, ScoringMode::Standard)).unwrap();
        assert_eq!(history.list().len(), 1);
    }

    #[test]
    fn test_bad_elements_are_skipped() {
        let backend = MemoryStore::new();
        backend
            .write(HISTORY_KEY, r#"[42, {"category": "php", "correctAnswers": 1}]"#)
            .unwrap();
        let history = HistoryStore::new(Box::new(backend));
        let entries = history.list();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "php");
    }

    #[test]
    fn test_legacy_ids_are_stable_across_reads() {
        let backend = MemoryStore::new();
        backend
            .write(
                HISTORY_KEY,
                r#"[{"correctAnswers": 2, "totalQuestions": 3}, {"correctAnswers": 1, "totalQuestions": 3}]"#,
            )
            .unwrap();
        let history = HistoryStore::new(Box::new(backend));

        let first = history.list();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = history.list();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_ne!(first[0].id, first[1].id);
    }

    #[test]
    fn test_unreadable_backend_reads_empty_and_write_errors() {
        let history = HistoryStore::new(Box::new(BrokenBackend));
        assert!(history.list().is_empty());
        assert!(history.append(entry(1, Category::Python, ScoringMode::Standard)).is_err());
        assert!(history.clear().is_err());
    }

    #[test]
    fn test_filter_by_category_and_mode() {
        let history = memory_history();
        history.append(entry(1, Category::Python, ScoringMode::Standard)).unwrap();
        history.append(entry(2, Category::Javascript, ScoringMode::Standard)).unwrap();
        history.append(entry(3, Category::Python, ScoringMode::Timed)).unwrap();

        let mut filter = HistoryFilter::default();
        assert_eq!(history.filter(&filter).len(), 3);

        filter.toggle_category("python");
        assert_eq!(history.filter(&filter).len(), 2);

        filter.toggle_mode("timed");
        let only: Vec<i64> = history.filter(&filter).iter().map(|e| e.id).collect();
        assert_eq!(only, vec![3]);

        filter.toggle_category("python");
        assert_eq!(history.filter(&filter).len(), 1);
        filter.clear();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_filter_options_are_distinct_and_sorted() {
        let entries = vec![
            entry(1, Category::Ruby, ScoringMode::Timed),
            entry(2, Category::Java, ScoringMode::Timed),
            entry(3, Category::Ruby, ScoringMode::Standard),
        ];
        let (categories, modes) = filter_options(&entries);
        assert_eq!(categories, vec!["java", "ruby"]);
        assert_eq!(modes, vec!["standard", "timed"]);
    }

    #[test]
    fn test_next_id_moves_past_existing() {
        let history = memory_history();
        let far_future = Utc::now().timestamp_millis() + 1_000_000;
        history.append(entry(far_future, Category::Python, ScoringMode::Standard)).unwrap();
        assert_eq!(history.next_id(), far_future + 1);
    }
}
