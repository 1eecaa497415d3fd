use anyhow::{Context, Result};
use chrono::Utc;
use media_trend_config::MAX_HISTORY_CAPACITY;
use media_trend_models::HistoryRecord;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Previously subscribed items, oldest first.
///
/// Bounded FIFO: inserting past capacity drops the oldest record. Keys are
/// unique; lookups are a linear scan, which the capacity ceiling keeps cheap.
#[derive(Debug, Clone)]
pub struct History {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_HISTORY_CAPACITY);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild from stored records, keeping the newest `capacity` unique keys
    pub fn from_records(records: Vec<HistoryRecord>, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        for record in records {
            history.insert(record);
        }
        history
    }

    /// Returns false when the key is already recorded
    pub fn insert(&mut self, record: HistoryRecord) -> bool {
        if self.contains(&record.unique_key) {
            return false;
        }
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_front() {
                debug!("History full, dropping oldest entry {}", evicted.unique_key);
            }
        }
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.iter().any(|r| r.unique_key == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<HistoryRecord> {
        let index = self.records.iter().position(|r| r.unique_key == key)?;
        self.records.remove(index)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// JSON file holding the history between runs
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file yields an empty history. A file that fails to parse is
    /// moved aside and an empty history is used instead.
    pub fn load(&self, capacity: usize) -> Result<History> {
        if !self.path.exists() {
            debug!("No history file at {:?}, starting empty", self.path);
            return Ok(History::new(capacity));
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file {:?}", self.path))?;
        if content.trim().is_empty() {
            return Ok(History::new(capacity));
        }

        match serde_json::from_str::<Vec<HistoryRecord>>(&content) {
            Ok(records) => {
                let history = History::from_records(records, capacity);
                info!("Loaded {} history entries from {:?}", history.len(), self.path);
                Ok(history)
            }
            Err(e) => {
                let backup = self.backup_path();
                warn!(
                    "History file {:?} is corrupted ({}), moving it to {:?}",
                    self.path, e, backup
                );
                std::fs::rename(&self.path, &backup)
                    .with_context(|| format!("Failed to move corrupted history to {:?}", backup))?;
                Ok(History::new(capacity))
            }
        }
    }

    /// Write through a temp file and rename, so a crash never leaves a half-written file
    pub fn save(&self, history: &History) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let records: Vec<&HistoryRecord> = history.iter().collect();
        let json = serde_json::to_string_pretty(&records)?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace history file {:?}", self.path))?;
        debug!("History saved: {} entries", history.len());
        Ok(())
    }

    fn backup_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        self.path.with_extension(format!("json.corrupt-{}", stamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_trend_models::Category;
    use tempfile::TempDir;

    fn record(id: u32) -> HistoryRecord {
        let external_id = id.to_string();
        HistoryRecord {
            title: format!("Title {}", id),
            category: Category::Movie,
            unique_key: HistoryRecord::key_for(Category::Movie, &external_id),
            external_id,
            tmdb_id: Some(id as u64),
            year: Some(2024),
            rating: 7.5,
            source: "tmdb:trending_day".to_string(),
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let mut history = History::new(10);
        assert!(history.insert(record(1)));
        assert!(!history.insert(record(1)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let mut history = History::new(MAX_HISTORY_CAPACITY);
        for id in 0..(MAX_HISTORY_CAPACITY as u32 + 20) {
            history.insert(record(id));
        }
        assert_eq!(history.len(), MAX_HISTORY_CAPACITY);
        // The 20 oldest are gone, the newest is last
        assert!(!history.contains("movie:19"));
        assert!(history.contains("movie:20"));
        assert_eq!(history.iter().last().unwrap().unique_key, "movie:519");
    }

    #[test]
    fn test_capacity_is_clamped() {
        assert_eq!(History::new(0).capacity(), 1);
        assert_eq!(History::new(10_000).capacity(), MAX_HISTORY_CAPACITY);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut history = History::from_records(vec![record(1), record(2), record(3)], 10);
        assert_eq!(history.remove("movie:2").unwrap().title, "Title 2");
        assert!(history.remove("movie:2").is_none());
        assert_eq!(history.len(), 2);
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_store_round_trip_truncates_to_capacity() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("data").join("history.json"));

        let records: Vec<_> = (0..600).map(record).collect();
        store.save(&History::from_records(records, MAX_HISTORY_CAPACITY)).unwrap();

        let loaded = store.load(MAX_HISTORY_CAPACITY).unwrap();
        assert_eq!(loaded.len(), MAX_HISTORY_CAPACITY);
        assert_eq!(loaded.iter().next().unwrap().unique_key, "movie:100");
        assert!(!dir.path().join("data").join("history.json.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        assert!(store.load(500).unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_file_is_moved_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = HistoryStore::new(path.clone());
        let history = store.load(500).unwrap();

        assert!(history.is_empty());
        assert!(!path.exists());
        let backups = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains("corrupt"))
            .count();
        assert_eq!(backups, 1);
    }
}
