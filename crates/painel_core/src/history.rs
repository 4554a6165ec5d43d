use crate::DbError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// One executed query, as recorded for the audit surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub sql: String,
    pub table: Option<String>,
    pub timestamp: i64,
    pub execution_time_ms: u64,
    pub row_count: usize,
}

impl HistoryEntry {
    pub fn new(
        sql: impl Into<String>,
        table: Option<String>,
        execution_time: Duration,
        row_count: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sql: sql.into(),
            table,
            timestamp: chrono::Utc::now().timestamp(),
            execution_time_ms: execution_time.as_millis() as u64,
            row_count,
        }
    }

    pub fn sql_preview(&self, max_len: usize) -> String {
        let single_line = self.sql.trim().replace('\n', " ");
        crate::truncate_safe(&single_line, max_len)
    }
}

/// Persistent, capped query log. Newest entries first.
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl HistoryStore {
    const DEFAULT_MAX_ENTRIES: usize = 500;

    pub fn new() -> Result<Self, DbError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| DbError::Configuration("Could not find data directory".to_string()))?;

        let app_dir = data_dir.join("painel");
        fs::create_dir_all(&app_dir)?;

        let path = app_dir.join("history.json");
        let entries = Self::load_from_path(&path)?;

        Ok(Self {
            path,
            entries,
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        })
    }

    fn load_from_path(path: &PathBuf) -> Result<Vec<HistoryEntry>, DbError> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        let entries: Vec<HistoryEntry> =
            serde_json::from_str(&content).map_err(|e| DbError::Configuration(e.to_string()))?;

        Ok(entries)
    }

    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.max_entries);
    }

    pub fn save(&self) -> Result<(), DbError> {
        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| DbError::Configuration(e.to_string()))?;

        fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(max_entries: usize) -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore {
            path: dir.path().join("history.json"),
            entries: Vec::new(),
            max_entries,
        };
        (dir, store)
    }

    #[test]
    fn newest_entries_come_first() {
        let (_dir, mut store) = temp_store(10);

        store.add(HistoryEntry::new("SELECT 1", None, Duration::ZERO, 1));
        store.add(HistoryEntry::new("SELECT 2", None, Duration::ZERO, 1));

        assert_eq!(store.entries()[0].sql, "SELECT 2");
        assert_eq!(store.entries()[1].sql, "SELECT 1");
    }

    #[test]
    fn cap_drops_oldest() {
        let (_dir, mut store) = temp_store(2);

        for i in 0..4 {
            store.add(HistoryEntry::new(
                format!("SELECT {i}"),
                None,
                Duration::ZERO,
                0,
            ));
        }

        assert_eq!(store.entries().len(), 2);
        assert_eq!(store.entries()[0].sql, "SELECT 3");
    }

    #[test]
    fn save_and_reload() {
        let (_dir, mut store) = temp_store(10);

        store.add(HistoryEntry::new(
            "SELECT \"produto\" FROM \"vendas\" LIMIT 100",
            Some("vendas".to_string()),
            Duration::from_millis(12),
            3,
        ));
        store.save().unwrap();

        let reloaded = HistoryStore::load_from_path(&store.path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].table.as_deref(), Some("vendas"));
        assert_eq!(reloaded[0].row_count, 3);
    }

    #[test]
    fn preview_collapses_newlines() {
        let entry = HistoryEntry::new("SELECT 1\nFROM x", None, Duration::ZERO, 0);
        assert_eq!(entry.sql_preview(40), "SELECT 1 FROM x");
    }
}
