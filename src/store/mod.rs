//! JSON-document persistence for the curator memory.
//!
//! The whole [`MemoryDocument`] lives in memory and is rewritten to disk after
//! every mutation. Writes go through a temp file followed by a rename, so a
//! crash mid-write never leaves a truncated document behind.
//!
//! Read and write failures are logged and swallowed: a missing or corrupt
//! file falls back to an empty document on load, and a failed save reports
//! `false` without raising.

use crate::models::{Article, MemoryDocument, SearchRecord, UsageStats};
use crate::{Error, Result, local_timestamp};
use std::fs;
use std::path::{Path, PathBuf};

/// Default memory file name.
pub const DEFAULT_MEMORY_FILE: &str = "curator_memory.json";

/// Default number of history entries returned by [`MemoryStore::list_history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Persistent store for the curator memory document.
pub struct MemoryStore {
    /// Path of the backing JSON file.
    path: PathBuf,
    /// The in-memory document.
    doc: MemoryDocument,
}

impl MemoryStore {
    /// Opens a store at `path`, loading the existing document.
    ///
    /// A missing file or a file that fails to parse falls back to an empty
    /// default document; the failure is logged, never surfaced.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut doc = Self::load(&path);

        // Legacy documents carry no id counter; derive it from the surviving
        // articles so ids stay unique across the document's lifetime.
        if doc.next_article_id == 0 {
            doc.next_article_id = doc.articles.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        }

        Self { path, doc }
    }

    /// Reads and parses the document at `path`.
    fn load(path: &Path) -> MemoryDocument {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Memory file not found, starting empty");
            return MemoryDocument::default();
        }

        match Self::try_load(path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load memory, starting empty");
                MemoryDocument::default()
            },
        }
    }

    /// Fallible load, used internally so failures can be logged in one place.
    fn try_load(path: &Path) -> Result<MemoryDocument> {
        let contents = fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_memory_file".to_string(),
            cause: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_memory_file".to_string(),
            cause: e.to_string(),
        })
    }

    /// Serializes the full document back to disk.
    ///
    /// Returns `true` on success. Write failures are logged and reported via
    /// the flag rather than raised.
    pub fn save(&self) -> bool {
        match self.try_save() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to save memory");
                false
            },
        }
    }

    /// Atomic save: write to a sibling temp file, then rename over the target.
    fn try_save(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.doc).map_err(|e| Error::OperationFailed {
                operation: "serialize_memory".to_string(),
                cause: e.to_string(),
            })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| Error::OperationFailed {
            operation: "write_memory_file".to_string(),
            cause: e.to_string(),
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|e| Error::OperationFailed {
            operation: "rename_memory_file".to_string(),
            cause: e.to_string(),
        })
    }

    /// Appends a search record with the current timestamp and persists.
    pub fn record_search(&mut self, query: impl Into<String>, result_count: u32) {
        self.doc.search_history.push(SearchRecord {
            timestamp: local_timestamp(),
            query: query.into(),
            result_count,
        });
        self.doc.recount();
        self.save();
    }

    /// Saves an article and returns its assigned id.
    ///
    /// The id comes from the document's strictly increasing counter, so ids
    /// are never reused after a deletion. New tags are merged into the tag
    /// index (exact-match dedup, first-seen order).
    pub fn save_article(
        &mut self,
        title: impl Into<String>,
        summary: impl Into<String>,
        tags: Vec<String>,
        url: Option<String>,
    ) -> u64 {
        let id = self.doc.next_article_id;
        self.doc.next_article_id += 1;

        self.doc.index_tags(&tags);
        self.doc.articles.push(Article {
            id,
            saved_at: local_timestamp(),
            title: title.into(),
            summary: summary.into(),
            tags,
            url,
        });
        self.doc.recount();
        self.save();

        id
    }

    /// Returns all articles carrying `tag`, matched case-insensitively
    /// against each article's own tags. No substring matching.
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> Vec<Article> {
        self.doc
            .articles
            .iter()
            .filter(|a| a.has_tag(tag))
            .cloned()
            .collect()
    }

    /// Returns the current article list.
    #[must_use]
    pub fn list_articles(&self) -> &[Article] {
        &self.doc.articles
    }

    /// Returns the current tag index.
    #[must_use]
    pub fn list_tags(&self) -> &[String] {
        &self.doc.tags
    }

    /// Returns the last `limit` search records in chronological order.
    #[must_use]
    pub fn list_history(&self, limit: usize) -> &[SearchRecord] {
        let history = &self.doc.search_history;
        let start = history.len().saturating_sub(limit);
        &history[start..]
    }

    /// Removes all articles with the given id and persists.
    ///
    /// Returns how many were removed. Removing an unknown id is a no-op that
    /// still counts as success; the counters are recomputed either way.
    pub fn delete_article(&mut self, id: u64) -> usize {
        let before = self.doc.articles.len();
        self.doc.articles.retain(|a| a.id != id);
        let removed = before - self.doc.articles.len();

        self.doc.recount();
        self.save();
        removed
    }

    /// Removes the search record at the zero-based `index` if in range.
    ///
    /// Out-of-range indices perform no mutation and report `false`.
    pub fn delete_search(&mut self, index: usize) -> bool {
        if index >= self.doc.search_history.len() {
            return false;
        }

        self.doc.search_history.remove(index);
        self.doc.recount();
        self.save();
        true
    }

    /// Empties the search history, resets its counter, and persists.
    pub fn clear_history(&mut self) {
        self.doc.search_history.clear();
        self.doc.recount();
        self.save();
    }

    /// Returns the current usage counters.
    #[must_use]
    pub const fn stats(&self) -> UsageStats {
        self.doc.stats
    }

    /// Returns the full in-memory document.
    #[must_use]
    pub const fn document(&self) -> &MemoryDocument {
        &self.doc
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> MemoryStore {
        MemoryStore::open(dir.path().join(DEFAULT_MEMORY_FILE))
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.list_articles().is_empty());
        assert!(store.list_tags().is_empty());
        assert_eq!(store.stats(), UsageStats::default());
    }

    #[test]
    fn test_open_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_MEMORY_FILE);
        fs::write(&path, "{not valid json").unwrap();

        let store = MemoryStore::open(&path);
        assert!(store.list_articles().is_empty());
    }

    #[test]
    fn test_save_article_assigns_increasing_ids() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let a = store.save_article("A", "sum", vec!["ml".into(), "ai".into()], None);
        let b = store.save_article("B", "sum2", vec!["ai".into()], None);

        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(store.list_tags(), ["ml", "ai"]);
        assert_eq!(store.stats().total_articles_saved, 2);
    }

    #[test]
    fn test_ids_not_reused_after_deletion() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.save_article("A", "s", vec![], None);
        let b = store.save_article("B", "s", vec![], None);
        store.delete_article(1);

        let c = store.save_article("C", "s", vec![], None);
        assert_eq!(b, 2);
        assert_eq!(c, 3);
        // Surviving article B keeps an id distinct from the new one
        let ids: Vec<u64> = store.list_articles().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_delete_article_recounts_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.save_article("A", "sum", vec!["ml".into(), "ai".into()], None);
        store.save_article("B", "sum2", vec!["ai".into()], None);

        assert_eq!(store.delete_article(1), 1);
        assert_eq!(store.list_articles().len(), 1);
        assert_eq!(store.list_articles()[0].title, "B");
        assert_eq!(store.stats().total_articles_saved, 1);

        // Repeated deletion of the same id is a no-op
        assert_eq!(store.delete_article(1), 0);
        assert_eq!(store.stats().total_articles_saved, 1);
    }

    #[test]
    fn test_find_by_tag_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.save_article("A", "s", vec!["Rust".into()], None);
        store.save_article("B", "s", vec!["python".into()], None);

        let upper = store.find_by_tag("RUST");
        let lower = store.find_by_tag("rust");
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 1);
        assert_eq!(upper[0].title, "A");

        assert!(store.find_by_tag("rus").is_empty());
    }

    #[test]
    fn test_history_tail_and_clear() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.record_search("rust", 5);
        store.record_search("go", 5);
        store.record_search("zig", 5);

        let tail = store.list_history(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].query, "go");
        assert_eq!(tail[1].query, "zig");
        assert_eq!(store.stats().total_searches, 3);

        store.clear_history();
        assert!(store.list_history(DEFAULT_HISTORY_LIMIT).is_empty());
        assert_eq!(store.stats().total_searches, 0);
    }

    #[test]
    fn test_delete_search_out_of_range_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.record_search("rust", 5);
        assert!(!store.delete_search(1));
        assert!(!store.delete_search(99));
        assert_eq!(store.stats().total_searches, 1);

        assert!(store.delete_search(0));
        assert_eq!(store.stats().total_searches, 0);
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_MEMORY_FILE);

        let mut store = MemoryStore::open(&path);
        store.save_article(
            "Ownership in Rust",
            "Borrow checker walkthrough",
            vec!["rust".into(), "memoria".into()],
            Some("https://example.com/ownership".into()),
        );
        store.record_search("ownership", 5);

        let reloaded = MemoryStore::open(&path);
        assert_eq!(reloaded.document(), store.document());
    }

    #[test]
    fn test_legacy_document_derives_next_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_MEMORY_FILE);

        // A document written before the id counter existed
        let legacy = r#"{
            "historial_busquedas": [],
            "articulos_guardados": [
                {"id": 1, "fecha_guardado": "2025-01-01 10:00:00", "titulo": "A",
                 "resumen": "s", "etiquetas": [], "url": null},
                {"id": 4, "fecha_guardado": "2025-01-01 11:00:00", "titulo": "B",
                 "resumen": "s", "etiquetas": [], "url": null}
            ],
            "etiquetas": [],
            "estadisticas": {"total_busquedas": 0, "total_articulos_guardados": 2}
        }"#;
        fs::write(&path, legacy).unwrap();

        let mut store = MemoryStore::open(&path);
        let id = store.save_article("C", "s", vec![], None);
        assert_eq!(id, 5);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.record_search("rust", 5);

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![DEFAULT_MEMORY_FILE]);
    }

    #[test]
    fn test_duplicate_tags_within_article_kept() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.save_article("A", "s", vec!["ml".into(), "ml".into()], None);
        // The article keeps its duplicates; the index does not
        assert_eq!(store.list_articles()[0].tags, vec!["ml", "ml"]);
        assert_eq!(store.list_tags(), ["ml"]);
    }
}
