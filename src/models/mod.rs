//! Domain models for the curator memory document.
//!
//! Wire and disk field names are Spanish, matching the persisted JSON format
//! and the REST surface this crate is compatible with. Rust-side names stay
//! idiomatic; `serde(rename)` carries the mapping.

use serde::{Deserialize, Serialize};

/// A user-curated article record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Strictly increasing article id, never reused after deletion.
    pub id: u64,
    /// Local timestamp (`"%Y-%m-%d %H:%M:%S"`) when the article was saved.
    #[serde(rename = "fecha_guardado")]
    pub saved_at: String,
    /// Article title.
    #[serde(rename = "titulo")]
    pub title: String,
    /// Stored summary text.
    #[serde(rename = "resumen")]
    pub summary: String,
    /// Ordered tag list; duplicates are allowed within a single article.
    #[serde(rename = "etiquetas")]
    pub tags: Vec<String>,
    /// Optional source URL.
    pub url: Option<String>,
}

impl Article {
    /// Returns true when any of the article's tags equals `tag`,
    /// compared case-insensitively. No substring matching.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// A logged recommendation search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Local timestamp (`"%Y-%m-%d %H:%M:%S"`) of the search.
    #[serde(rename = "fecha")]
    pub timestamp: String,
    /// The topic that was searched.
    pub query: String,
    /// Number of results the prompt asked for.
    #[serde(rename = "num_resultados")]
    pub result_count: u32,
}

/// Usage counters kept in sync with the live collections.
///
/// These are live-collection counts, not lifetime totals: after a deletion
/// each counter is recomputed to equal the current list length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Number of entries currently in the search history.
    #[serde(rename = "total_busquedas")]
    pub total_searches: u64,
    /// Number of articles currently saved.
    #[serde(rename = "total_articulos_guardados")]
    pub total_articles_saved: u64,
}

/// User preferences carried in the memory document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Topics the user marked as favorites.
    #[serde(rename = "temas_favoritos")]
    pub favorite_topics: Vec<String>,
    /// Preferred output language for prompts.
    #[serde(rename = "idioma_preferido")]
    pub preferred_language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            favorite_topics: Vec::new(),
            preferred_language: "español".to_string(),
        }
    }
}

/// The whole persisted memory document.
///
/// Loaded fully into memory at startup and rewritten to disk after every
/// mutation. All fields default so that older documents (missing
/// `proximo_id` or `preferencias`) still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDocument {
    /// Chronological, append-only search history.
    #[serde(rename = "historial_busquedas", default)]
    pub search_history: Vec<SearchRecord>,
    /// Saved articles in insertion order.
    #[serde(rename = "articulos_guardados", default)]
    pub articles: Vec<Article>,
    /// Deduplicated tag index in first-seen order. Storage is case-sensitive;
    /// lookups are case-insensitive.
    #[serde(rename = "etiquetas", default)]
    pub tags: Vec<String>,
    /// User preferences.
    #[serde(rename = "preferencias", default)]
    pub preferences: Preferences,
    /// Usage counters.
    #[serde(rename = "estadisticas", default)]
    pub stats: UsageStats,
    /// Next article id to assign. Zero means "not yet derived" (legacy
    /// document); the store derives `max(id) + 1` on load.
    #[serde(rename = "proximo_id", default)]
    pub next_article_id: u64,
}

impl MemoryDocument {
    /// Recomputes both counters from the current collection lengths.
    pub fn recount(&mut self) {
        self.stats.total_searches = self.search_history.len() as u64;
        self.stats.total_articles_saved = self.articles.len() as u64;
    }

    /// Merges an article's tags into the index, deduplicating by exact
    /// string match and preserving first-seen order.
    pub fn index_tags(&mut self, tags: &[String]) {
        for tag in tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: u64, tags: &[&str]) -> Article {
        Article {
            id,
            saved_at: "2026-01-01 10:00:00".to_string(),
            title: format!("Article {id}"),
            summary: "A summary".to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            url: None,
        }
    }

    #[test]
    fn test_has_tag_case_insensitive() {
        let art = article(1, &["Rust", "ml"]);
        assert!(art.has_tag("rust"));
        assert!(art.has_tag("RUST"));
        assert!(art.has_tag("ML"));
        assert!(!art.has_tag("rus"));
        assert!(!art.has_tag("machine-learning"));
    }

    #[test]
    fn test_index_tags_dedup_first_seen_order() {
        let mut doc = MemoryDocument::default();
        doc.index_tags(&["ml".to_string(), "ai".to_string()]);
        doc.index_tags(&["ai".to_string(), "rust".to_string()]);
        assert_eq!(doc.tags, vec!["ml", "ai", "rust"]);
    }

    #[test]
    fn test_index_tags_is_case_sensitive_for_storage() {
        let mut doc = MemoryDocument::default();
        doc.index_tags(&["Rust".to_string(), "rust".to_string()]);
        assert_eq!(doc.tags, vec!["Rust", "rust"]);
    }

    #[test]
    fn test_recount() {
        let mut doc = MemoryDocument::default();
        doc.articles.push(article(1, &[]));
        doc.search_history.push(SearchRecord {
            timestamp: "2026-01-01 10:00:00".to_string(),
            query: "rust".to_string(),
            result_count: 5,
        });
        doc.recount();
        assert_eq!(doc.stats.total_articles_saved, 1);
        assert_eq!(doc.stats.total_searches, 1);
    }

    #[test]
    fn test_document_serde_field_names() {
        let mut doc = MemoryDocument::default();
        doc.articles.push(article(1, &["ml"]));
        doc.recount();

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("articulos_guardados").is_some());
        assert!(json.get("historial_busquedas").is_some());
        assert!(json.get("etiquetas").is_some());
        assert!(json.get("estadisticas").is_some());
        assert!(json.get("preferencias").is_some());

        let art = &json["articulos_guardados"][0];
        assert!(art.get("titulo").is_some());
        assert!(art.get("fecha_guardado").is_some());
        assert!(art.get("resumen").is_some());
    }

    #[test]
    fn test_legacy_document_without_next_id() {
        let json = r#"{
            "historial_busquedas": [],
            "articulos_guardados": [],
            "etiquetas": [],
            "preferencias": {
                "temas_favoritos": [],
                "idioma_preferido": "español"
            },
            "estadisticas": {
                "total_busquedas": 0,
                "total_articulos_guardados": 0
            }
        }"#;

        let doc: MemoryDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.next_article_id, 0);
        assert_eq!(doc.preferences.preferred_language, "español");
    }
}
