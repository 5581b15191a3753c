//! # Curator
//!
//! A personal curator for technical articles with persistent memory.
//!
//! Curator asks an LLM provider for article recommendations on a topic or a
//! structured summary of pasted content, and keeps a local JSON document with
//! the user's saved articles, tags, and search history. The same store and
//! service layer is exposed through two thin front-ends: a REST API and an
//! interactive terminal menu.
//!
//! ## Example
//!
//! ```rust,ignore
//! use curator::{CuratorService, MemoryStore};
//! use curator::llm::GeminiClient;
//!
//! let mut store = MemoryStore::open("curator_memory.json");
//! let service = CuratorService::new(GeminiClient::new());
//!
//! let suggestions = service.recommend("rust async runtimes")?;
//! store.record_search("rust async runtimes", 5);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod api;
pub mod config;
pub mod curator;
pub mod export;
pub mod llm;
pub mod menu;
pub mod models;
pub mod store;

// Re-exports for convenience
pub use config::{CuratorConfig, LlmConfig, LlmProviderKind};
pub use curator::CuratorService;
pub use llm::LlmProvider;
pub use models::{Article, MemoryDocument, SearchRecord, UsageStats};
pub use store::MemoryStore;

/// Error type for curator operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Missing required fields, empty topic/content, empty export |
/// | `OperationFailed` | I/O errors, serialization failures, LLM provider errors |
/// | `NotFound` | Unknown tag, unknown article id, history index out of range |
/// | `MissingCredentials` | Provider API key absent at startup |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Memory file reads/writes fail
    /// - JSON serialization fails
    /// - The LLM provider returns an error (timeout, auth, quota)
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A requested resource does not exist.
    ///
    /// Raised when a tag matches no articles, an article id is unknown,
    /// or a history index is out of range. Front-ends map this to their
    /// native "not found" signal (HTTP 404, printed notice).
    #[error("not found: {0}")]
    NotFound(String),

    /// The LLM provider credential is not configured.
    ///
    /// Fatal at startup for both front-ends when the configured provider
    /// requires a key.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
}

/// Result type alias for curator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current local timestamp in the store's `"%Y-%m-%d %H:%M:%S"`
/// format.
///
/// Every stored record (search history entries, saved articles) carries this
/// format, so it lives here rather than being re-derived per module.
#[must_use]
pub fn local_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "save_memory".to_string(),
            cause: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'save_memory' failed: disk full");

        let err = Error::NotFound("tag 'rust'".to_string());
        assert_eq!(err.to_string(), "not found: tag 'rust'");

        let err = Error::MissingCredentials("GOOGLE_API_KEY".to_string());
        assert_eq!(err.to_string(), "missing credentials: GOOGLE_API_KEY");
    }

    #[test]
    fn test_local_timestamp_format() {
        let ts = local_timestamp();
        // "YYYY-MM-DD HH:MM:SS" is always 19 characters
        assert_eq!(ts.len(), 19);
        assert_eq!(ts.as_bytes()[4], b'-');
        assert_eq!(ts.as_bytes()[10], b' ');
        assert_eq!(ts.as_bytes()[13], b':');
    }
}
