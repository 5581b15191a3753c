//! Markdown export for the saved-article collection.
//!
//! Write-once output: the generated document is never read back. Exporting
//! an empty collection is an error and writes nothing.

use crate::models::Article;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "coleccion_articulos.md";

/// Renders `articles` to a Markdown document at `path`.
///
/// Layout per article: a title heading, an id + saved-timestamp line, an
/// optional URL line, a summary subsection, a comma-joined tags line, and a
/// separator. Returns the output path on success.
///
/// # Errors
///
/// `InvalidInput` when the collection is empty (no file is written);
/// `OperationFailed` when the write fails.
pub fn export_markdown(articles: &[Article], path: impl Into<PathBuf>) -> Result<PathBuf> {
    if articles.is_empty() {
        return Err(Error::InvalidInput(
            "no articles to export".to_string(),
        ));
    }

    let path = path.into();
    let document = render(articles);

    fs::write(&path, document).map_err(|e| Error::OperationFailed {
        operation: "write_export_file".to_string(),
        cause: format!("{}: {}", path.display(), e),
    })?;

    tracing::info!(path = %path.display(), count = articles.len(), "Collection exported");
    Ok(path)
}

/// Builds the Markdown document body.
fn render(articles: &[Article]) -> String {
    let mut out = String::new();

    out.push_str("# Mi Colección de Artículos Técnicos\n\n");
    out.push_str(&format!(
        "*Generado el {}*\n\n",
        chrono::Local::now().format("%Y-%m-%d")
    ));
    out.push_str("---\n\n");

    for article in articles {
        out.push_str(&format!("## {}\n\n", article.title));
        out.push_str(&format!(
            "**ID:** {} | **Guardado:** {}\n\n",
            article.id, article.saved_at
        ));
        if let Some(url) = &article.url {
            out.push_str(&format!("**URL:** {url}\n\n"));
        }
        out.push_str(&format!("### Resumen\n\n{}\n\n", article.summary));
        out.push_str(&format!("**Etiquetas:** {}\n\n", article.tags.join(", ")));
        out.push_str("---\n\n");
    }

    out
}

/// Resolves the export target, defaulting to [`DEFAULT_EXPORT_FILE`] in the
/// current directory.
#[must_use]
pub fn resolve_export_path(output: Option<&Path>) -> PathBuf {
    output.map_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE), Path::to_path_buf)
}
