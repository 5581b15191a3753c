//! Interactive terminal menu.
//!
//! A numbered 1-9 menu over the same store and service the REST API uses.
//! Input and output are generic so tests can drive the loop with in-memory
//! buffers; user-facing text stays in Spanish to match the service's wire
//! surface.

use crate::curator::{CuratorService, RECOMMENDED_ARTICLES};
use crate::export;
use crate::models::Article;
use crate::store::{DEFAULT_HISTORY_LIMIT, MemoryStore};
use crate::{Error, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Interactive menu session.
pub struct Menu<R, W> {
    input: R,
    out: W,
    store: MemoryStore,
    service: CuratorService,
    export_path: PathBuf,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Creates a menu session over the given streams, store, and service.
    pub fn new(
        input: R,
        out: W,
        store: MemoryStore,
        service: CuratorService,
        export_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input,
            out,
            store,
            service,
            export_path: export_path.into(),
        }
    }

    /// Runs the menu loop until the user exits or input ends.
    ///
    /// # Errors
    ///
    /// Returns an error only when the output stream fails; user-level
    /// failures (provider errors, empty input) are printed and the loop
    /// continues.
    pub fn run(&mut self) -> Result<()> {
        self.writeln("\n🤖 AGENTE CURADOR DE CONTENIDO TÉCNICO")?;
        self.writeln("======================================")?;

        loop {
            self.print_menu()?;
            write!(self.out, "Selecciona una opción (1-9): ").map_err(write_error)?;
            self.out.flush().map_err(write_error)?;

            // EOF ends the session like option 9, without the farewell.
            let Some(choice) = self.read_line()? else {
                return Ok(());
            };

            match choice.trim() {
                "1" => self.search_articles()?,
                "2" => self.summarize_content()?,
                "3" => {
                    self.save_article_flow()?;
                },
                "4" => self.show_articles()?,
                "5" => self.search_by_tag()?,
                "6" => self.export_collection()?,
                "7" => self.show_stats()?,
                "8" => self.show_history()?,
                "9" => {
                    self.writeln("\n👋 ¡Hasta luego! Tus artículos quedan guardados.")?;
                    return Ok(());
                },
                other => {
                    self.writeln(&format!("\n❌ Opción no válida: '{other}'"))?;
                },
            }
        }
    }

    fn print_menu(&mut self) -> Result<()> {
        self.writeln("\n--- MENÚ PRINCIPAL ---")?;
        self.writeln("1. Buscar artículos sobre un tema")?;
        self.writeln("2. Resumir contenido")?;
        self.writeln("3. Guardar artículo manualmente")?;
        self.writeln("4. Ver artículos guardados")?;
        self.writeln("5. Buscar artículos por etiqueta")?;
        self.writeln("6. Exportar colección a Markdown")?;
        self.writeln("7. Ver estadísticas")?;
        self.writeln("8. Ver historial de búsquedas")?;
        self.writeln("9. Salir")?;
        Ok(())
    }

    /// Option 1: recommendations for a topic, with an optional save step.
    fn search_articles(&mut self) -> Result<()> {
        let topic = self.prompt("\n🔍 ¿Sobre qué tema quieres buscar artículos? ")?;
        let topic = topic.trim().to_string();
        if topic.is_empty() {
            self.writeln("❌ El tema no puede estar vacío.")?;
            return Ok(());
        }

        self.writeln("\n⏳ Buscando recomendaciones...")?;
        match self.service.recommend(&topic) {
            Ok(results) => {
                self.writeln(&format!("\n📚 Recomendaciones sobre '{topic}':\n"))?;
                self.writeln(&results)?;
                self.store.record_search(topic, RECOMMENDED_ARTICLES);

                let save = self.prompt("\n¿Deseas guardar alguno de estos artículos? (s/n): ")?;
                if save.trim().eq_ignore_ascii_case("s") {
                    self.save_article_flow()?;
                }
            },
            Err(e) => {
                self.writeln(&format!("\n❌ Error al buscar artículos: {e}"))?;
            },
        }
        Ok(())
    }

    /// Option 2: structured summary of pasted content.
    ///
    /// Content is read line by line until an empty line.
    fn summarize_content(&mut self) -> Result<()> {
        self.writeln("\n📝 Pega el contenido a resumir (línea vacía para terminar):")?;
        let content = self.read_multiline()?;
        if content.trim().is_empty() {
            self.writeln("❌ No se proporcionó contenido.")?;
            return Ok(());
        }

        self.writeln("\n⏳ Generando resumen...")?;
        match self.service.summarize(&content) {
            Ok(summary) => {
                self.writeln("\n📋 RESUMEN ESTRUCTURADO:\n")?;
                self.writeln(&summary)?;
            },
            Err(e) => {
                self.writeln(&format!("\n❌ Error al generar el resumen: {e}"))?;
            },
        }
        Ok(())
    }

    /// Option 3 (also reached from option 1): manual article entry.
    ///
    /// Returns the new id, or `None` when the user aborted with an empty
    /// title.
    fn save_article_flow(&mut self) -> Result<Option<u64>> {
        let title = self.prompt("\n💾 Título del artículo: ")?;
        let title = title.trim().to_string();
        if title.is_empty() {
            self.writeln("❌ El título no puede estar vacío.")?;
            return Ok(None);
        }

        let summary = self.prompt("Resumen: ")?;
        let tags_line = self.prompt("Etiquetas (separadas por comas): ")?;
        let tags: Vec<String> = tags_line
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let url_line = self.prompt("URL (opcional, Enter para omitir): ")?;
        let url = {
            let trimmed = url_line.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        let id = self
            .store
            .save_article(title, summary.trim().to_string(), tags, url);
        self.writeln(&format!("\n✅ Artículo guardado con ID {id}"))?;
        Ok(Some(id))
    }

    /// Option 4: list every saved article.
    fn show_articles(&mut self) -> Result<()> {
        let articles = self.store.list_articles().to_vec();
        if articles.is_empty() {
            self.writeln("\n📭 No hay artículos guardados todavía.")?;
            return Ok(());
        }

        self.writeln(&format!("\n📚 ARTÍCULOS GUARDADOS ({}):", articles.len()))?;
        for article in &articles {
            self.print_article(article)?;
        }
        Ok(())
    }

    /// Option 5: filter articles by tag.
    fn search_by_tag(&mut self) -> Result<()> {
        let tag = self.prompt("\n🏷️  Etiqueta a buscar: ")?;
        let tag = tag.trim();
        if tag.is_empty() {
            self.writeln("❌ La etiqueta no puede estar vacía.")?;
            return Ok(());
        }

        let matches = self.store.find_by_tag(tag);
        if matches.is_empty() {
            self.writeln(&format!(
                "\n📭 No se encontraron artículos con la etiqueta '{tag}'."
            ))?;
            return Ok(());
        }

        self.writeln(&format!(
            "\n📚 Artículos con la etiqueta '{tag}' ({}):",
            matches.len()
        ))?;
        for article in &matches {
            self.print_article(article)?;
        }
        Ok(())
    }

    /// Option 6: Markdown export.
    fn export_collection(&mut self) -> Result<()> {
        let articles = self.store.list_articles().to_vec();
        match export::export_markdown(&articles, &self.export_path) {
            Ok(path) => {
                self.writeln(&format!(
                    "\n✅ Colección exportada a: {}",
                    path.display()
                ))?;
            },
            Err(Error::InvalidInput(_)) => {
                self.writeln("\n📭 No hay artículos para exportar.")?;
            },
            Err(e) => {
                self.writeln(&format!("\n❌ Error al exportar: {e}"))?;
            },
        }
        Ok(())
    }

    /// Option 7: usage counters.
    fn show_stats(&mut self) -> Result<()> {
        let stats = self.store.stats();
        let unique_tags = self.store.list_tags().len();

        self.writeln("\n📊 ESTADÍSTICAS DE USO")?;
        self.writeln(&format!(
            "   Búsquedas realizadas: {}",
            stats.total_searches
        ))?;
        self.writeln(&format!(
            "   Artículos guardados: {}",
            stats.total_articles_saved
        ))?;
        self.writeln(&format!("   Etiquetas únicas: {unique_tags}"))?;
        Ok(())
    }

    /// Option 8: the most recent searches.
    fn show_history(&mut self) -> Result<()> {
        let records = self.store.list_history(DEFAULT_HISTORY_LIMIT).to_vec();
        if records.is_empty() {
            self.writeln("\n📭 No hay búsquedas registradas.")?;
            return Ok(());
        }

        self.writeln(&format!(
            "\n🕒 ÚLTIMAS BÚSQUEDAS ({}):",
            records.len()
        ))?;
        for record in &records {
            self.writeln(&format!(
                "   [{}] '{}' ({} resultados)",
                record.timestamp, record.query, record.result_count
            ))?;
        }
        Ok(())
    }

    fn print_article(&mut self, article: &Article) -> Result<()> {
        self.writeln(&format!("\n   #{} — {}", article.id, article.title))?;
        self.writeln(&format!("   Guardado: {}", article.saved_at))?;
        if let Some(url) = &article.url {
            self.writeln(&format!("   URL: {url}"))?;
        }
        if !article.summary.is_empty() {
            self.writeln(&format!("   Resumen: {}", article.summary))?;
        }
        if !article.tags.is_empty() {
            self.writeln(&format!("   Etiquetas: {}", article.tags.join(", ")))?;
        }
        Ok(())
    }

    /// Prints `text` as a prompt (no newline) and reads one line.
    ///
    /// EOF reads as an empty answer so in-flight flows fall through their
    /// empty-input branches.
    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.out, "{text}").map_err(write_error)?;
        self.out.flush().map_err(write_error)?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Reads one line without its trailing newline; `None` on EOF.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| Error::OperationFailed {
                operation: "read_input".to_string(),
                cause: e.to_string(),
            })?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Reads lines until an empty line or EOF, joined by newlines.
    fn read_multiline(&mut self) -> Result<String> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| Error::OperationFailed {
                    operation: "read_input".to_string(),
                    cause: e.to_string(),
                })?;
            let line = line.trim_end_matches(['\r', '\n']);
            if read == 0 || line.is_empty() {
                break;
            }
            lines.push(line.to_string());
        }
        Ok(lines.join("\n"))
    }

    fn writeln(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}").map_err(write_error)
    }
}

fn write_error(e: std::io::Error) -> Error {
    Error::OperationFailed {
        operation: "write_output".to_string(),
        cause: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct EchoProvider;

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn complete(&self, prompt: &str) -> Result<String> {
            Ok(format!("RESPUESTA: {prompt}"))
        }
    }

    struct FailingProvider;

    impl LlmProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn complete(&self, _prompt: &str) -> Result<String> {
            Err(Error::OperationFailed {
                operation: "llm_request".to_string(),
                cause: "service unavailable".to_string(),
            })
        }
    }

    fn run_session(dir: &TempDir, provider: impl LlmProvider + 'static, input: &str) -> String {
        let store = MemoryStore::open(dir.path().join("mem.json"));
        let service = CuratorService::new(provider);
        let mut out = Vec::new();
        let export_path = dir.path().join("out.md");

        {
            let mut menu = Menu::new(
                Cursor::new(input.as_bytes().to_vec()),
                &mut out,
                store,
                service,
                export_path,
            );
            menu.run().unwrap();
        }

        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_exit_immediately() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, EchoProvider, "9\n");
        assert!(output.contains("MENÚ PRINCIPAL"));
        assert!(output.contains("Hasta luego"));
    }

    #[test]
    fn test_eof_ends_session() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, EchoProvider, "");
        assert!(output.contains("MENÚ PRINCIPAL"));
    }

    #[test]
    fn test_invalid_option_reprints_menu() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, EchoProvider, "42\n9\n");
        assert!(output.contains("Opción no válida: '42'"));
        assert!(output.contains("Hasta luego"));
    }

    #[test]
    fn test_search_records_history() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, EchoProvider, "1\nrust async\nn\n8\n9\n");

        assert!(output.contains("Recomendaciones sobre 'rust async'"));
        assert!(output.contains("ÚLTIMAS BÚSQUEDAS (1)"));
        assert!(output.contains("'rust async' (5 resultados)"));
    }

    #[test]
    fn test_search_with_empty_topic_is_rejected() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, EchoProvider, "1\n   \n9\n");
        assert!(output.contains("El tema no puede estar vacío"));
    }

    #[test]
    fn test_search_failure_is_reported_and_not_recorded() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, FailingProvider, "1\nrust\n8\n9\n");

        assert!(output.contains("Error al buscar artículos"));
        assert!(output.contains("No hay búsquedas registradas"));
    }

    #[test]
    fn test_summarize_multiline_content() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, EchoProvider, "2\nline one\nline two\n\n9\n");

        assert!(output.contains("RESUMEN ESTRUCTURADO"));
        assert!(output.contains("line one\nline two"));
    }

    #[test]
    fn test_save_and_list_article() {
        let dir = TempDir::new().unwrap();
        let output = run_session(
            &dir,
            EchoProvider,
            "3\nPin and Unpin\nAbout pinning\nrust, async\n\n4\n9\n",
        );

        assert!(output.contains("Artículo guardado con ID 1"));
        assert!(output.contains("ARTÍCULOS GUARDADOS (1)"));
        assert!(output.contains("#1 — Pin and Unpin"));
        assert!(output.contains("Etiquetas: rust, async"));
    }

    #[test]
    fn test_save_aborts_on_empty_title() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, EchoProvider, "3\n\n4\n9\n");

        assert!(output.contains("El título no puede estar vacío"));
        assert!(output.contains("No hay artículos guardados"));
    }

    #[test]
    fn test_search_by_tag_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let output = run_session(
            &dir,
            EchoProvider,
            "3\nTokio internals\nRuntime\nRust\nhttps://example.com\n5\nrust\n9\n",
        );

        assert!(output.contains("Artículos con la etiqueta 'rust' (1)"));
        assert!(output.contains("URL: https://example.com"));
    }

    #[test]
    fn test_export_empty_collection_message() {
        let dir = TempDir::new().unwrap();
        let output = run_session(&dir, EchoProvider, "6\n9\n");
        assert!(output.contains("No hay artículos para exportar"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let output = run_session(
            &dir,
            EchoProvider,
            "3\nExported article\nBody\ntag\n\n6\n9\n",
        );

        assert!(output.contains("Colección exportada a"));
        assert!(dir.path().join("out.md").exists());
    }

    #[test]
    fn test_stats_reflect_activity() {
        let dir = TempDir::new().unwrap();
        let output = run_session(
            &dir,
            EchoProvider,
            "1\nwasm\nn\n3\nTitle\nSummary\ntag\n\n7\n9\n",
        );

        assert!(output.contains("Búsquedas realizadas: 1"));
        assert!(output.contains("Artículos guardados: 1"));
        assert!(output.contains("Etiquetas únicas: 1"));
    }
}
