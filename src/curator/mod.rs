//! Recommendation and summary service.
//!
//! Two request/response operations, each a single call to the configured LLM
//! provider with a fixed, parameterized prompt. The provider's raw text is
//! returned as-is: the numbered-list structure the prompts ask for is a
//! prompt instruction only and is never parsed or validated here.

use crate::llm::LlmProvider;
use crate::{Error, Result};
use std::sync::Arc;

/// Number of articles the recommendation prompt asks for.
///
/// Also the `result_count` recorded into the search history by the
/// front-ends after a successful recommendation.
pub const RECOMMENDED_ARTICLES: u32 = 5;

/// Builds the recommendation prompt for a topic.
fn recommend_prompt(topic: &str) -> String {
    format!(
        r"Eres un experto curador de contenido técnico.

Genera una lista de {RECOMMENDED_ARTICLES} artículos técnicos recomendados sobre: {topic}

Para cada artículo proporciona:
- Título sugerido
- Breve descripción (2-3 líneas)
- Conceptos clave
- Nivel de dificultad (Principiante/Intermedio/Avanzado)
- 2-3 etiquetas relevantes

Formato de respuesta:
ARTÍCULO 1:
Título: [título]
Descripción: [descripción]
Conceptos: [conceptos separados por comas]
Nivel: [nivel]
Etiquetas: [etiquetas separadas por comas]

[Repite para los {RECOMMENDED_ARTICLES} artículos]"
    )
}

/// Builds the structured-summary prompt for a block of content.
fn summarize_prompt(content: &str) -> String {
    format!(
        r"Analiza el siguiente contenido técnico y genera un resumen estructurado:

CONTENIDO:
{content}

Proporciona:
1. Resumen ejecutivo (3-4 líneas)
2. Puntos clave (máximo 5 puntos)
3. Tecnologías mencionadas
4. Público objetivo
5. 3-5 etiquetas descriptivas

Formato estructurado y claro."
    )
}

/// Service that delegates recommendation and summary requests to an LLM
/// provider.
#[derive(Clone)]
pub struct CuratorService {
    /// The configured provider.
    provider: Arc<dyn LlmProvider>,
}

impl CuratorService {
    /// Creates a service over the given provider.
    pub fn new(provider: impl LlmProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Creates a service over an already-shared provider.
    #[must_use]
    pub const fn with_provider(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Returns the name of the underlying provider.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Asks the provider for a list of recommended articles about `topic`.
    ///
    /// Returns the provider's raw text response. Provider failures are
    /// wrapped into a generic error carrying the provider's message.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty topic; `OperationFailed` on any provider
    /// failure.
    pub fn recommend(&self, topic: &str) -> Result<String> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::InvalidInput("topic must not be empty".to_string()));
        }

        tracing::debug!(topic, "Requesting article recommendations");
        self.provider
            .complete(&recommend_prompt(topic))
            .map_err(|e| Error::OperationFailed {
                operation: "recommend".to_string(),
                cause: e.to_string(),
            })
    }

    /// Asks the provider for a structured summary of `content`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for empty content; `OperationFailed` on any provider
    /// failure.
    pub fn summarize(&self, content: &str) -> Result<String> {
        if content.trim().is_empty() {
            return Err(Error::InvalidInput(
                "content must not be empty".to_string(),
            ));
        }

        tracing::debug!(bytes = content.len(), "Requesting content summary");
        self.provider
            .complete(&summarize_prompt(content))
            .map_err(|e| Error::OperationFailed {
                operation: "summarize".to_string(),
                cause: e.to_string(),
            })
    }
}
