//! REST API front-end.
//!
//! A thin axum layer over [`MemoryStore`] and [`CuratorService`]: each route
//! maps 1:1 onto a store or service operation, validates input shape, and
//! translates outcomes into HTTP responses. Paths and JSON keys are the
//! Spanish wire surface this service has always exposed; changing them would
//! break existing clients.

use crate::curator::{CuratorService, RECOMMENDED_ARTICLES};
use crate::models::Article;
use crate::store::{DEFAULT_HISTORY_LIMIT, MemoryStore};
use crate::{Error, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state, constructed once at startup and injected into
/// every handler. No module-level singletons.
#[derive(Clone)]
pub struct AppState {
    /// The persistent store, serialized behind a mutex for the server's
    /// worker pool. In-process only; not a cross-process file lock.
    store: Arc<Mutex<MemoryStore>>,
    /// The recommendation/summary service.
    service: CuratorService,
}

impl AppState {
    /// Creates the application state.
    #[must_use]
    pub fn new(store: MemoryStore, service: CuratorService) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            service,
        }
    }

    /// Locks the store, recovering from a poisoned mutex.
    fn store(&self) -> MutexGuard<'_, MemoryStore> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Handler error: carries a status and a detail message.
///
/// Not-found maps to 404; everything else is a 500 with the error's message
/// as the detail string.
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Current timestamp for `fecha` response fields.
fn now_iso() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Runs a blocking closure on the blocking pool.
///
/// LLM calls use a blocking HTTP client and can take many seconds; they must
/// not run on the async worker threads.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "spawn_blocking".to_string(),
            cause: e.to_string(),
        })?
}

/// Body of `POST /buscar`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Topic to search.
    pub tema: String,
}

/// Body of `POST /resumir`.
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    /// Content to summarize.
    pub contenido: String,
}

/// Body of `POST /articulos`.
#[derive(Debug, Deserialize)]
pub struct ArticleRequest {
    /// Article title.
    pub titulo: String,
    /// Article summary.
    pub resumen: String,
    /// Article tags.
    pub etiquetas: Vec<String>,
    /// Optional source URL.
    pub url: Option<String>,
}

/// Query parameters of `GET /historial`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of records to return.
    pub limite: Option<usize>,
}

/// Response of `GET /estadisticas`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Current search-history length.
    pub total_busquedas: u64,
    /// Current saved-article count.
    pub total_articulos_guardados: u64,
    /// Number of distinct tags in the index.
    pub etiquetas_unicas: usize,
}

/// Builds the REST router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/buscar", post(search))
        .route("/resumir", post(summarize))
        .route("/articulos", post(create_article).get(list_articles))
        .route("/articulos/etiqueta/{etiqueta}", get(articles_by_tag))
        .route("/articulos/{id}", delete(delete_article))
        .route("/etiquetas", get(list_tags))
        .route("/estadisticas", get(stats))
        .route("/historial", get(history).delete(clear_history))
        .route("/historial/{index}", delete(delete_search))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds and serves the REST API.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "bind".to_string(),
            cause: e.to_string(),
        })?;

    tracing::info!(%addr, "Starting curator REST API");

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "serve".to_string(),
            cause: e.to_string(),
        })
}

/// `GET /` — service banner.
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "mensaje": "Bienvenido a la API del Agente Curador",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /buscar` — article recommendations for a topic.
///
/// The search is recorded into the history only after a successful
/// provider call.
async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let service = state.service.clone();
    let topic = request.tema.clone();
    let results = run_blocking(move || service.recommend(&topic)).await?;

    state
        .store()
        .record_search(request.tema.clone(), RECOMMENDED_ARTICLES);

    Ok(Json(json!({
        "exito": true,
        "tema": request.tema,
        "resultados": results,
        "fecha": now_iso(),
    })))
}

/// `POST /resumir` — structured summary of pasted content.
async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let service = state.service.clone();
    let summary = run_blocking(move || service.summarize(&request.contenido)).await?;

    Ok(Json(json!({
        "exito": true,
        "resumen": summary,
        "fecha": now_iso(),
    })))
}

/// `POST /articulos` — save a new article.
async fn create_article(
    State(state): State<AppState>,
    Json(request): Json<ArticleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if request.titulo.trim().is_empty() {
        return Err(Error::InvalidInput("titulo must not be empty".to_string()).into());
    }

    let id = state.store().save_article(
        request.titulo,
        request.resumen,
        request.etiquetas,
        request.url,
    );

    Ok(Json(json!({
        "exito": true,
        "id": id,
        "mensaje": "Artículo guardado exitosamente",
        "fecha": now_iso(),
    })))
}

/// `GET /articulos` — all saved articles.
async fn list_articles(State(state): State<AppState>) -> Json<Vec<Article>> {
    Json(state.store().list_articles().to_vec())
}

/// `GET /articulos/etiqueta/{etiqueta}` — articles carrying a tag.
///
/// 404 when no article matches.
async fn articles_by_tag(
    State(state): State<AppState>,
    Path(etiqueta): Path<String>,
) -> ApiResult<Json<Vec<Article>>> {
    let matches = state.store().find_by_tag(&etiqueta);

    if matches.is_empty() {
        return Err(Error::NotFound(format!(
            "No se encontraron artículos con la etiqueta '{etiqueta}'"
        ))
        .into());
    }

    Ok(Json(matches))
}

/// `DELETE /articulos/{id}` — delete an article by id.
///
/// The store itself treats an unknown id as a no-op success; the HTTP layer
/// translates zero removals into a 404.
async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<serde_json::Value>> {
    let removed = state.store().delete_article(id);

    if removed == 0 {
        return Err(Error::NotFound("Artículo no encontrado".to_string()).into());
    }

    Ok(Json(json!({
        "exito": true,
        "mensaje": "Artículo eliminado correctamente",
    })))
}

/// `GET /etiquetas` — the tag index.
async fn list_tags(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = state.store();
    let tags = store.list_tags().to_vec();
    let total = tags.len();
    Json(json!({ "etiquetas": tags, "total": total }))
}

/// `GET /estadisticas` — usage counters.
async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.store();
    let stats = store.stats();

    Json(StatsResponse {
        total_busquedas: stats.total_searches,
        total_articulos_guardados: stats.total_articles_saved,
        etiquetas_unicas: store.list_tags().len(),
    })
}

/// `GET /historial?limite=10` — the most recent search records.
async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<serde_json::Value> {
    let limit = params.limite.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let store = state.store();
    let records = store.list_history(limit).to_vec();
    let total = records.len();

    Json(json!({ "historial": records, "total": total }))
}

/// `DELETE /historial/{index}` — delete one history entry by position.
async fn delete_search(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.store().delete_search(index) {
        return Err(Error::NotFound("Búsqueda no encontrada".to_string()).into());
    }

    Ok(Json(json!({
        "exito": true,
        "mensaje": "Búsqueda eliminada correctamente",
    })))
}

/// `DELETE /historial` — clear the whole history.
async fn clear_history(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.store().clear_history();

    Json(json!({
        "exito": true,
        "mensaje": "Historial limpiado correctamente",
    }))
}

/// `GET /health` — liveness probe.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let saved = state.store().list_articles().len();

    Json(json!({
        "estado": "operativo",
        "timestamp": now_iso(),
        "articulos_guardados": saved,
    }))
}
