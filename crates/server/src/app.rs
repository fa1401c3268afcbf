//! HTTP routes around the cleaning pipeline.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use plainpage_core::{
    CleanOptions, CleanReport, ContentGenerator, DirectoryIndexer, Document, KnowledgeConfig, KnowledgeDocument,
    Locator, PlainpageError, Signatures, SimplifyConfig, Simplified, SpliceBase, SpliceConfig,
    canonical_url, clean_document, extract_main_content, knowledge_document, prompt_html, simplify_page,
};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Shared handler state.
pub struct AppState<G> {
    pub generator: G,
    pub signatures: Signatures,
    pub splice: SpliceConfig,
    pub knowledge: KnowledgeConfig,
    pub indexer: Option<DirectoryIndexer>,
}

impl<G> AppState<G> {
    pub fn new(generator: G, signatures: Signatures) -> Self {
        Self {
            generator,
            signatures,
            splice: SpliceConfig::default(),
            knowledge: KnowledgeConfig::default(),
            indexer: None,
        }
    }
}

/// A core error rendered as `{ "error": ... }` with a matching status.
#[derive(Debug)]
pub struct ApiError(PlainpageError);

impl From<PlainpageError> for ApiError {
    fn from(err: PlainpageError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PlainpageError::NotFound(_) => StatusCode::NOT_FOUND,
            PlainpageError::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlainpageError::Generator(_) | PlainpageError::HttpError(_) => StatusCode::BAD_GATEWAY,
            PlainpageError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, %status, "request failed");
        } else {
            tracing::warn!(error = %self.0, %status, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CleanRequest {
    pub html: String,
    #[serde(default)]
    pub options: CleanOptions,
}

#[derive(Debug, Serialize)]
pub struct CleanResponse {
    pub html: String,
    pub report: CleanReport,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub html: String,
    #[serde(default)]
    pub options: CleanOptions,
    /// Return the element as cleaned, without prompt compaction.
    #[serde(default)]
    pub raw: bool,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub html: String,
    pub canonical_url: Option<String>,
    pub locator: Locator,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeRequest {
    pub html: String,
    #[serde(default)]
    pub options: CleanOptions,
    pub max_chars: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct KnowledgeResponse {
    #[serde(flatten)]
    pub document: KnowledgeDocument,
    /// Id assigned by the indexer, when one is configured.
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimplifyRequest {
    pub html: String,
    #[serde(default)]
    pub options: CleanOptions,
    #[serde(default)]
    pub base: SpliceBase,
}

/// Builds the router with permissive CORS, request tracing, gzip and a
/// per-request timeout.
pub fn router<G>(state: AppState<G>, request_timeout: Duration) -> Router
where
    G: ContentGenerator + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/clean", post(clean::<G>))
        .route("/extract", post(extract::<G>))
        .route("/knowledge", post(knowledge::<G>))
        .route("/simplify", post(simplify::<G>))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn clean<G>(State(state): State<Arc<AppState<G>>>, Json(request): Json<CleanRequest>) -> Json<CleanResponse> {
    let doc = Document::parse(&request.html);
    let report = clean_document(&doc, &request.options, &state.signatures);
    Json(CleanResponse { html: doc.to_pretty_html(), report })
}

async fn extract<G>(
    State(state): State<Arc<AppState<G>>>, Json(request): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    let doc = Document::parse(&request.html);
    let canonical = canonical_url(&doc);
    clean_document(&doc, &request.options, &state.signatures);
    let main = extract_main_content(&doc);
    let html = if request.raw { main.html } else { prompt_html(&main.html) };
    Json(ExtractResponse { html, canonical_url: canonical, locator: main.locator })
}

fn prepare_knowledge<G>(state: &AppState<G>, request: &KnowledgeRequest) -> KnowledgeDocument {
    let doc = Document::parse(&request.html);
    clean_document(&doc, &request.options, &state.signatures);
    let mut config = state.knowledge.clone();
    if let Some(max_chars) = request.max_chars {
        config.max_chars = max_chars;
    }
    knowledge_document(&doc.to_pretty_html(), &config)
}

async fn knowledge<G>(
    State(state): State<Arc<AppState<G>>>, Json(request): Json<KnowledgeRequest>,
) -> Result<Json<KnowledgeResponse>, ApiError> {
    let document = prepare_knowledge(&state, &request);
    let id = match state.indexer.clone() {
        Some(indexer) => {
            let stored = document.clone();
            let id = tokio::task::spawn_blocking(move || indexer.store(&stored))
                .await
                .map_err(|e| PlainpageError::from(std::io::Error::other(e)))??;
            Some(id)
        }
        None => None,
    };
    Ok(Json(KnowledgeResponse { document, id }))
}

async fn simplify<G>(
    State(state): State<Arc<AppState<G>>>, Json(request): Json<SimplifyRequest>,
) -> Result<Json<Simplified>, ApiError>
where
    G: ContentGenerator + Send + Sync + 'static,
{
    let config = SimplifyConfig {
        clean: request.options,
        signatures: state.signatures.clone(),
        splice: state.splice.clone(),
        base: request.base,
    };
    let simplified = simplify_page(&request.html, &state.generator, &config).await?;
    tracing::info!(
        locator = ?simplified.locator,
        elements_removed = simplified.report.elements_removed(),
        "simplified page"
    );
    Ok(Json(simplified))
}
