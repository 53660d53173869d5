//! HTTP surface of the notebook bridge.
//!
//! [`router`] exposes the save, analyze and result routes over a shared
//! [`AppState`]; [`app`] adds tracing, CORS and body-size layers from a
//! [`ServerConfig`]. Every route is also reachable under `/api`.

mod config;
mod error;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use notebridge_core::{
    AgentBackend, AgentGateway, AgentSessionManager, AnalysisOrchestrator, NotebookStateStore,
    ResultCache,
};

pub use config::{AllowedOrigins, ServerConfig};
pub use error::ApiError;

/// Notebook snapshots carry whole tables and sequences.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub notebooks: Arc<NotebookStateStore>,
    pub cache: Arc<ResultCache>,
    pub sessions: Arc<AgentSessionManager>,
    pub gateway: AgentGateway,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub notebook_log: Option<Arc<PathBuf>>,
    /// Orders the mirror write and agent forward of concurrent saves.
    save_effects: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(backend: Arc<dyn AgentBackend>) -> Self {
        let notebooks = Arc::new(NotebookStateStore::new());
        let cache = Arc::new(ResultCache::new());
        let sessions = Arc::new(AgentSessionManager::new(backend.clone()));
        let gateway = AgentGateway::new(backend);
        let orchestrator = Arc::new(AnalysisOrchestrator::new(
            notebooks.clone(),
            cache.clone(),
            sessions.clone(),
            gateway.clone(),
        ));
        Self {
            notebooks,
            cache,
            sessions,
            gateway,
            orchestrator,
            notebook_log: None,
            save_effects: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_notebook_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.notebook_log = Some(Arc::new(path.into()));
        self
    }
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(routes::health))
        .route("/notebook/save", post(routes::save_notebook))
        .route("/analyze", post(routes::analyze))
        .route(
            "/analysis/result",
            get(routes::read_result).post(routes::override_result),
        )
        .route("/agent/create", post(routes::create_agent))
}

pub fn router(state: AppState) -> Router {
    let api = routes().route("/letta/create", post(routes::create_agent));
    routes().nest("/api", api).with_state(state)
}

pub fn app(state: AppState, config: &ServerConfig) -> Router {
    router(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(config.cors_layer()),
        )
}
