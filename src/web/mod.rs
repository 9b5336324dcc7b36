//! The browser-facing side: one page, a few form endpoints, and the report download.

pub mod error;
pub mod handlers;
pub mod pages;
pub mod session;

use crate::config::AppConfig;
use crate::report::ReportGenerator;
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use session::{Session, SessionId, SessionState, SessionStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
    pub generator: Arc<dyn ReportGenerator>,
}

impl AppState {
    pub fn new(config: AppConfig, generator: Arc<dyn ReportGenerator>) -> Self {
        Self {
            sessions: SessionStore::new(config.session_idle_timeout, config.max_sessions),
            config: Arc::new(config),
            generator,
        }
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/credentials", post(handlers::update_credentials))
        .route("/report", post(handlers::generate_report))
        .route("/report/image", get(handlers::report_image))
        .route("/report/download", get(handlers::download_report))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
