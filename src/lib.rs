//! mintytag library - self-hosted audio tag editor
//!
//! A single-binary web service: the browser UI is compiled in and served by
//! axum, while the editing session (the row store) lives in memory on the
//! server. Every discrete user action maps to one HTTP route.

use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub mod api;
pub mod config;
pub mod csv;
pub mod error;
pub mod store;
pub mod tags;

pub use config::Config;
pub use error::{Error, Result};

/// A retagged file held for browser download when no directory write happened
#[derive(Debug, Clone)]
pub struct StagedDownload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The editing session: ordered rows with dirty/selection flags
    pub store: Arc<RwLock<store::RowStore>>,
    /// Save-pass fallback output, keyed by row id
    pub downloads: Arc<RwLock<HashMap<Uuid, StagedDownload>>>,
}

impl AppState {
    /// Create new application state with an empty session
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(RwLock::new(store::RowStore::new())),
            downloads: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, patch, post, put};

    let api = Router::new()
        .route("/api/files", post(api::add_files))
        .route("/api/files/scan", post(api::scan_folder))
        .route("/api/rows", get(api::list_rows))
        .route("/api/rows/:id", patch(api::edit_field))
        .route("/api/rows/:id/selected", put(api::set_selected))
        .route("/api/rows/:id/artwork", put(api::set_row_artwork))
        .route("/api/rows/:id/picture", get(api::get_picture))
        .route("/api/batch", post(api::apply_batch))
        .route("/api/export.csv", get(api::export_csv))
        .route("/api/import", post(api::import_csv))
        .route("/api/save", post(api::save_dirty))
        .route("/api/download/:id", get(api::download))
        .route("/api/clear", post(api::clear_all));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
