//! File ingestion, row listing, and session clear
//!
//! Each accepted file is read and parsed in its own task, so rows land in the
//! store in completion order, not selection order. A metadata parse failure
//! never blocks row creation: the row is added with empty tags and a warning.

use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use super::{ApiError, RowView};
use crate::tags::{self, ParsedTags};
use crate::AppState;

/// Extensions accepted by the file filter
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["mp3", "flac", "m4a", "ogg", "wav"];

#[derive(Debug, Deserialize)]
pub struct AddFilesRequest {
    pub paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Folder to scan; defaults to the configured music folder
    pub folder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddFilesResponse {
    pub added: Vec<RowView>,
    /// Filtered out by extension
    pub rejected: Vec<String>,
    /// Accepted but unreadable
    pub failed: Vec<String>,
    pub dirty_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub rows: Vec<RowView>,
    pub dirty_count: usize,
}

/// POST /api/files
///
/// Add files by path. Non-audio extensions are rejected up front; everything
/// else is loaded and parsed concurrently.
pub async fn add_files(
    State(state): State<AppState>,
    Json(req): Json<AddFilesRequest>,
) -> Result<Json<AddFilesResponse>, ApiError> {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for path in req.paths {
        let path = PathBuf::from(path);
        match accepted_extension(&path) {
            Some(ext) => accepted.push((path, ext)),
            None => rejected.push(path.display().to_string()),
        }
    }

    let (added, failed) = ingest(&state, accepted).await;
    info!(
        added = added.len(),
        rejected = rejected.len(),
        failed = failed.len(),
        "Add files complete"
    );

    let dirty_count = state.store.read().await.dirty_count();
    Ok(Json(AddFilesResponse {
        added,
        rejected,
        failed,
        dirty_count,
    }))
}

/// POST /api/files/scan
///
/// Add every audio file at the top level of a folder. Non-audio entries are
/// skipped silently, matching the original folder picker.
pub async fn scan_folder(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<AddFilesResponse>, ApiError> {
    let folder = req
        .folder
        .map(PathBuf::from)
        .or_else(|| state.config.music_folder.clone())
        .ok_or_else(|| {
            ApiError::BadRequest("No folder given and no music_folder configured".to_string())
        })?;
    if !folder.is_dir() {
        return Err(ApiError::BadRequest(format!(
            "Not a folder: {}",
            folder.display()
        )));
    }

    let mut accepted = Vec::new();
    for entry in WalkDir::new(&folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if let Some(ext) = accepted_extension(&path) {
            accepted.push((path, ext));
        }
    }
    info!(folder = %folder.display(), files = accepted.len(), "Scanning folder");

    let (added, failed) = ingest(&state, accepted).await;
    let dirty_count = state.store.read().await.dirty_count();
    Ok(Json(AddFilesResponse {
        added,
        rejected: Vec::new(),
        failed,
        dirty_count,
    }))
}

/// GET /api/rows
pub async fn list_rows(State(state): State<AppState>) -> Json<RowsResponse> {
    let store = state.store.read().await;
    Json(RowsResponse {
        rows: store.rows().iter().map(RowView::from_row).collect(),
        dirty_count: store.dirty_count(),
    })
}

/// GET /api/rows/:id/picture
///
/// Serves the row's embedded art blob (the transient preview URL of the
/// original maps onto this route).
pub async fn get_picture(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Response, ApiError> {
    let store = state.store.read().await;
    let row = store
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("No row {id}")))?;
    let art = row
        .artwork
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Row has no artwork".to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, art.mime.clone())],
        art.data.clone(),
    )
        .into_response())
}

/// POST /api/clear
///
/// Destroy every row and any staged downloads
pub async fn clear_all(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut store = state.store.write().await;
    let cleared = store.rows().len();
    store.clear();
    state.downloads.write().await.clear();
    info!(cleared, "Cleared session");
    Json(serde_json::json!({ "cleared": cleared }))
}

/// Lowercased extension when it passes the audio filter
fn accepted_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    ACCEPTED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Load and parse the accepted files, one task per file
async fn ingest(state: &AppState, paths: Vec<(PathBuf, String)>) -> (Vec<RowView>, Vec<String>) {
    let tasks: Vec<_> = paths
        .into_iter()
        .map(|(path, ext)| {
            let state = state.clone();
            tokio::spawn(async move { load_one(state, path, ext).await })
        })
        .collect();

    let mut added = Vec::new();
    let mut failed = Vec::new();
    for result in futures::future::join_all(tasks).await {
        match result {
            Ok(Ok(view)) => added.push(view),
            Ok(Err(path)) => failed.push(path),
            Err(e) => warn!("File load task failed: {e}"),
        }
    }
    (added, failed)
}

/// Read one file and append its row. Returns the display path on read failure.
async fn load_one(state: AppState, path: PathBuf, ext: String) -> Result<RowView, String> {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return Err(path.display().to_string());
        }
    };

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    // Parse off the async thread; failure degrades to empty tags
    let parse_name = filename.clone();
    let (bytes, parsed) = match tokio::task::spawn_blocking(move || {
        let parsed = tags::parse_tags(&bytes);
        (bytes, parsed)
    })
    .await
    {
        Ok((bytes, Ok(parsed))) => (bytes, parsed),
        Ok((bytes, Err(e))) => {
            warn!("Metadata parse failed for {}: {}", parse_name, e);
            (bytes, ParsedTags::default())
        }
        Err(e) => {
            warn!("Parse task failed for {}: {}", parse_name, e);
            return Err(path.display().to_string());
        }
    };

    let mut store = state.store.write().await;
    let id = store.add_row(path, filename.clone(), bytes, ext, parsed.fields, parsed.artwork);
    store
        .get(id)
        .map(RowView::from_row)
        .ok_or(filename)
}
