//! Save pass: write retagged MP3s to a directory, or stage them for download
//!
//! Only MP3 rows are rewritten; other formats are skipped with a warning and
//! stay dirty. A per-file directory write failure falls back to a staged
//! download for that file, so no failure aborts the pass.

use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use super::ApiError;
use crate::store::{Artwork, TagFields};
use crate::tags;
use crate::{AppState, StagedDownload};

#[derive(Debug, Deserialize, Default)]
pub struct SaveRequest {
    /// Destination directory; falls back to the configured output folder,
    /// and to per-file downloads when neither is set
    pub output_dir: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WrittenFile {
    pub filename: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct StagedFile {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub written: Vec<WrittenFile>,
    pub downloads: Vec<StagedFile>,
    /// Non-MP3 rows (or failed tag builds); these remain dirty
    pub skipped: Vec<String>,
    pub dirty_count: usize,
}

struct SaveItem {
    id: Uuid,
    filename: String,
    ext: String,
    bytes: Vec<u8>,
    fields: TagFields,
    artwork: Option<Artwork>,
}

/// POST /api/save
pub async fn save_dirty(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let output_dir = req
        .output_dir
        .map(PathBuf::from)
        .or_else(|| state.config.output_folder.clone());

    let mut store = state.store.write().await;
    let items: Vec<SaveItem> = store
        .rows()
        .iter()
        .filter(|r| r.dirty)
        .map(|r| SaveItem {
            id: r.id,
            filename: r.filename.clone(),
            ext: r.ext.clone(),
            bytes: r.bytes.clone(),
            fields: r.fields.clone(),
            artwork: r.artwork.clone(),
        })
        .collect();

    if items.is_empty() {
        return Err(ApiError::BadRequest(
            "Nothing to save. Make some edits first.".to_string(),
        ));
    }

    let mut written = Vec::new();
    let mut downloads = Vec::new();
    let mut skipped = Vec::new();

    for item in items {
        if !tags::is_writable(&item.ext) {
            warn!("Write skipped for non-MP3: {}", item.filename);
            skipped.push(item.filename);
            continue;
        }

        let retagged = match tags::write_mp3(&item.bytes, &item.fields, item.artwork.as_ref()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Tag build failed for {}: {}", item.filename, e);
                skipped.push(item.filename);
                continue;
            }
        };
        let out_name = output_name(&item.filename);

        let mut delivered = false;
        if let Some(dir) = &output_dir {
            let dest = dir.join(&out_name);
            match tokio::fs::write(&dest, &retagged).await {
                Ok(()) => {
                    written.push(WrittenFile {
                        filename: out_name.clone(),
                        path: dest.display().to_string(),
                    });
                    delivered = true;
                }
                Err(e) => {
                    warn!(
                        "Write to {} failed, falling back to download: {}",
                        dest.display(),
                        e
                    );
                }
            }
        }
        if !delivered {
            state.downloads.write().await.insert(
                item.id,
                StagedDownload {
                    name: out_name.clone(),
                    bytes: retagged,
                },
            );
            downloads.push(StagedFile {
                filename: out_name,
                url: format!("/api/download/{}", item.id),
            });
        }

        // Delivered either way; the row is clean now
        store.mark_clean(item.id);
    }

    info!(
        written = written.len(),
        downloads = downloads.len(),
        skipped = skipped.len(),
        "Save pass complete"
    );
    Ok(Json(SaveResponse {
        written,
        downloads,
        skipped,
        dirty_count: store.dirty_count(),
    }))
}

/// GET /api/download/:id
///
/// Serve a staged retagged file as an attachment
pub async fn download(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Response, ApiError> {
    let downloads = state.downloads.read().await;
    let staged = downloads
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("No staged download for {id}")))?;
    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                // Header values must be ASCII; the UI uses the exact name
                // from the save response for the anchor download attribute
                format!("attachment; filename=\"{}\"", ascii_name(&staged.name)),
            ),
        ],
        staged.bytes.clone(),
    )
        .into_response())
}

/// Output naming convention for retagged files
fn output_name(filename: &str) -> String {
    let stem = if filename.to_lowercase().ends_with(".mp3") {
        &filename[..filename.len() - 4]
    } else {
        filename
    };
    format!("{stem} \u{2014} tagged.mp3")
}

fn ascii_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '-' })
        .collect()
}
