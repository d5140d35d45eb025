//! Inline edits, selection, per-row artwork, and the batch editor

use axum::body::Bytes;
use axum::extract::{Path as UrlPath, State};
use axum::http::HeaderMap;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::ApiError;
use crate::store::{Artwork, Field, TagFields};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub field: Field,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub selected: bool,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    /// Empty values leave the corresponding field untouched
    #[serde(flatten)]
    pub fields: TagFields,
    /// Cover image applied to every selected row, base64-encoded
    pub artwork_b64: Option<String>,
    pub artwork_mime: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub dirty_count: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub applied: usize,
    pub dirty_count: usize,
}

/// PATCH /api/rows/:id
///
/// Set one field and mark the row dirty (one-way flag)
pub async fn edit_field(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let mut store = state.store.write().await;
    if !store.update_field(id, req.field, req.value) {
        return Err(ApiError::NotFound(format!("No row {id}")));
    }
    Ok(Json(MutationResponse {
        dirty_count: store.dirty_count(),
    }))
}

/// PUT /api/rows/:id/selected
pub async fn set_selected(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let mut store = state.store.write().await;
    if !store.set_selected(id, req.selected) {
        return Err(ApiError::NotFound(format!("No row {id}")));
    }
    Ok(Json(MutationResponse {
        dirty_count: store.dirty_count(),
    }))
}

/// PUT /api/rows/:id/artwork
///
/// Raw image bytes in the body; content type taken from the request header
pub async fn set_row_artwork(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MutationResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty image body".to_string()));
    }
    let mime = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();

    let mut store = state.store.write().await;
    if !store.set_artwork(
        id,
        Artwork {
            data: body.to_vec(),
            mime,
        },
    ) {
        return Err(ApiError::NotFound(format!("No row {id}")));
    }
    Ok(Json(MutationResponse {
        dirty_count: store.dirty_count(),
    }))
}

/// POST /api/batch
///
/// Apply the non-empty fields (and optional cover) to every selected row
pub async fn apply_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let artwork = match req.artwork_b64 {
        Some(b64) => {
            let data = base64::engine::general_purpose::STANDARD
                .decode(b64.as_bytes())
                .map_err(|e| ApiError::BadRequest(format!("Invalid artwork encoding: {e}")))?;
            Some(Artwork {
                data,
                mime: req.artwork_mime.unwrap_or_else(|| "image/jpeg".to_string()),
            })
        }
        None => None,
    };

    let mut store = state.store.write().await;
    let applied = store.apply_batch(&req.fields, artwork.as_ref());
    info!(applied, "Batch apply complete");
    Ok(Json(BatchResponse {
        applied,
        dirty_count: store.dirty_count(),
    }))
}
