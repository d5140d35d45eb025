//! HTTP API handlers
//!
//! One route per discrete user action: add files, edit, select, batch apply,
//! CSV import/export, save, clear.

pub mod csv_io;
pub mod edit;
pub mod files;
pub mod health;
pub mod save;
pub mod ui;

pub use csv_io::{export_csv, import_csv};
pub use edit::{apply_batch, edit_field, set_row_artwork, set_selected};
pub use files::{add_files, clear_all, get_picture, list_rows, scan_folder};
pub use health::health_routes;
pub use save::{download, save_dirty};
pub use ui::{serve_app_js, serve_index};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::store::Row;

/// API error responses, rendered as `{ "error": message }` JSON
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::NotFound(msg) => ApiError::NotFound(msg),
            crate::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// One row as the UI sees it
#[derive(Debug, Serialize)]
pub struct RowView {
    pub id: uuid::Uuid,
    pub filename: String,
    pub ext: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track: String,
    pub year: String,
    pub genre: String,
    pub comment: String,
    pub dirty: bool,
    pub selected: bool,
    /// Where the browser can fetch the embedded art, when present
    pub picture_url: Option<String>,
}

impl RowView {
    pub fn from_row(row: &Row) -> Self {
        RowView {
            id: row.id,
            filename: row.filename.clone(),
            ext: row.ext.clone(),
            title: row.fields.title.clone(),
            artist: row.fields.artist.clone(),
            album: row.fields.album.clone(),
            track: row.fields.track.clone(),
            year: row.fields.year.clone(),
            genre: row.fields.genre.clone(),
            comment: row.fields.comment.clone(),
            dirty: row.dirty,
            selected: row.selected,
            picture_url: row
                .artwork
                .as_ref()
                .map(|_| format!("/api/rows/{}/picture", row.id)),
        }
    }
}
