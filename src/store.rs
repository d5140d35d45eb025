//! Row store and dirty tracking
//!
//! The in-memory table behind the editing session. One `Row` per loaded audio
//! file, insertion ordered. All mutation goes through `RowStore` methods so the
//! dirty flag can never drift from the edits that caused it.
//!
//! Dirty is a one-way "touched" flag: editing a field back to its original
//! value does not clear it. Only a successful tag write (`mark_clean`) does.
//! The dirty count is derived by scanning, never incrementally tracked.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Opaque row identifier
pub type RowId = Uuid;

/// Editable tag field names, as they appear in the UI, the API, and CSV headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Artist,
    Album,
    Track,
    Year,
    Genre,
    Comment,
}

/// All editable fields in canonical (UI column) order
pub const FIELDS: [Field; 7] = [
    Field::Title,
    Field::Artist,
    Field::Album,
    Field::Track,
    Field::Year,
    Field::Genre,
    Field::Comment,
];

impl Field {
    /// Lowercase field name (matches CSV headers and API payloads)
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Track => "track",
            Field::Year => "year",
            Field::Genre => "genre",
            Field::Comment => "comment",
        }
    }

    /// Parse a (trimmed, case-insensitive) field name
    pub fn parse(name: &str) -> Option<Field> {
        FIELDS
            .iter()
            .copied()
            .find(|f| f.name() == name.trim().to_lowercase())
    }
}

/// The editable tag fields of one row.
///
/// Empty string means "unset" throughout: batch apply and CSV import skip
/// empty values, and the tag writer emits no frame for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagFields {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub track: String,
    pub year: String,
    pub genre: String,
    pub comment: String,
}

impl TagFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Artist => &self.artist,
            Field::Album => &self.album,
            Field::Track => &self.track,
            Field::Year => &self.year,
            Field::Genre => &self.genre,
            Field::Comment => &self.comment,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Title => self.title = value,
            Field::Artist => self.artist = value,
            Field::Album => self.album = value,
            Field::Track => self.track = value,
            Field::Year => self.year = value,
            Field::Genre => self.genre = value,
            Field::Comment => self.comment = value,
        }
    }
}

/// Embedded cover art
#[derive(Debug, Clone)]
pub struct Artwork {
    pub data: Vec<u8>,
    pub mime: String,
}

/// One loaded file and its editing state
#[derive(Debug, Clone)]
pub struct Row {
    pub id: RowId,
    /// Where the file was loaded from
    pub path: PathBuf,
    pub filename: String,
    /// Original file contents; the tag writer rebuilds from these
    pub bytes: Vec<u8>,
    /// Lowercased extension; only "mp3" is eligible for write-back
    pub ext: String,
    pub fields: TagFields,
    pub artwork: Option<Artwork>,
    pub dirty: bool,
    pub selected: bool,
}

/// A field-update record decoded from one CSV line, keyed by filename
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvUpdate {
    pub filename: String,
    pub fields: TagFields,
}

/// Ordered collection of rows for the current session
#[derive(Debug, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row for an accepted file. Called once per completed metadata
    /// parse, so row order is parse-completion order, not selection order.
    pub fn add_row(
        &mut self,
        path: PathBuf,
        filename: String,
        bytes: Vec<u8>,
        ext: String,
        fields: TagFields,
        artwork: Option<Artwork>,
    ) -> RowId {
        let id = Uuid::new_v4();
        self.rows.push(Row {
            id,
            path,
            filename,
            bytes,
            ext,
            fields,
            artwork,
            dirty: false,
            selected: false,
        });
        id
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    /// Set one field and mark the row dirty
    pub fn update_field(&mut self, id: RowId, field: Field, value: String) -> bool {
        match self.get_mut(id) {
            Some(row) => {
                row.fields.set(field, value);
                row.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn set_selected(&mut self, id: RowId, selected: bool) -> bool {
        match self.get_mut(id) {
            Some(row) => {
                row.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Replace the row's cover art (dropping any previous blob) and mark dirty
    pub fn set_artwork(&mut self, id: RowId, artwork: Artwork) -> bool {
        match self.get_mut(id) {
            Some(row) => {
                row.artwork = Some(artwork);
                row.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Clear the dirty flag after a successful write
    pub fn mark_clean(&mut self, id: RowId) {
        if let Some(row) = self.get_mut(id) {
            row.dirty = false;
        }
    }

    /// Count of dirty rows, recomputed by scan on every call
    pub fn dirty_count(&self) -> usize {
        self.rows.iter().filter(|r| r.dirty).count()
    }

    /// Drop every row (and with them the byte buffers and art blobs)
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Batch editor: overwrite each non-empty supplied field on every selected
    /// row, and replace art on every selected row when supplied. Unselected
    /// rows are never touched. No rollback on partial failure.
    pub fn apply_batch(&mut self, values: &TagFields, artwork: Option<&Artwork>) -> usize {
        let mut applied = 0;
        for row in self.rows.iter_mut().filter(|r| r.selected) {
            for field in FIELDS {
                let value = values.get(field);
                if !value.is_empty() {
                    row.fields.set(field, value.to_string());
                    row.dirty = true;
                }
            }
            if let Some(art) = artwork {
                row.artwork = Some(art.clone());
                row.dirty = true;
            }
            applied += 1;
        }
        applied
    }

    /// CSV import: match by exact filename, apply non-empty fields only
    /// (blank cells never erase existing tags), mark matched rows dirty.
    /// Returns the number of rows matched.
    pub fn apply_updates(&mut self, updates: &[CsvUpdate]) -> usize {
        let mut matched = 0;
        for update in updates {
            if let Some(row) = self.rows.iter_mut().find(|r| r.filename == update.filename) {
                for field in FIELDS {
                    let value = update.fields.get(field);
                    if !value.is_empty() {
                        row.fields.set(field, value.to_string());
                    }
                }
                row.dirty = true;
                matched += 1;
            }
        }
        matched
    }
}
