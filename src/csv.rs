//! CSV codec for tag export/import
//!
//! Fixed column order `filename,title,artist,album,track,year,genre,comment`
//! with RFC4180-like quoting. The decoder is a small hand-rolled character
//! scanner: it tolerates reordered and missing columns, treats `\r` like `\n`,
//! and closes an unterminated quoted cell implicitly at end of input (malformed
//! quoting is accepted, not rejected).

use crate::store::{CsvUpdate, Row, FIELDS};
use std::collections::HashMap;

/// Canonical header, filename first
pub const COLUMNS: [&str; 8] = [
    "filename", "title", "artist", "album", "track", "year", "genre", "comment",
];

/// Fixed export filename offered to the browser
pub const EXPORT_FILENAME: &str = "mintytag-export.csv";

/// Encode the row set: header line plus one line per row, `\n`-joined
pub fn encode(rows: &[Row]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(COLUMNS.join(","));
    for row in rows {
        let mut cells = Vec::with_capacity(COLUMNS.len());
        cells.push(escape(&row.filename));
        for field in FIELDS {
            cells.push(escape(row.fields.get(field)));
        }
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

/// Quote a value only when it contains a comma, quote, or newline
fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Decode CSV text into field-update records keyed by filename.
///
/// The first row is the header; names are matched trimmed and
/// case-insensitively. Columns may appear in any order; absent columns yield
/// empty strings (the import step treats empty as "no update"). Input without
/// a header row decodes to no updates.
pub fn decode(text: &str) -> Vec<CsvUpdate> {
    let mut raw = scan(text);
    if raw.is_empty() {
        return Vec::new();
    }
    let header = raw.remove(0);
    let index: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_lowercase(), i))
        .collect();

    let cell = |cells: &[String], name: &str| {
        index
            .get(name)
            .and_then(|&i| cells.get(i))
            .cloned()
            .unwrap_or_default()
    };

    raw.iter()
        .filter(|cells| !cells.is_empty())
        .map(|cells| {
            let mut update = CsvUpdate {
                filename: cell(cells, "filename"),
                ..Default::default()
            };
            for field in FIELDS {
                update.fields.set(field, cell(cells, field.name()));
            }
            update
        })
        .collect()
}

/// Character scanner with two states: inside or outside a quoted region
fn scan(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    // Doubled quote is a literal quote
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == ',' {
            row.push(std::mem::take(&mut cell));
        } else if c == '\n' || c == '\r' {
            // Only a non-empty row ends here; tolerates \r\n and blank lines
            if !cell.is_empty() || !row.is_empty() {
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
        } else {
            cell.push(c);
        }
    }
    // Flush whatever is pending; an unterminated quote closes implicitly here
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RowStore, TagFields};
    use std::path::PathBuf;

    fn store_row(filename: &str, fields: TagFields) -> RowStore {
        let mut store = RowStore::new();
        store.add_row(
            PathBuf::from(format!("/music/{filename}")),
            filename.to_string(),
            Vec::new(),
            "mp3".to_string(),
            fields,
            None,
        );
        store
    }

    #[test]
    fn encode_plain_values_unquoted() {
        let store = store_row(
            "song.mp3",
            TagFields {
                title: "Plain".into(),
                artist: "Someone".into(),
                ..Default::default()
            },
        );
        let csv = encode(store.rows());
        assert_eq!(
            csv,
            "filename,title,artist,album,track,year,genre,comment\n\
             song.mp3,Plain,Someone,,,,,"
        );
    }

    #[test]
    fn round_trip_plain_values() {
        let store = store_row(
            "song.mp3",
            TagFields {
                title: "Plain".into(),
                year: "1999".into(),
                ..Default::default()
            },
        );
        let updates = decode(&encode(store.rows()));
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].filename, "song.mp3");
        assert_eq!(updates[0].fields, store.rows()[0].fields);
    }

    #[test]
    fn round_trip_special_characters() {
        let store = store_row(
            "weird, name.mp3",
            TagFields {
                title: "Say \"Hello\"".into(),
                artist: "A, B & C".into(),
                comment: "line one\nline two".into(),
                ..Default::default()
            },
        );
        let updates = decode(&encode(store.rows()));
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].filename, "weird, name.mp3");
        assert_eq!(updates[0].fields, store.rows()[0].fields);
    }

    #[test]
    fn decode_quoted_title_with_comma() {
        let updates = decode("filename,title\nsong.mp3,\"Hello, World\"");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].filename, "song.mp3");
        assert_eq!(updates[0].fields.title, "Hello, World");
        assert_eq!(updates[0].fields.artist, "");
        assert_eq!(updates[0].fields.comment, "");
    }

    #[test]
    fn decode_reordered_columns() {
        let updates = decode("artist,filename,title\nThe Band,song.mp3,The Song");
        assert_eq!(updates[0].filename, "song.mp3");
        assert_eq!(updates[0].fields.title, "The Song");
        assert_eq!(updates[0].fields.artist, "The Band");
    }

    #[test]
    fn decode_missing_columns_yield_empty_strings() {
        let updates = decode("filename,genre\na.mp3,Jazz\nb.mp3,Rock");
        assert_eq!(updates.len(), 2);
        for update in &updates {
            assert_eq!(update.fields.title, "");
            assert_eq!(update.fields.year, "");
        }
        assert_eq!(updates[0].fields.genre, "Jazz");
        assert_eq!(updates[1].fields.genre, "Rock");
    }

    #[test]
    fn decode_header_names_trimmed_case_insensitive() {
        let updates = decode("Filename , TITLE\nsong.mp3,Loud");
        assert_eq!(updates[0].filename, "song.mp3");
        assert_eq!(updates[0].fields.title, "Loud");
    }

    #[test]
    fn decode_tolerates_crlf_and_trailing_blank_lines() {
        let updates = decode("filename,title\r\na.mp3,One\r\nb.mp3,Two\n\n");
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].fields.title, "One");
        assert_eq!(updates[1].fields.title, "Two");
    }

    #[test]
    fn decode_unterminated_quote_closes_at_end_of_input() {
        // Known looseness, preserved: no error, the open quote just ends
        let updates = decode("filename,title\nsong.mp3,\"never closed");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].fields.title, "never closed");
    }

    #[test]
    fn decode_quoted_newline_does_not_split_row() {
        let updates = decode("filename,comment\nsong.mp3,\"first\nsecond\"");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].fields.comment, "first\nsecond");
    }

    #[test]
    fn decode_empty_input() {
        assert!(decode("").is_empty());
        assert!(decode("\n\n").is_empty());
    }
}
