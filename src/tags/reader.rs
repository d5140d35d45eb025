//! Metadata parse adapter
//!
//! Maps whatever tag format `lofty` finds in a byte buffer into the typed row
//! schema, with empty-string defaults for every absent field. A parse failure
//! is an error here; the ingestion path downgrades it to a warning and an
//! empty-tag row so it never blocks row creation.

use crate::error::{Error, Result};
use crate::store::{Artwork, TagFields};
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::io::Cursor;

/// Result of one metadata parse
#[derive(Debug, Default)]
pub struct ParsedTags {
    pub fields: TagFields,
    pub artwork: Option<Artwork>,
}

/// Parse tag fields and the first embedded picture from raw file bytes
pub fn parse_tags(bytes: &[u8]) -> Result<ParsedTags> {
    let tagged_file = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .map_err(|e| Error::Parse(e.to_string()))?
        .read()
        .map_err(|e| Error::Parse(e.to_string()))?;

    // ID3v2 preferred, falls back to whatever tag the file carries
    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return Ok(ParsedTags::default());
    };

    let mut fields = TagFields::default();
    if let Some(title) = tag.title() {
        fields.title = title.to_string();
    }
    if let Some(artist) = tag.artist() {
        fields.artist = artist.to_string();
    }
    if let Some(album) = tag.album() {
        fields.album = album.to_string();
    }
    if let Some(track) = tag.track() {
        fields.track = track.to_string();
    }
    if let Some(year) = tag.year() {
        fields.year = year.to_string();
    }
    if let Some(genre) = tag.genre() {
        fields.genre = genre.to_string();
    }
    if let Some(comment) = tag.comment() {
        fields.comment = comment.to_string();
    }

    let artwork = tag.pictures().first().map(|picture| Artwork {
        data: picture.data().to_vec(),
        mime: picture
            .mime_type()
            .map(|m| m.as_str())
            .unwrap_or("image/jpeg")
            .to_string(),
    });

    Ok(ParsedTags { fields, artwork })
}
