//! MP3 retag adapter
//!
//! Builds a fresh ID3v2.4 tag from the row's non-empty fields with the `id3`
//! crate, then prepends it to the original audio with any pre-existing ID3v2
//! block stripped. Frame construction is entirely delegated; the only binary
//! knowledge here is the 10-byte ID3v2 header layout needed to skip the old
//! tag.
//!
//! Only MP3 is eligible for write-back. Other formats stay read-only and keep
//! their dirty flag; the save pass logs and skips them.

use crate::error::{Error, Result};
use crate::store::{Artwork, TagFields};
use id3::frame::{Comment, Picture, PictureType};
use id3::{Frame, TagLike, Version};

/// Whether a row's extension is eligible for binary write-back
pub fn is_writable(ext: &str) -> bool {
    ext == "mp3"
}

/// Build the retagged file: new ID3v2.4 tag followed by the original audio
pub fn write_mp3(original: &[u8], fields: &TagFields, artwork: Option<&Artwork>) -> Result<Vec<u8>> {
    let mut tag = id3::Tag::new();

    if !fields.title.is_empty() {
        tag.set_title(fields.title.clone());
    }
    if !fields.artist.is_empty() {
        tag.set_artist(fields.artist.clone());
    }
    if !fields.album.is_empty() {
        tag.set_album(fields.album.clone());
    }
    if !fields.track.is_empty() {
        tag.add_frame(Frame::text("TRCK", fields.track.clone()));
    }
    if !fields.year.is_empty() {
        tag.add_frame(Frame::text("TDRC", fields.year.clone()));
    }
    if !fields.genre.is_empty() {
        tag.set_genre(fields.genre.clone());
    }
    if !fields.comment.is_empty() {
        tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: String::new(),
            text: fields.comment.clone(),
        });
    }
    if let Some(art) = artwork {
        tag.add_frame(Picture {
            mime_type: art.mime.clone(),
            picture_type: PictureType::CoverFront,
            description: "Cover".to_string(),
            data: art.data.clone(),
        });
    }

    let mut out = Vec::with_capacity(original.len() + 2048);
    tag.write_to(&mut out, Version::Id3v24)
        .map_err(|e| Error::TagWrite(e.to_string()))?;
    out.extend_from_slice(&original[existing_tag_len(original)..]);
    Ok(out)
}

/// Byte length of the ID3v2 block at the start of the buffer, 0 if none.
/// Header is "ID3", two version bytes, one flag byte, four synchsafe size
/// bytes; the size excludes the header and the optional footer.
fn existing_tag_len(bytes: &[u8]) -> usize {
    if bytes.len() < 10 || &bytes[..3] != b"ID3" {
        return 0;
    }
    let flags = bytes[5];
    let size = synchsafe(&bytes[6..10]);
    let footer = if flags & 0x10 != 0 { 10 } else { 0 };
    (10 + size + footer).min(bytes.len())
}

fn synchsafe(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .fold(0usize, |acc, &b| (acc << 7) | (b & 0x7f) as usize)
}
