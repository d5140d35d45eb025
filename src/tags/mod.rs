//! Adapters over the external tag collaborators
//!
//! Reading goes through `lofty` (handles ID3v1/v2, Vorbis, MP4, APE and
//! friends); write-back goes through the `id3` crate and is MP3-only. Both are
//! treated as black boxes: this crate maps their types into the row schema at
//! the boundary and never constructs tag frames by hand.

pub mod reader;
pub mod writer;

pub use reader::{parse_tags, ParsedTags};
pub use writer::{is_writable, write_mp3};
