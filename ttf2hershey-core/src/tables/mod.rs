//! TrueType table parsers
//!
//! Each submodule reads one table (or, for the directory, the table list
//! itself) from a shared [`FontReader`](crate::parser::FontReader) and
//! restores the reader position when it is done.

pub mod cmap;
pub mod directory;
pub mod head;
pub mod loca;
pub mod maxp;

pub use cmap::{CharacterMap, EncodingRecord, Segment};
pub use directory::{TableDirectory, TableRecord, Tag};
pub use head::{HeadTable, LocaFormat, HEAD_MAGIC};
pub use loca::GlyphLocator;
