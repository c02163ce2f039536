//! Table directory (offset table) parsing and checksum validation

use crate::error::{FontError, Result};
use crate::parser::FontReader;
use std::collections::HashMap;
use std::fmt;

/// Four-byte table identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const HEAD: Tag = Tag(*b"head");
    pub const CMAP: Tag = Tag(*b"cmap");
    pub const GLYF: Tag = Tag(*b"glyf");
    pub const LOCA: Tag = Tag(*b"loca");
    pub const MAXP: Tag = Tag(*b"maxp");

    pub const fn new(bytes: &[u8; 4]) -> Self {
        Tag(*bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

/// Table directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    /// Table tag
    pub tag: Tag,
    /// Declared checksum
    pub checksum: u32,
    /// Offset from beginning of file
    pub offset: u32,
    /// Length of table in bytes
    pub length: u32,
}

impl TableRecord {
    /// Offset as a buffer index
    pub fn start(&self) -> usize {
        self.offset as usize
    }

    /// One past the last byte of the table
    pub fn end(&self) -> usize {
        self.offset as usize + self.length as usize
    }
}

/// Parsed table directory; immutable once built
#[derive(Debug, Clone)]
pub struct TableDirectory {
    /// sfnt version (0x00010000 or 'true' for TrueType outlines)
    pub scalar_type: u32,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
    tables: HashMap<Tag, TableRecord>,
    /// Tags in directory order
    order: Vec<Tag>,
}

impl TableDirectory {
    /// Parse the directory at the reader's current position and validate
    /// the checksum of every table except `head`.
    ///
    /// The reader is left just past the last directory entry.
    pub fn parse(reader: &mut FontReader<'_>) -> Result<Self> {
        let scalar_type = reader.read_u32()?;
        let num_tables = reader.read_u16()?;
        let search_range = reader.read_u16()?;
        let entry_selector = reader.read_u16()?;
        let range_shift = reader.read_u16()?;

        let mut tables = HashMap::with_capacity(num_tables as usize);
        let mut order = Vec::with_capacity(num_tables as usize);

        for _ in 0..num_tables {
            let record = TableRecord {
                tag: Tag(reader.read_tag()?),
                checksum: reader.read_u32()?,
                offset: reader.read_u32()?,
                length: reader.read_u32()?,
            };

            // head's checksum covers checkSumAdjustment, which is computed
            // over the whole file, so it cannot be validated in isolation.
            if record.tag != Tag::HEAD {
                let actual = table_checksum(reader, record.start(), record.length)?;
                if actual != record.checksum {
                    return Err(FontError::ChecksumMismatch {
                        tag: record.tag.to_string(),
                        expected: record.checksum,
                        actual,
                    });
                }
            }

            tracing::trace!(
                tag = %record.tag,
                offset = record.offset,
                length = record.length,
                "table directory entry"
            );
            if tables.insert(record.tag, record).is_none() {
                order.push(record.tag);
            }
        }

        Ok(Self {
            scalar_type,
            search_range,
            entry_selector,
            range_shift,
            tables,
            order,
        })
    }

    /// Look up a table
    pub fn get(&self, tag: Tag) -> Option<&TableRecord> {
        self.tables.get(&tag)
    }

    /// Look up a table that must be present
    pub fn require(&self, tag: Tag) -> Result<&TableRecord> {
        self.get(tag)
            .ok_or_else(|| FontError::MissingTable(tag.to_string()))
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    /// Records in directory order
    pub fn iter(&self) -> impl Iterator<Item = &TableRecord> + '_ {
        self.order.iter().filter_map(move |tag| self.tables.get(tag))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Wrapping sum of the `ceil(length / 4)` big-endian words at `offset`.
///
/// The last word may extend past `length`; it is read whole. The reader's
/// position is restored afterwards.
pub fn table_checksum(reader: &mut FontReader<'_>, offset: usize, length: u32) -> Result<u32> {
    let words = (length as usize + 3) / 4;
    reader.with_position(offset, |r| {
        let mut sum = 0u32;
        for _ in 0..words {
            sum = sum.wrapping_add(r.read_u32()?);
        }
        Ok(sum)
    })
}

/// Checksum of a table held as a standalone byte slice, zero-padded to a
/// multiple of four bytes.
pub fn checksum_bytes(bytes: &[u8]) -> u32 {
    bytes.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}
