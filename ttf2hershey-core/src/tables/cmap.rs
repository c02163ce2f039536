//! Character to glyph mapping (`cmap`, format 4)
//!
//! Only the segment-mapping subtable (format 4) of a Unicode-platform
//! (platform 0) encoding record is understood. Lookups are memoized per
//! character for the lifetime of the map.

use super::directory::TableRecord;
use crate::error::Result;
use crate::parser::FontReader;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Unicode platform
pub const PLATFORM_UNICODE: u16 = 0;

/// Segment mapping to delta values
pub const FORMAT_SEGMENT_MAPPING: u16 = 4;

/// One entry of the cmap encoding record list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    /// Offset of the subtable from the start of the cmap table
    pub offset: u32,
}

/// A format 4 segment covering `start_code..=end_code`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start_code: u16,
    pub end_code: u16,
    pub id_delta: u16,
    pub id_range_offset: u16,
}

impl Segment {
    pub fn contains(&self, code: u32) -> bool {
        u32::from(self.start_code) <= code && code <= u32::from(self.end_code)
    }
}

/// Parsed character map with a per-character lookup cache
#[derive(Debug, Default)]
pub struct CharacterMap {
    /// Encoding records in table order
    pub encoding_records: Vec<EncodingRecord>,
    /// The record whose subtable was used, if any
    pub selected: Option<EncodingRecord>,
    segments: Vec<Segment>,
    /// File position just past the idRangeOffset array
    glyph_index_array: usize,
    cache: RefCell<HashMap<u32, u16>>,
    scans: Cell<usize>,
}

impl CharacterMap {
    /// Parse the `cmap` table described by `record`.
    ///
    /// When no (platform 0, format 4) subtable exists the map is empty and
    /// [`CharacterMap::is_supported`] returns false. The reader position is
    /// restored.
    pub fn parse(reader: &mut FontReader<'_>, record: &TableRecord) -> Result<Self> {
        let base = record.start();
        reader.with_position(base, |r| {
            let _version = r.read_u16()?;
            let num_tables = r.read_u16()?;
            let mut encoding_records = Vec::with_capacity(num_tables as usize);
            for _ in 0..num_tables {
                encoding_records.push(EncodingRecord {
                    platform_id: r.read_u16()?,
                    encoding_id: r.read_u16()?,
                    offset: r.read_u32()?,
                });
            }

            let mut map = CharacterMap {
                encoding_records,
                ..Default::default()
            };

            for encoding in map.encoding_records.clone() {
                r.seek(base + encoding.offset as usize)?;
                let format = r.read_u16()?;
                if format != FORMAT_SEGMENT_MAPPING || encoding.platform_id != PLATFORM_UNICODE {
                    tracing::debug!(
                        platform = encoding.platform_id,
                        encoding = encoding.encoding_id,
                        format,
                        "skipping cmap subtable"
                    );
                    continue;
                }
                map.read_format4(r)?;
                map.selected = Some(encoding);
                break;
            }

            Ok(map)
        })
    }

    fn read_format4(&mut self, r: &mut FontReader<'_>) -> Result<()> {
        let _length = r.read_u16()?;
        let _language = r.read_u16()?;
        let seg_count = (r.read_u16()? / 2) as usize;
        let _search_range = r.read_u16()?;
        let _entry_selector = r.read_u16()?;
        let _range_shift = r.read_u16()?;

        let read_array = |r: &mut FontReader<'_>| -> Result<Vec<u16>> {
            (0..seg_count).map(|_| r.read_u16()).collect()
        };
        let end_codes = read_array(r)?;
        let _reserved_pad = r.read_u16()?;
        let start_codes = read_array(r)?;
        let id_deltas = read_array(r)?;
        let id_range_offsets = read_array(r)?;

        self.segments = (0..seg_count)
            .map(|i| Segment {
                start_code: start_codes[i],
                end_code: end_codes[i],
                id_delta: id_deltas[i],
                id_range_offset: id_range_offsets[i],
            })
            .collect();
        self.glyph_index_array = r.tell();
        Ok(())
    }

    /// Whether a usable subtable was found
    pub fn is_supported(&self) -> bool {
        self.selected.is_some()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// File position of the glyph index array
    pub fn glyph_index_array(&self) -> usize {
        self.glyph_index_array
    }

    /// Number of uncached lookups performed so far
    pub fn scan_count(&self) -> usize {
        self.scans.get()
    }

    /// Map a character code to a glyph index; 0 when unmapped.
    ///
    /// `data` must be the font buffer this map was parsed from; the glyph
    /// index array is read from it on demand. Results are cached.
    pub fn lookup(&self, data: &[u8], code: u32) -> u16 {
        if let Some(&glyph) = self.cache.borrow().get(&code) {
            return glyph;
        }
        self.scans.set(self.scans.get() + 1);

        let glyph = match self.segments.iter().find(|s| s.contains(code)) {
            None => 0,
            Some(segment) if segment.id_range_offset == 0 => {
                ((u32::from(segment.id_delta) + code) % 65536) as u16
            }
            Some(segment) => {
                let index = (code - u32::from(segment.start_code)) as usize;
                FontReader::at(data, self.glyph_index_array + index * 2)
                    .and_then(|mut r| r.read_u16())
                    .unwrap_or(0)
            }
        };

        self.cache.borrow_mut().insert(code, glyph);
        glyph
    }
}
