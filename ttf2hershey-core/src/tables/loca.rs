//! Index-to-location (`loca`) lookups

use super::directory::TableRecord;
use super::head::LocaFormat;
use crate::error::{FontError, Result};
use crate::parser::FontReader;
use std::ops::Range;

/// Resolves glyph indices to byte offsets inside the `glyf` table
#[derive(Debug, Clone, Copy)]
pub struct GlyphLocator {
    loca: TableRecord,
    glyf: TableRecord,
    format: LocaFormat,
    glyph_count: u16,
}

impl GlyphLocator {
    pub fn new(loca: TableRecord, glyf: TableRecord, format: LocaFormat, glyph_count: u16) -> Self {
        Self {
            loca,
            glyf,
            format,
            glyph_count,
        }
    }

    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    pub fn format(&self) -> LocaFormat {
        self.format
    }

    /// One past the last byte of the `glyf` table
    pub fn glyf_end(&self) -> usize {
        self.glyf.end()
    }

    /// Absolute file offset of glyph `index`.
    ///
    /// Short-format entries hold half the real offset. The reader position
    /// is left unchanged.
    pub fn offset(&self, reader: &mut FontReader<'_>, index: u16) -> Result<usize> {
        if index >= self.glyph_count {
            return Err(FontError::GlyphIndexOutOfRange {
                index,
                count: self.glyph_count,
            });
        }
        Ok(self.glyf.start() + self.raw_entry(reader, index as usize)?)
    }

    fn raw_entry(&self, reader: &mut FontReader<'_>, entry: usize) -> Result<usize> {
        let pos = self.loca.start() + entry * self.format.entry_size();
        reader.with_position(pos, |r| match self.format {
            LocaFormat::Short => Ok(r.read_u16()? as usize * 2),
            LocaFormat::Long => Ok(r.read_u32()? as usize),
        })
    }

    /// Whether a glyph starting at `offset` lies past the end of `glyf`
    pub fn is_past_end(&self, offset: usize) -> bool {
        offset >= self.glyf.end()
    }

    /// Byte range of glyph `index`, or `None` when the glyph has no outline.
    ///
    /// A glyph is empty when its offset is at or past the end of `glyf`, or
    /// when the next `loca` entry equals its own (zero-length span). If the
    /// following entry cannot be read (a truncated `loca`) the span runs to
    /// the end of `glyf`; glyph decoding then fails on its own if the record
    /// is incomplete.
    pub fn span(&self, reader: &mut FontReader<'_>, index: u16) -> Result<Option<Range<usize>>> {
        let start = self.offset(reader, index)?;
        if self.is_past_end(start) {
            return Ok(None);
        }
        let end = match self.raw_entry(reader, index as usize + 1) {
            Ok(next) => (self.glyf.start() + next).min(self.glyf.end()),
            Err(error) => {
                tracing::debug!(
                    glyph = index,
                    %error,
                    "next loca entry unreadable; glyph runs to end of glyf"
                );
                self.glyf.end()
            }
        };
        if end <= start {
            return Ok(None);
        }
        Ok(Some(start..end))
    }
}
