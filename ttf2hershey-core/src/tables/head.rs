//! Font header (`head`) table

use crate::error::{FontError, Result};
use crate::geometry::BoundingBox;
use crate::parser::FontReader;

/// Expected value of `head.magicNumber`
pub const HEAD_MAGIC: u32 = 0x5F0F_3CF5;

/// Size of the fixed-layout `head` table
pub const HEAD_TABLE_SIZE: usize = 54;

/// Format of the `loca` offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaFormat {
    /// 16-bit offsets storing half the real offset
    Short,
    /// 32-bit offsets
    Long,
}

impl LocaFormat {
    /// Bytes per `loca` entry
    pub fn entry_size(self) -> usize {
        match self {
            LocaFormat::Short => 2,
            LocaFormat::Long => 4,
        }
    }
}

/// Parsed `head` table
#[derive(Debug, Clone, PartialEq)]
pub struct HeadTable {
    pub version: f64,
    pub font_revision: f64,
    pub checksum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: i64,
    pub modified: i64,
    /// Bounding box over all glyphs
    pub bbox: BoundingBox,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: LocaFormat,
    pub glyph_data_format: i16,
}

impl HeadTable {
    /// Parse the table starting at `offset`. The reader position is restored.
    pub fn parse(reader: &mut FontReader<'_>, offset: usize) -> Result<Self> {
        reader.with_position(offset, |r| {
            let version = r.read_fixed()?;
            let font_revision = r.read_fixed()?;
            let checksum_adjustment = r.read_u32()?;
            let magic_number = r.read_u32()?;
            if magic_number != HEAD_MAGIC {
                return Err(FontError::BadMagicNumber(magic_number));
            }
            let flags = r.read_u16()?;
            let units_per_em = r.read_u16()?;
            let created = r.read_long_datetime()?;
            let modified = r.read_long_datetime()?;
            let bbox = BoundingBox::new(
                r.read_fword()?,
                r.read_fword()?,
                r.read_fword()?,
                r.read_fword()?,
            );
            let mac_style = r.read_u16()?;
            let lowest_rec_ppem = r.read_u16()?;
            let font_direction_hint = r.read_i16()?;
            let format_position = r.tell();
            let index_to_loc_format = match r.read_i16()? {
                0 => LocaFormat::Short,
                1 => LocaFormat::Long,
                other => {
                    return Err(FontError::FormatViolation {
                        position: format_position,
                        message: format!("indexToLocFormat must be 0 or 1, found {other}"),
                    })
                }
            };
            let glyph_data_format = r.read_i16()?;

            Ok(Self {
                version,
                font_revision,
                checksum_adjustment,
                magic_number,
                flags,
                units_per_em,
                created,
                modified,
                bbox,
                mac_style,
                lowest_rec_ppem,
                font_direction_hint,
                index_to_loc_format,
                glyph_data_format,
            })
        })
    }
}
