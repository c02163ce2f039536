//! Maximum profile (`maxp`) table

use crate::error::Result;
use crate::parser::FontReader;

/// Read `numGlyphs` from the `maxp` table at `offset`.
///
/// Only the glyph count is needed; the version field is skipped. The
/// reader position is restored.
pub fn glyph_count(reader: &mut FontReader<'_>, offset: usize) -> Result<u16> {
    reader.with_position(offset, |r| {
        r.skip(4)?;
        r.read_u16()
    })
}
