//! JSON export of decoded glyph geometry

use serde::Serialize;
use ttf2hershey::{BoundingBox, Font, Polyline};

/// One exported character
#[derive(Debug, Serialize)]
pub struct GlyphRecord<'a> {
    pub char: String,
    pub code: u32,
    pub glyph: u16,
    pub rect: BoundingBox,
    pub polylines: &'a [Polyline],
}

/// Collect records for `chars`, skipping code points the font has no geometry for
pub fn glyph_records(font: &Font, chars: impl IntoIterator<Item = char>) -> Vec<GlyphRecord<'_>> {
    chars
        .into_iter()
        .filter_map(|ch| {
            let glyph = font.glyph_index_for_char(ch);
            let geometry = font.glyph_geometry(glyph)?;
            Some(GlyphRecord {
                char: ch.to_string(),
                code: ch as u32,
                glyph,
                rect: geometry.rect,
                polylines: &geometry.polylines,
            })
        })
        .collect()
}

pub fn to_json(font: &Font, chars: impl IntoIterator<Item = char>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&glyph_records(font, chars))
}
