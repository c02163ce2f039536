//! In-memory TrueType writer for fixtures
//!
//! Produces small but structurally valid fonts (`cmap`, `glyf`, `head`,
//! `loca`, `maxp`) with correct table checksums. Used by the test suites,
//! the benchmarks and the CLI integration tests; it is not a general font
//! compiler.

use crate::geometry::BoundingBox;
use crate::glyph::{ComponentFlags, ContourPoint, PointFlags};
use crate::tables::directory::checksum_bytes;
use crate::tables::{LocaFormat, Tag, HEAD_MAGIC};
use std::collections::BTreeMap;
use std::ops::Range;

/// Value that `head.checkSumAdjustment` makes the whole-file checksum equal to
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Contours of a simple glyph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleGlyphSpec {
    pub contours: Vec<Vec<ContourPoint>>,
    /// Hinting bytes written (and skipped on decode)
    pub instructions: Vec<u8>,
}

impl SimpleGlyphSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contour of `(x, y, on_curve)` points
    pub fn contour(mut self, points: &[(i32, i32, bool)]) -> Self {
        self.contours.push(
            points
                .iter()
                .map(|&(x, y, on)| ContourPoint::new(x, y, on))
                .collect(),
        );
        self
    }

    pub fn instructions(mut self, bytes: &[u8]) -> Self {
        self.instructions = bytes.to_vec();
        self
    }

    fn bbox(&self) -> BoundingBox {
        let mut points = self.contours.iter().flatten();
        let first = match points.next() {
            Some(p) => p,
            None => return BoundingBox::default(),
        };
        let (mut x_min, mut y_min, mut x_max, mut y_max) = (first.x, first.y, first.x, first.y);
        for p in points {
            x_min = x_min.min(p.x);
            y_min = y_min.min(p.y);
            x_max = x_max.max(p.x);
            y_max = y_max.max(p.y);
        }
        BoundingBox::new(x_min as i16, y_min as i16, x_max as i16, y_max as i16)
    }
}

/// Linear part of a component transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentScale {
    Uniform(f64),
    XY(f64, f64),
    Matrix { a: f64, b: f64, c: f64, d: f64 },
}

/// One component reference of a compound glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentSpec {
    pub glyph_index: u16,
    /// Offset, or `(parent, child)` point indices when `point_match` is set
    pub args: (i32, i32),
    pub point_match: bool,
    pub scale: Option<ComponentScale>,
}

impl ComponentSpec {
    /// Component placed at `(dx, dy)`
    pub fn offset(glyph_index: u16, dx: i32, dy: i32) -> Self {
        Self {
            glyph_index,
            args: (dx, dy),
            point_match: false,
            scale: None,
        }
    }

    /// Component anchored by matching point `child` to point `parent`
    pub fn point_matched(glyph_index: u16, parent: u16, child: u16) -> Self {
        Self {
            glyph_index,
            args: (i32::from(parent), i32::from(child)),
            point_match: true,
            scale: None,
        }
    }

    pub fn with_scale(mut self, scale: ComponentScale) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// A glyph slot in the fixture font
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphSpec {
    /// Zero-length `loca` span
    Empty,
    Simple(SimpleGlyphSpec),
    Compound {
        components: Vec<ComponentSpec>,
        bbox: BoundingBox,
    },
    /// Bytes copied verbatim into `glyf`, for malformed-input tests
    Raw(Vec<u8>),
}

/// Builder for fixture fonts
#[derive(Debug, Clone)]
pub struct FontBuilder {
    units_per_em: u16,
    loca_format: LocaFormat,
    magic_number: u32,
    cmap_platform: u16,
    cmap_format: u16,
    glyph_index_array: bool,
    glyphs: Vec<GlyphSpec>,
    char_map: BTreeMap<u32, u16>,
}

impl Default for FontBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBuilder {
    pub fn new() -> Self {
        Self {
            units_per_em: 1000,
            loca_format: LocaFormat::Long,
            magic_number: HEAD_MAGIC,
            cmap_platform: 0,
            cmap_format: 4,
            glyph_index_array: false,
            glyphs: Vec::new(),
            char_map: BTreeMap::new(),
        }
    }

    pub fn units_per_em(mut self, units_per_em: u16) -> Self {
        self.units_per_em = units_per_em;
        self
    }

    pub fn loca_format(mut self, format: LocaFormat) -> Self {
        self.loca_format = format;
        self
    }

    /// Override `head.magicNumber`
    pub fn magic_number(mut self, magic: u32) -> Self {
        self.magic_number = magic;
        self
    }

    /// Platform ID of the single cmap encoding record
    pub fn cmap_platform(mut self, platform_id: u16) -> Self {
        self.cmap_platform = platform_id;
        self
    }

    /// Format number written in the cmap subtable header. Only the body of
    /// format 4 is ever written.
    pub fn cmap_format(mut self, format: u16) -> Self {
        self.cmap_format = format;
        self
    }

    /// Map all characters through one glyph-index-array segment instead of
    /// idDelta segments
    pub fn use_glyph_index_array(mut self, enabled: bool) -> Self {
        self.glyph_index_array = enabled;
        self
    }

    /// Append a glyph; its index is the number of glyphs added before it
    pub fn glyph(mut self, glyph: GlyphSpec) -> Self {
        self.glyphs.push(glyph);
        self
    }

    pub fn simple(self, glyph: SimpleGlyphSpec) -> Self {
        self.glyph(GlyphSpec::Simple(glyph))
    }

    pub fn empty(self) -> Self {
        self.glyph(GlyphSpec::Empty)
    }

    /// Compound glyph with a bounding box derived from its components'
    /// offsets and the boxes of already-added simple glyphs
    pub fn compound(self, components: Vec<ComponentSpec>) -> Self {
        let bbox = self.compound_bbox(&components);
        self.glyph(GlyphSpec::Compound { components, bbox })
    }

    pub fn map_char(mut self, ch: char, glyph: u16) -> Self {
        self.char_map.insert(ch as u32, glyph);
        self
    }

    fn compound_bbox(&self, components: &[ComponentSpec]) -> BoundingBox {
        let mut result: Option<BoundingBox> = None;
        for component in components {
            let inner = match self.glyphs.get(component.glyph_index as usize) {
                Some(GlyphSpec::Simple(g)) => g.bbox(),
                Some(GlyphSpec::Compound { bbox, .. }) => *bbox,
                _ => continue,
            };
            let (dx, dy) = if component.point_match {
                (0, 0)
            } else {
                (component.args.0 as i16, component.args.1 as i16)
            };
            let shifted = BoundingBox::new(
                inner.x_min + dx,
                inner.y_min + dy,
                inner.x_max + dx,
                inner.y_max + dy,
            );
            result = Some(match result {
                None => shifted,
                Some(b) => union(b, shifted),
            });
        }
        result.unwrap_or_default()
    }

    /// Assemble the font file
    pub fn build(&self) -> Vec<u8> {
        let (glyf, offsets) = self.build_glyf();
        let loca = self.build_loca(&offsets);
        let maxp = self.build_maxp();
        let cmap = self.build_cmap();
        let head = self.build_head();

        // Directory order must be sorted by tag
        let mut tables = vec![
            (Tag::CMAP, cmap),
            (Tag::GLYF, glyf),
            (Tag::HEAD, head),
            (Tag::LOCA, loca),
            (Tag::MAXP, maxp),
        ];
        tables.sort_by_key(|(tag, _)| *tag);

        let mut font = write_directory(&tables);
        let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum_bytes(&font));
        if let Some(range) = table_range(&font, Tag::HEAD) {
            font[range.start + 8..range.start + 12].copy_from_slice(&adjustment.to_be_bytes());
        }
        font
    }

    fn build_glyf(&self) -> (Vec<u8>, Vec<usize>) {
        let mut glyf = Vec::new();
        let mut offsets = Vec::with_capacity(self.glyphs.len() + 1);
        for glyph in &self.glyphs {
            offsets.push(glyf.len());
            match glyph {
                GlyphSpec::Empty => {}
                GlyphSpec::Simple(g) => encode_simple(g, &mut glyf),
                GlyphSpec::Compound { components, bbox } => {
                    encode_compound(components, *bbox, &mut glyf)
                }
                GlyphSpec::Raw(bytes) => glyf.extend_from_slice(bytes),
            }
            // Keep offsets even for the short loca format
            while glyf.len() % 4 != 0 {
                glyf.push(0);
            }
        }
        offsets.push(glyf.len());
        (glyf, offsets)
    }

    fn build_loca(&self, offsets: &[usize]) -> Vec<u8> {
        let mut loca = Vec::new();
        for &offset in offsets {
            match self.loca_format {
                LocaFormat::Short => loca.extend(&((offset / 2) as u16).to_be_bytes()),
                LocaFormat::Long => loca.extend(&(offset as u32).to_be_bytes()),
            }
        }
        loca
    }

    fn build_maxp(&self) -> Vec<u8> {
        let mut maxp = Vec::new();
        maxp.extend(&[0x00, 0x00, 0x50, 0x00]); // version 0.5
        maxp.extend(&(self.glyphs.len() as u16).to_be_bytes()); // numGlyphs
        maxp
    }

    fn build_head(&self) -> Vec<u8> {
        let bbox = self
            .glyphs
            .iter()
            .filter_map(|g| match g {
                GlyphSpec::Simple(s) if !s.contours.is_empty() => Some(s.bbox()),
                GlyphSpec::Compound { bbox, .. } => Some(*bbox),
                _ => None,
            })
            .reduce(union)
            .unwrap_or_default();

        let mut head = Vec::new();
        head.extend(&[0x00, 0x01, 0x00, 0x00]); // version 1.0
        head.extend(&[0x00, 0x01, 0x00, 0x00]); // fontRevision
        head.extend(&[0x00, 0x00, 0x00, 0x00]); // checkSumAdjustment, patched later
        head.extend(&self.magic_number.to_be_bytes()); // magicNumber
        head.extend(&[0x00, 0x0B]); // flags
        head.extend(&self.units_per_em.to_be_bytes()); // unitsPerEm
        head.extend(&[0u8; 8]); // created
        head.extend(&[0u8; 8]); // modified
        head.extend(&bbox.x_min.to_be_bytes());
        head.extend(&bbox.y_min.to_be_bytes());
        head.extend(&bbox.x_max.to_be_bytes());
        head.extend(&bbox.y_max.to_be_bytes());
        head.extend(&[0x00, 0x00]); // macStyle
        head.extend(&[0x00, 0x08]); // lowestRecPPEM
        head.extend(&[0x00, 0x02]); // fontDirectionHint
        let loc_format: i16 = match self.loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        };
        head.extend(&loc_format.to_be_bytes()); // indexToLocFormat
        head.extend(&[0x00, 0x00]); // glyphDataFormat
        head
    }

    fn build_cmap(&self) -> Vec<u8> {
        let mappings: Vec<(u16, u16)> = self
            .char_map
            .iter()
            .filter(|&(&code, _)| code < 0xFFFF)
            .map(|(&code, &glyph)| (code as u16, glyph))
            .collect();

        // (start, end, delta, range_offset)
        let mut segments: Vec<(u16, u16, u16, u16)> = Vec::new();
        let mut glyph_array: Vec<u16> = Vec::new();

        if self.glyph_index_array {
            if let (Some(&(first, _)), Some(&(last, _))) = (mappings.first(), mappings.last()) {
                let lookup: BTreeMap<u16, u16> = mappings.iter().copied().collect();
                glyph_array = (first..=last)
                    .map(|code| lookup.get(&code).copied().unwrap_or(0))
                    .collect();
                // Offset from this segment's idRangeOffset entry to the array
                segments.push((first, last, 0, 4));
            }
        } else {
            for &(code, glyph) in &mappings {
                let delta = glyph.wrapping_sub(code);
                match segments.last_mut() {
                    Some(last) if last.1.wrapping_add(1) == code && last.2 == delta => {
                        last.1 = code;
                    }
                    _ => segments.push((code, code, delta, 0)),
                }
            }
        }
        segments.push((0xFFFF, 0xFFFF, 1, 0));

        let seg_count = segments.len() as u16;
        let mut power = 1u16;
        let mut entry_selector = 0u16;
        while power * 2 <= seg_count {
            power *= 2;
            entry_selector += 1;
        }
        let search_range = power * 2;
        let range_shift = seg_count * 2 - search_range;

        let mut cmap = Vec::new();
        cmap.extend(&[0x00, 0x00]); // version
        cmap.extend(&[0x00, 0x01]); // numTables
        cmap.extend(&self.cmap_platform.to_be_bytes()); // platformID
        cmap.extend(&[0x00, 0x03]); // encodingID
        cmap.extend(&12u32.to_be_bytes()); // offset

        let subtable_start = cmap.len();
        cmap.extend(&self.cmap_format.to_be_bytes()); // format
        cmap.extend(&[0x00, 0x00]); // length, patched below
        cmap.extend(&[0x00, 0x00]); // language
        cmap.extend(&(seg_count * 2).to_be_bytes()); // segCountX2
        cmap.extend(&search_range.to_be_bytes());
        cmap.extend(&entry_selector.to_be_bytes());
        cmap.extend(&range_shift.to_be_bytes());
        for s in &segments {
            cmap.extend(&s.1.to_be_bytes());
        }
        cmap.extend(&[0x00, 0x00]); // reservedPad
        for s in &segments {
            cmap.extend(&s.0.to_be_bytes());
        }
        for s in &segments {
            cmap.extend(&s.2.to_be_bytes());
        }
        for s in &segments {
            cmap.extend(&s.3.to_be_bytes());
        }
        for g in &glyph_array {
            cmap.extend(&g.to_be_bytes());
        }

        let length = (cmap.len() - subtable_start) as u16;
        cmap[subtable_start + 2..subtable_start + 4].copy_from_slice(&length.to_be_bytes());
        cmap
    }
}

fn union(a: BoundingBox, b: BoundingBox) -> BoundingBox {
    BoundingBox::new(
        a.x_min.min(b.x_min),
        a.y_min.min(b.y_min),
        a.x_max.max(b.x_max),
        a.y_max.max(b.y_max),
    )
}

/// Offset table, directory entries with checksums, then 4-byte aligned
/// table bodies
fn write_directory(tables: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let mut power = 1u16;
    let mut entry_selector = 0u16;
    while power * 2 <= num_tables {
        power *= 2;
        entry_selector += 1;
    }
    let search_range = power * 16;

    let mut font = Vec::new();
    font.extend(&[0x00, 0x01, 0x00, 0x00]); // sfnt version 1.0
    font.extend(&num_tables.to_be_bytes());
    font.extend(&search_range.to_be_bytes());
    font.extend(&entry_selector.to_be_bytes());
    font.extend(&(num_tables * 16 - search_range).to_be_bytes()); // rangeShift

    let mut offset = 12 + tables.len() * 16;
    for (tag, body) in tables {
        font.extend(tag.as_bytes());
        font.extend(&checksum_bytes(body).to_be_bytes());
        font.extend(&(offset as u32).to_be_bytes());
        font.extend(&(body.len() as u32).to_be_bytes());
        offset += (body.len() + 3) & !3;
    }
    for (_, body) in tables {
        font.extend(body);
        while font.len() % 4 != 0 {
            font.push(0);
        }
    }
    font
}

fn encode_simple(glyph: &SimpleGlyphSpec, out: &mut Vec<u8>) {
    let bbox = glyph.bbox();
    out.extend(&(glyph.contours.len() as i16).to_be_bytes());
    out.extend(&bbox.x_min.to_be_bytes());
    out.extend(&bbox.y_min.to_be_bytes());
    out.extend(&bbox.x_max.to_be_bytes());
    out.extend(&bbox.y_max.to_be_bytes());

    let mut end = 0usize;
    for contour in &glyph.contours {
        end += contour.len();
        out.extend(&(end as u16).wrapping_sub(1).to_be_bytes());
    }
    out.extend(&(glyph.instructions.len() as u16).to_be_bytes());
    out.extend(&glyph.instructions);

    let points: Vec<&ContourPoint> = glyph.contours.iter().flatten().collect();
    let mut flags = Vec::with_capacity(points.len());
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let (mut prev_x, mut prev_y) = (0, 0);
    for p in &points {
        let mut flag = if p.on_curve {
            PointFlags::ON_CURVE
        } else {
            PointFlags::empty()
        };
        flag |= encode_delta(
            p.x - prev_x,
            PointFlags::X_SHORT_VECTOR,
            PointFlags::X_IS_SAME_OR_POSITIVE,
            &mut xs,
        );
        flag |= encode_delta(
            p.y - prev_y,
            PointFlags::Y_SHORT_VECTOR,
            PointFlags::Y_IS_SAME_OR_POSITIVE,
            &mut ys,
        );
        flags.push(flag);
        prev_x = p.x;
        prev_y = p.y;
    }

    let mut i = 0;
    while i < flags.len() {
        let flag = flags[i];
        let mut run = 1;
        while i + run < flags.len() && flags[i + run] == flag && run < 256 {
            run += 1;
        }
        if run > 1 {
            out.push((flag | PointFlags::REPEAT).bits());
            out.push((run - 1) as u8);
        } else {
            out.push(flag.bits());
        }
        i += run;
    }
    out.extend(&xs);
    out.extend(&ys);
}

fn encode_delta(
    delta: i32,
    short_vector: PointFlags,
    same_or_positive: PointFlags,
    out: &mut Vec<u8>,
) -> PointFlags {
    if delta == 0 {
        same_or_positive
    } else if delta.abs() <= 0xFF {
        out.push(delta.unsigned_abs() as u8);
        if delta > 0 {
            short_vector | same_or_positive
        } else {
            short_vector
        }
    } else {
        out.extend(&(delta as i16).to_be_bytes());
        PointFlags::empty()
    }
}

fn encode_compound(components: &[ComponentSpec], bbox: BoundingBox, out: &mut Vec<u8>) {
    out.extend(&(-1i16).to_be_bytes()); // numberOfContours
    out.extend(&bbox.x_min.to_be_bytes());
    out.extend(&bbox.y_min.to_be_bytes());
    out.extend(&bbox.x_max.to_be_bytes());
    out.extend(&bbox.y_max.to_be_bytes());

    for (i, component) in components.iter().enumerate() {
        let (arg1, arg2) = component.args;
        let mut flags = ComponentFlags::empty();
        if i + 1 < components.len() {
            flags |= ComponentFlags::MORE_COMPONENTS;
        }
        let fits_byte = if component.point_match {
            (0..=0xFF).contains(&arg1) && (0..=0xFF).contains(&arg2)
        } else {
            flags |= ComponentFlags::ARGS_ARE_XY_VALUES;
            (-128..=127).contains(&arg1) && (-128..=127).contains(&arg2)
        };
        if !fits_byte {
            flags |= ComponentFlags::ARG_1_AND_2_ARE_WORDS;
        }
        flags |= match component.scale {
            None => ComponentFlags::empty(),
            Some(ComponentScale::Uniform(_)) => ComponentFlags::WE_HAVE_A_SCALE,
            Some(ComponentScale::XY(..)) => ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE,
            Some(ComponentScale::Matrix { .. }) => ComponentFlags::WE_HAVE_A_TWO_BY_TWO,
        };

        out.extend(&flags.bits().to_be_bytes());
        out.extend(&component.glyph_index.to_be_bytes());
        if fits_byte {
            out.push(arg1 as u8);
            out.push(arg2 as u8);
        } else {
            out.extend(&(arg1 as i16).to_be_bytes());
            out.extend(&(arg2 as i16).to_be_bytes());
        }
        match component.scale {
            None => {}
            Some(ComponentScale::Uniform(s)) => out.extend(&f2dot14(s)),
            Some(ComponentScale::XY(x, y)) => {
                out.extend(&f2dot14(x));
                out.extend(&f2dot14(y));
            }
            Some(ComponentScale::Matrix { a, b, c, d }) => {
                for v in [a, b, c, d] {
                    out.extend(&f2dot14(v));
                }
            }
        }
    }
}

fn f2dot14(value: f64) -> [u8; 2] {
    ((value * 16384.0).round() as i16).to_be_bytes()
}

/// Byte range of table `tag` in a built font, read from its directory
pub fn table_range(font: &[u8], tag: Tag) -> Option<Range<usize>> {
    let num_tables = u16::from_be_bytes([*font.get(4)?, *font.get(5)?]) as usize;
    (0..num_tables).find_map(|i| {
        let entry = font.get(12 + i * 16..12 + (i + 1) * 16)?;
        if entry[0..4] != tag.0 {
            return None;
        }
        let offset = u32::from_be_bytes([entry[8], entry[9], entry[10], entry[11]]) as usize;
        let length = u32::from_be_bytes([entry[12], entry[13], entry[14], entry[15]]) as usize;
        Some(offset..offset + length)
    })
}

/// Overwrite the declared checksum of table `tag`; false if absent
pub fn set_table_checksum(font: &mut [u8], tag: Tag, value: u32) -> bool {
    let num_tables = match (font.get(4), font.get(5)) {
        (Some(&hi), Some(&lo)) => u16::from_be_bytes([hi, lo]) as usize,
        _ => return false,
    };
    for i in 0..num_tables {
        let entry = 12 + i * 16;
        if font.get(entry..entry + 4) == Some(&tag.0[..]) {
            font[entry + 4..entry + 8].copy_from_slice(&value.to_be_bytes());
            return true;
        }
    }
    false
}
