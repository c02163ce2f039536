//! Glyph records from the `glyf` table
//!
//! A glyph is either *simple* (its own contours) or *compound* (a list of
//! references to other glyphs, each placed with an affine transform). The
//! [`decoder`] module reads both kinds and resolves them into flattened
//! polylines.

pub mod compound;
pub mod decoder;
pub mod simple;

pub use compound::{Component, ComponentFlags, ComponentPlacement, CompoundGlyph};
pub use decoder::{GlyphArena, GlyphDecoder, DEFAULT_MAX_POINTS};
pub use simple::{PointFlags, SimpleGlyph};

use crate::error::{FontError, Result};
use crate::geometry::{BoundingBox, Point};
use crate::parser::FontReader;

/// A point of a simple glyph contour, in design units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourPoint {
    pub x: i32,
    pub y: i32,
    /// Whether the point lies on the outline (otherwise it is a control point)
    pub on_curve: bool,
}

impl ContourPoint {
    pub fn new(x: i32, y: i32, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }

    pub fn to_point(&self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

/// The 10-byte header shared by simple and compound glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphHeader {
    /// `>= 0` for simple glyphs, `-1` for compound glyphs
    pub number_of_contours: i16,
    pub bbox: BoundingBox,
}

impl GlyphHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 10;

    pub fn parse(reader: &mut FontReader<'_>) -> Result<Self> {
        let number_of_contours = reader.read_i16()?;
        let bbox = BoundingBox::new(
            reader.read_fword()?,
            reader.read_fword()?,
            reader.read_fword()?,
            reader.read_fword()?,
        );
        Ok(Self {
            number_of_contours,
            bbox,
        })
    }

    pub fn is_compound(&self) -> bool {
        self.number_of_contours == -1
    }
}

/// A decoded glyph record
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    /// No outline data (zero-length or out-of-table span)
    Empty,
    Simple(SimpleGlyph),
    Compound(CompoundGlyph),
}

impl Glyph {
    /// Decode the glyph record at the reader's position
    pub fn parse(reader: &mut FontReader<'_>) -> Result<Self> {
        let position = reader.tell();
        let header = GlyphHeader::parse(reader)?;
        match header.number_of_contours {
            -1 => Ok(Glyph::Compound(CompoundGlyph::parse(reader, header)?)),
            n if n >= 0 => Ok(Glyph::Simple(SimpleGlyph::parse(reader, header)?)),
            n => Err(FontError::FormatViolation {
                position,
                message: format!("numberOfContours must be >= -1, found {n}"),
            }),
        }
    }

    pub fn header(&self) -> Option<&GlyphHeader> {
        match self {
            Glyph::Empty => None,
            Glyph::Simple(g) => Some(&g.header),
            Glyph::Compound(g) => Some(&g.header),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Glyph::Empty)
    }
}
