//! Basic geometric types for glyph outlines
//!
//! All coordinates are in font design units.

#[cfg(feature = "serde")]
use serde::Serialize;

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin point (0, 0)
    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Linear interpolation: `self` at `t = 0`, `other` at `t = 1`
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            (1.0 - t) * self.x + t * other.x,
            (1.0 - t) * self.y + t * other.y,
        )
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// An ordered run of points; closed shapes leave the last-to-first edge
/// implicit.
pub type Polyline = Vec<Point>;

/// Integer bounding box as stored in glyph and font headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BoundingBox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl BoundingBox {
    pub fn new(x_min: i16, y_min: i16, x_max: i16, y_max: i16) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Get the width
    pub fn width(&self) -> i32 {
        i32::from(self.x_max) - i32::from(self.x_min)
    }

    /// Get the height
    pub fn height(&self) -> i32 {
        i32::from(self.y_max) - i32::from(self.y_min)
    }

    /// Get the center point
    pub fn center(&self) -> Point {
        Point::new(
            (f64::from(self.x_min) + f64::from(self.x_max)) / 2.0,
            (f64::from(self.y_min) + f64::from(self.y_max)) / 2.0,
        )
    }

    /// Whether the box encloses no area
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// `(xMin, yMin, xMax, yMax)`
    pub fn as_tuple(&self) -> (i16, i16, i16, i16) {
        (self.x_min, self.y_min, self.x_max, self.y_max)
    }
}

/// Affine map `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(e: f64, f: f64) -> Self {
        Self {
            e,
            f,
            ..Self::identity()
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Whether the 2x2 part has shear or rotation terms
    pub fn has_off_diagonal(&self) -> bool {
        self.b != 0.0 || self.c != 0.0
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }
}

/// Resolved outline of one glyph
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GlyphGeometry {
    /// Bounding box from the glyph header
    pub rect: BoundingBox,
    /// One polyline per contour, compound components concatenated in order
    pub polylines: Vec<Polyline>,
}

impl GlyphGeometry {
    /// Geometry of a glyph without an outline
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    /// Total number of points across all polylines
    pub fn point_count(&self) -> usize {
        self.polylines.iter().map(Vec::len).sum()
    }
}
