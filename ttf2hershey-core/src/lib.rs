//! # ttf2hershey
//!
//! A TrueType outline decoder that turns glyphs into flattened polylines,
//! ready for single-stroke (Hershey-style) vector output.
//!
//! ## Features
//!
//! - **Table directory**: checksum validation of every table except `head`
//! - **Glyph decoding**: simple and compound glyphs, full 2x2 component
//!   transforms, depth-bounded and cycle-checked component recursion
//! - **Curve flattening**: de Casteljau sampling of runs of off-curve points
//!   at a configurable precision
//! - **Character mapping**: `cmap` format 4 (Unicode platform) with memoized
//!   lookups
//! - **Fault isolation**: a malformed glyph becomes empty geometry plus a
//!   [`Diagnostic`] instead of failing the whole font
//!
//! ## Quick Start
//!
//! ```rust
//! use ttf2hershey::builder::{FontBuilder, SimpleGlyphSpec};
//! use ttf2hershey::{Font, Point, Result};
//!
//! # fn main() -> Result<()> {
//! let data = FontBuilder::new()
//!     .simple(SimpleGlyphSpec::new().contour(&[
//!         (0, 0, true),
//!         (100, 0, true),
//!         (50, 100, true),
//!     ]))
//!     .map_char('A', 0)
//!     .build();
//!
//! let font = Font::load(data)?;
//! let glyph = font.geometry_for_char('A').expect("glyph 0 exists");
//! assert_eq!(glyph.rect.as_tuple(), (0, 0, 100, 100));
//! assert_eq!(glyph.polylines[0][2], Point::new(50.0, 100.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading with curve flattening
//!
//! ```rust,no_run
//! use ttf2hershey::{Font, LoadOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let font = Font::from_file("DejaVuSans.ttf", LoadOptions::default().with_precision(4))?;
//! for diagnostic in font.diagnostics() {
//!     eprintln!("warning: {diagnostic}");
//! }
//! println!("{} glyphs, {} units/em", font.glyph_count(), font.units_per_em());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod curve;
pub mod error;
pub mod font;
pub mod geometry;
pub mod glyph;
pub mod parser;
pub mod tables;

pub use curve::{bezier_point, construct_curve, DEFAULT_MAX_HANDLES};
pub use error::{Diagnostic, FontError, Result};
pub use font::{Font, LoadOptions};
pub use geometry::{BoundingBox, GlyphGeometry, Point, Polyline, Transform};
pub use glyph::{ContourPoint, Glyph, GlyphArena, GlyphDecoder, DEFAULT_MAX_POINTS};
pub use parser::FontReader;
pub use tables::{CharacterMap, HeadTable, LocaFormat, TableDirectory, Tag};

/// Current version of ttf2hershey
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
