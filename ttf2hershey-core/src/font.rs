//! Font loading and glyph access

use crate::curve::DEFAULT_MAX_HANDLES;
use crate::error::{Diagnostic, FontError, Result};
use crate::geometry::{BoundingBox, GlyphGeometry};
use crate::glyph::{GlyphArena, GlyphDecoder, DEFAULT_MAX_POINTS};
use crate::parser::{FontReader, MAX_COMPONENT_DEPTH};
use crate::tables::{maxp, CharacterMap, GlyphLocator, HeadTable, TableDirectory, Tag};
use std::path::Path;

/// Options controlling glyph compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Samples per control point when flattening curves; 0 keeps the raw
    /// contour points
    pub precision: u32,
    /// Longest run of off-curve points evaluated as one Bezier segment
    pub max_handles: usize,
    /// Maximum nesting of compound glyph components
    pub max_component_depth: usize,
    /// Maximum number of resolved points in one glyph
    pub max_points: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            precision: 0,
            max_handles: DEFAULT_MAX_HANDLES,
            max_component_depth: MAX_COMPONENT_DEPTH,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl LoadOptions {
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_max_handles(mut self, max_handles: usize) -> Self {
        self.max_handles = max_handles;
        self
    }

    pub fn with_max_component_depth(mut self, depth: usize) -> Self {
        self.max_component_depth = depth;
        self
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }
}

/// A loaded TrueType font with every glyph compiled to polylines.
///
/// Loading is all-or-nothing for structural problems (directory, checksums,
/// `head`, `maxp`, `cmap`); a glyph that fails to decode is replaced by
/// empty geometry and reported in [`Font::diagnostics`].
///
/// `Font` is `Send` but not `Sync`: character lookups are memoized through
/// interior mutability.
#[derive(Debug)]
pub struct Font {
    data: Vec<u8>,
    tables: TableDirectory,
    head: HeadTable,
    cmap: CharacterMap,
    glyphs: Vec<GlyphGeometry>,
    diagnostics: Vec<Diagnostic>,
    options: LoadOptions,
}

impl Font {
    /// Load a font with default options
    pub fn load(data: Vec<u8>) -> Result<Self> {
        Self::load_with_options(data, LoadOptions::default())
    }

    /// Read and load a font file
    pub fn from_file<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_with_options(data, options)
    }

    pub fn load_with_options(data: Vec<u8>, options: LoadOptions) -> Result<Self> {
        let mut reader = FontReader::new(&data);
        let tables = TableDirectory::parse(&mut reader)?;
        tracing::debug!(tables = tables.len(), "parsed table directory");

        let head = HeadTable::parse(&mut reader, tables.require(Tag::HEAD)?.start())?;
        let glyph_count = maxp::glyph_count(&mut reader, tables.require(Tag::MAXP)?.start())?;
        let cmap = CharacterMap::parse(&mut reader, tables.require(Tag::CMAP)?)?;

        let mut diagnostics = Vec::new();
        if !cmap.is_supported() {
            tracing::warn!("{}", Diagnostic::UnsupportedCmap);
            diagnostics.push(Diagnostic::UnsupportedCmap);
        }

        let locator = GlyphLocator::new(
            *tables.require(Tag::LOCA)?,
            *tables.require(Tag::GLYF)?,
            head.index_to_loc_format,
            glyph_count,
        );
        let glyphs = compile_glyphs(&data, locator, &options, &mut diagnostics)?;
        tracing::debug!(
            glyphs = glyphs.len(),
            units_per_em = head.units_per_em,
            diagnostics = diagnostics.len(),
            "compiled font"
        );

        Ok(Self {
            data,
            tables,
            head,
            cmap,
            glyphs,
            diagnostics,
            options,
        })
    }

    /// Geometry of glyph `index`, if the font has that many glyphs
    pub fn glyph_geometry(&self, index: u16) -> Option<&GlyphGeometry> {
        self.glyphs.get(index as usize)
    }

    /// Glyph index for `ch`; 0 (the missing glyph) when unmapped
    pub fn glyph_index_for_char(&self, ch: char) -> u16 {
        self.cmap.lookup(&self.data, ch as u32)
    }

    pub fn geometry_for_char(&self, ch: char) -> Option<&GlyphGeometry> {
        self.glyph_geometry(self.glyph_index_for_char(ch))
    }

    pub fn units_per_em(&self) -> u16 {
        self.head.units_per_em
    }

    /// Bounding box over all glyphs, as declared in `head`
    pub fn global_bounding_box(&self) -> BoundingBox {
        self.head.bbox
    }

    pub fn glyph_count(&self) -> u16 {
        self.glyphs.len() as u16
    }

    /// All compiled glyphs, indexed by glyph index
    pub fn glyphs(&self) -> &[GlyphGeometry] {
        &self.glyphs
    }

    pub fn head(&self) -> &HeadTable {
        &self.head
    }

    pub fn tables(&self) -> &TableDirectory {
        &self.tables
    }

    pub fn character_map(&self) -> &CharacterMap {
        &self.cmap
    }

    /// Non-fatal problems found while loading
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Vertical position of the baseline in design units
    pub fn baseline(&self) -> i32 {
        0
    }

    /// Width of the `x` glyph's box, the reference width for spacing
    pub fn base_width(&self) -> i32 {
        self.geometry_for_char('x')
            .map(|g| g.rect.width())
            .unwrap_or(0)
    }
}

fn compile_glyphs(
    data: &[u8],
    locator: GlyphLocator,
    options: &LoadOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<GlyphGeometry>> {
    let decoder = GlyphDecoder::new(data, locator, options);
    let mut arena = GlyphArena::new(locator.glyph_count());

    for index in 0..locator.glyph_count() {
        match decoder.resolve(index, &mut arena, diagnostics) {
            Ok(()) => {}
            Err(error) if error.is_glyph_local() => {
                let diagnostic = Diagnostic::GlyphDecodeFailed {
                    glyph: index,
                    reason: error.to_string(),
                };
                tracing::warn!("{diagnostic}");
                diagnostics.push(diagnostic);
            }
            Err(error) => return Err(error),
        }
    }
    Ok(arena.into_glyphs())
}

impl TryFrom<Vec<u8>> for Font {
    type Error = FontError;

    fn try_from(data: Vec<u8>) -> Result<Self> {
        Font::load(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ComponentSpec, FontBuilder, GlyphSpec, SimpleGlyphSpec};
    use crate::geometry::Point;
    use pretty_assertions::assert_eq;

    fn square() -> SimpleGlyphSpec {
        SimpleGlyphSpec::new().contour(&[
            (0, 0, true),
            (40, 0, true),
            (40, 40, true),
            (0, 40, true),
        ])
    }

    #[test]
    fn test_load_options_builders() {
        let options = LoadOptions::default()
            .with_precision(4)
            .with_max_handles(2)
            .with_max_component_depth(3)
            .with_max_points(100);
        assert_eq!(options.precision, 4);
        assert_eq!(options.max_handles, 2);
        assert_eq!(options.max_component_depth, 3);
        assert_eq!(options.max_points, 100);
        assert_eq!(LoadOptions::default().max_handles, 5);
        assert_eq!(LoadOptions::default().max_component_depth, 8);
    }

    #[test]
    fn test_accessors() {
        let data = FontBuilder::new()
            .units_per_em(2048)
            .empty()
            .simple(square())
            .map_char('x', 1)
            .build();
        let font = Font::load(data).unwrap();

        assert_eq!(font.units_per_em(), 2048);
        assert_eq!(font.glyph_count(), 2);
        assert_eq!(font.global_bounding_box(), BoundingBox::new(0, 0, 40, 40));
        assert_eq!(font.glyph_index_for_char('x'), 1);
        assert_eq!(font.glyph_index_for_char('y'), 0);
        assert_eq!(font.base_width(), 40);
        assert_eq!(font.baseline(), 0);
        assert!(font.glyph_geometry(2).is_none());
        assert!(font.diagnostics().is_empty());
        assert!(font.character_map().is_supported());
    }

    #[test]
    fn test_bad_glyph_is_isolated() {
        let mut broken = vec![0x00, 0x01]; // one contour
        broken.extend([0u8; 8]);
        broken.extend([0x00, 0x05]); // end index, then nothing
        let data = FontBuilder::new()
            .simple(square())
            .glyph(GlyphSpec::Raw(broken))
            .build();
        let font = Font::load(data).unwrap();

        assert!(!font.glyph_geometry(0).unwrap().is_empty());
        assert_eq!(font.glyph_geometry(1), Some(&GlyphGeometry::empty()));
        assert!(matches!(
            font.diagnostics(),
            [Diagnostic::GlyphDecodeFailed { glyph: 1, .. }]
        ));
    }

    #[test]
    fn test_point_matched_component_is_reported() {
        let data = FontBuilder::new()
            .simple(square())
            .compound(vec![ComponentSpec::point_matched(0, 1, 2)])
            .build();
        let font = Font::load(data).unwrap();

        assert_eq!(
            font.diagnostics(),
            &[Diagnostic::PointMatching {
                glyph: 1,
                component: 0
            }]
        );
        // Placed without translation
        assert_eq!(font.glyph_geometry(1).unwrap().polylines[0][1], Point::new(40.0, 0.0));
    }

    #[test]
    fn test_point_matching_reported_once_when_shared() {
        let data = FontBuilder::new()
            .simple(square())
            .compound(vec![ComponentSpec::point_matched(0, 1, 2)])
            .compound(vec![ComponentSpec::offset(1, 0, 0), ComponentSpec::offset(1, 50, 0)])
            .compound(vec![ComponentSpec::offset(1, 0, 50)])
            .build();
        let font = Font::load(data).unwrap();

        assert_eq!(
            font.diagnostics(),
            &[Diagnostic::PointMatching {
                glyph: 1,
                component: 0
            }]
        );
        assert_eq!(font.glyph_geometry(2).unwrap().polylines.len(), 2);
        assert_eq!(font.glyph_geometry(3).unwrap().polylines[0][0], Point::new(0.0, 50.0));
    }

    #[test]
    fn test_unsupported_cmap_recorded() {
        let data = FontBuilder::new()
            .simple(square())
            .map_char('a', 0)
            .cmap_platform(3)
            .build();
        let font = Font::load(data).unwrap();
        assert_eq!(font.diagnostics(), &[Diagnostic::UnsupportedCmap]);
        assert_eq!(font.glyph_index_for_char('a'), 0);
    }

    #[test]
    fn test_from_file_missing_path_is_io_error() {
        let result = Font::from_file("/nonexistent/font.ttf", LoadOptions::default());
        assert!(matches!(result, Err(FontError::Io(_))));
    }
}
