//! Glyph decoding and compound resolution

use super::{ComponentPlacement, Glyph};
use crate::curve::construct_curve;
use crate::error::{Diagnostic, FontError, Result};
use crate::font::LoadOptions;
use crate::geometry::{GlyphGeometry, Polyline};
use crate::parser::{FontReader, StackSafeContext};
use crate::tables::GlyphLocator;

/// Default limit on resolved points in one glyph
pub const DEFAULT_MAX_POINTS: usize = 1 << 20;

/// A resolved glyph and the length of its longest component chain,
/// counting itself
#[derive(Debug)]
struct Resolved {
    geometry: GlyphGeometry,
    height: usize,
}

/// Resolved glyphs indexed by glyph index.
///
/// Each glyph is resolved at most once; compound glyphs read their
/// components from here. Glyphs that failed stay unresolved.
#[derive(Debug, Default)]
pub struct GlyphArena {
    slots: Vec<Option<Resolved>>,
}

impl GlyphArena {
    pub fn new(glyph_count: u16) -> Self {
        Self {
            slots: (0..glyph_count).map(|_| None).collect(),
        }
    }

    pub fn get(&self, index: u16) -> Option<&GlyphGeometry> {
        self.resolved(index).map(|r| &r.geometry)
    }

    pub fn is_resolved(&self, index: u16) -> bool {
        self.resolved(index).is_some()
    }

    /// Number of glyphs resolved so far
    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// All glyphs in index order; unresolved ones become empty geometry
    pub fn into_glyphs(self) -> Vec<GlyphGeometry> {
        self.slots
            .into_iter()
            .map(|slot| slot.map(|r| r.geometry).unwrap_or_default())
            .collect()
    }

    fn resolved(&self, index: u16) -> Option<&Resolved> {
        self.slots.get(index as usize)?.as_ref()
    }

    fn store(&mut self, index: u16, resolved: Resolved) {
        if let Some(slot) = self.slots.get_mut(index as usize) {
            *slot = Some(resolved);
        }
    }
}

/// Decodes glyph records from a font buffer and flattens them into
/// [`GlyphGeometry`]
#[derive(Debug, Clone)]
pub struct GlyphDecoder<'a> {
    data: &'a [u8],
    locator: GlyphLocator,
    precision: u32,
    max_handles: usize,
    max_depth: usize,
    max_points: usize,
}

impl<'a> GlyphDecoder<'a> {
    pub fn new(data: &'a [u8], locator: GlyphLocator, options: &LoadOptions) -> Self {
        Self {
            data,
            locator,
            precision: options.precision,
            max_handles: options.max_handles,
            max_depth: options.max_component_depth,
            max_points: options.max_points,
        }
    }

    pub fn locator(&self) -> &GlyphLocator {
        &self.locator
    }

    /// Decode the raw record of glyph `index` without resolving components.
    ///
    /// Reads are confined to the glyph's `loca` span; running past it is
    /// `UnexpectedEndOfData`.
    pub fn decode(&self, index: u16) -> Result<Glyph> {
        let mut reader = FontReader::new(self.data);
        let span = match self.locator.span(&mut reader, index)? {
            Some(span) => span,
            None => return Ok(Glyph::Empty),
        };
        let bounded = self.data.get(..span.end).ok_or(FontError::OutOfRange {
            position: span.end,
            length: self.data.len(),
        })?;
        let mut reader = FontReader::at(bounded, span.start)?;
        Glyph::parse(&mut reader)
    }

    /// Resolve glyph `index` into `arena`, resolving its components first.
    ///
    /// A glyph already in the arena is not decoded again. Point-matched
    /// components are placed without translation and reported once in
    /// `diagnostics`.
    pub fn resolve(
        &self,
        index: u16,
        arena: &mut GlyphArena,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        if arena.is_resolved(index) {
            return Ok(());
        }
        let mut context = StackSafeContext::with_limit(self.max_depth);
        self.resolve_in(index, arena, &mut context, diagnostics)
    }

    fn resolve_in(
        &self,
        index: u16,
        arena: &mut GlyphArena,
        context: &mut StackSafeContext,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        context.enter(index)?;
        let resolved = self.build(index, arena, context, diagnostics);
        context.exit();
        arena.store(index, resolved?);
        Ok(())
    }

    fn build(
        &self,
        index: u16,
        arena: &mut GlyphArena,
        context: &mut StackSafeContext,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Resolved> {
        let glyph = match self.decode(index)? {
            Glyph::Empty => {
                return Ok(Resolved {
                    geometry: GlyphGeometry::empty(),
                    height: 1,
                })
            }
            Glyph::Simple(glyph) => {
                let geometry = GlyphGeometry {
                    rect: glyph.header.bbox,
                    polylines: glyph
                        .contours
                        .iter()
                        .map(|contour| construct_curve(contour, self.precision, self.max_handles))
                        .collect(),
                };
                self.check_points(index, geometry.point_count())?;
                return Ok(Resolved {
                    geometry,
                    height: 1,
                });
            }
            Glyph::Compound(glyph) => glyph,
        };

        // Resolve every component and size the result before building it
        let mut height = 1;
        let mut points = 0usize;
        for component in &glyph.components {
            if let ComponentPlacement::PointMatch { parent, child } = component.placement {
                let diagnostic = Diagnostic::PointMatching {
                    glyph: index,
                    component: component.glyph_index,
                };
                if !diagnostics.contains(&diagnostic) {
                    tracing::warn!(
                        glyph = index,
                        component = component.glyph_index,
                        parent,
                        child,
                        "point-matched component placed at zero offset"
                    );
                    diagnostics.push(diagnostic);
                }
            }

            let child = component.glyph_index;
            if !arena.is_resolved(child) {
                self.resolve_in(child, arena, context, diagnostics)?;
            }
            let resolved = arena
                .resolved(child)
                .ok_or(FontError::GlyphIndexOutOfRange {
                    index: child,
                    count: self.locator.glyph_count(),
                })?;
            if context.depth + resolved.height > self.max_depth {
                return Err(FontError::RecursionLimitExceeded {
                    glyph: child,
                    depth: self.max_depth,
                });
            }
            height = height.max(resolved.height + 1);
            points = points.saturating_add(resolved.geometry.point_count());
            self.check_points(index, points)?;
        }

        let mut polylines = Vec::new();
        for component in &glyph.components {
            let transform = component.transform;
            let inner = arena.get(component.glyph_index).into_iter();
            polylines.extend(inner.flat_map(|g| &g.polylines).map(|polyline| {
                polyline
                    .iter()
                    .map(|&point| transform.apply(point))
                    .collect::<Polyline>()
            }));
        }
        Ok(Resolved {
            geometry: GlyphGeometry {
                rect: glyph.header.bbox,
                polylines,
            },
            height,
        })
    }

    fn check_points(&self, glyph: u16, points: usize) -> Result<()> {
        if points > self.max_points {
            return Err(FontError::GlyphTooComplex {
                glyph,
                points,
                limit: self.max_points,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ComponentSpec, FontBuilder, SimpleGlyphSpec};
    use crate::parser::FontReader;
    use crate::tables::{TableDirectory, Tag};
    use pretty_assertions::assert_eq;

    fn locator_for(data: &[u8]) -> GlyphLocator {
        let mut reader = FontReader::new(data);
        let tables = TableDirectory::parse(&mut reader).unwrap();
        let head =
            crate::tables::HeadTable::parse(&mut reader, tables.require(Tag::HEAD).unwrap().start())
                .unwrap();
        let count =
            crate::tables::maxp::glyph_count(&mut reader, tables.require(Tag::MAXP).unwrap().start())
                .unwrap();
        GlyphLocator::new(
            *tables.require(Tag::LOCA).unwrap(),
            *tables.require(Tag::GLYF).unwrap(),
            head.index_to_loc_format,
            count,
        )
    }

    fn triangle() -> SimpleGlyphSpec {
        SimpleGlyphSpec::new().contour(&[(0, 0, true), (100, 0, true), (50, 100, true)])
    }

    #[test]
    fn test_components_resolved_on_demand() {
        let data = FontBuilder::new()
            .compound(vec![ComponentSpec::offset(1, 5, 0)])
            .simple(triangle())
            .build();
        let decoder = GlyphDecoder::new(&data, locator_for(&data), &LoadOptions::default());
        let mut arena = GlyphArena::new(2);
        let mut diagnostics = Vec::new();

        decoder.resolve(0, &mut arena, &mut diagnostics).unwrap();
        // The component was resolved along the way
        assert_eq!(arena.resolved_count(), 2);
        assert_eq!(arena.get(1).unwrap().polylines[0].len(), 3);
        assert_eq!(arena.get(0).unwrap().polylines[0][0].x, 5.0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_point_budget() {
        let data = FontBuilder::new()
            .simple(triangle())
            .compound(vec![ComponentSpec::offset(0, 0, 0), ComponentSpec::offset(0, 1, 0)])
            .build();
        let options = LoadOptions::default().with_max_points(5);
        let decoder = GlyphDecoder::new(&data, locator_for(&data), &options);
        let mut arena = GlyphArena::new(2);
        let mut diagnostics = Vec::new();

        decoder.resolve(0, &mut arena, &mut diagnostics).unwrap();
        match decoder.resolve(1, &mut arena, &mut diagnostics) {
            Err(FontError::GlyphTooComplex {
                glyph,
                points,
                limit,
            }) => {
                assert_eq!(glyph, 1);
                assert_eq!(points, 6);
                assert_eq!(limit, 5);
            }
            other => panic!("expected GlyphTooComplex, got {other:?}"),
        }
        assert!(!arena.is_resolved(1));

        let glyphs = arena.into_glyphs();
        assert_eq!(glyphs.len(), 2);
        assert!(glyphs[1].is_empty());
    }
}
