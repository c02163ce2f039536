//! Compound glyph decoding

use super::GlyphHeader;
use crate::error::Result;
use crate::geometry::Transform;
use crate::parser::FontReader;
use bitflags::bitflags;

bitflags! {
    /// Flags preceding each component reference
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ComponentFlags: u16 {
        /// Arguments are 16-bit; otherwise 8-bit
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        /// Arguments are an x/y offset; otherwise point indices
        const ARGS_ARE_XY_VALUES = 0x0002;
        const ROUND_XY_TO_GRID = 0x0004;
        /// One uniform scale follows
        const WE_HAVE_A_SCALE = 0x0008;
        const MORE_COMPONENTS = 0x0020;
        /// Separate x and y scales follow
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// A full 2x2 matrix follows
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        /// Instructions follow the last component
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        const USE_MY_METRICS = 0x0200;
        const OVERLAP_COMPOUND = 0x0400;
        const SCALED_COMPONENT_OFFSET = 0x0800;
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
    }
}

/// How a component is positioned within its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentPlacement {
    /// Translate by `(dx, dy)` design units
    Offset { dx: f64, dy: f64 },
    /// Align point `child` of the component with point `parent` of the
    /// glyph assembled so far
    PointMatch { parent: u16, child: u16 },
}

/// One reference to another glyph inside a compound glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
    pub glyph_index: u16,
    pub flags: ComponentFlags,
    pub placement: ComponentPlacement,
    /// Linear part from the scale fields, translation from an `Offset`
    /// placement (zero for `PointMatch`)
    pub transform: Transform,
}

impl Component {
    /// Read one component record
    pub fn parse(reader: &mut FontReader<'_>) -> Result<Self> {
        let flags = ComponentFlags::from_bits_retain(reader.read_u16()?);
        let glyph_index = reader.read_u16()?;

        let words = flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS);
        let placement = if flags.contains(ComponentFlags::ARGS_ARE_XY_VALUES) {
            let (dx, dy) = if words {
                (reader.read_i16()? as f64, reader.read_i16()? as f64)
            } else {
                (reader.read_i8()? as f64, reader.read_i8()? as f64)
            };
            ComponentPlacement::Offset { dx, dy }
        } else {
            let (parent, child) = if words {
                (reader.read_u16()?, reader.read_u16()?)
            } else {
                (
                    u16::from(reader.read_u8()?),
                    u16::from(reader.read_u8()?),
                )
            };
            ComponentPlacement::PointMatch { parent, child }
        };

        let mut transform = Transform::identity();
        if flags.contains(ComponentFlags::WE_HAVE_A_SCALE) {
            let scale = reader.read_f2dot14()?;
            transform.a = scale;
            transform.d = scale;
        } else if flags.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.a = reader.read_f2dot14()?;
            transform.d = reader.read_f2dot14()?;
        } else if flags.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.a = reader.read_f2dot14()?;
            transform.b = reader.read_f2dot14()?;
            transform.c = reader.read_f2dot14()?;
            transform.d = reader.read_f2dot14()?;
        }
        if let ComponentPlacement::Offset { dx, dy } = placement {
            transform.e = dx;
            transform.f = dy;
        }

        Ok(Self {
            glyph_index,
            flags,
            placement,
            transform,
        })
    }

    pub fn is_point_matched(&self) -> bool {
        matches!(self.placement, ComponentPlacement::PointMatch { .. })
    }
}

/// A glyph assembled from transformed references to other glyphs
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundGlyph {
    pub header: GlyphHeader,
    pub components: Vec<Component>,
    /// Length of the skipped hinting program, if any
    pub instruction_length: u16,
}

impl CompoundGlyph {
    /// Decode the component list following `header`
    pub fn parse(reader: &mut FontReader<'_>, header: GlyphHeader) -> Result<Self> {
        let mut components = Vec::new();
        loop {
            let component = Component::parse(reader)?;
            let more = component.flags.contains(ComponentFlags::MORE_COMPONENTS);
            components.push(component);
            if !more {
                break;
            }
        }

        let mut instruction_length = 0;
        let has_instructions = components
            .last()
            .is_some_and(|c| c.flags.contains(ComponentFlags::WE_HAVE_INSTRUCTIONS));
        if has_instructions {
            instruction_length = reader.read_u16()?;
            reader.skip(instruction_length as usize)?;
        }

        Ok(Self {
            header,
            components,
            instruction_length,
        })
    }
}
