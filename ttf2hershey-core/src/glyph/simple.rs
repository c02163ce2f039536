//! Simple glyph decoding

use super::{ContourPoint, GlyphHeader};
use crate::error::{FontError, Result};
use crate::parser::FontReader;
use bitflags::bitflags;

bitflags! {
    /// Per-point flags of a simple glyph
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PointFlags: u8 {
        /// Point is on the outline
        const ON_CURVE = 1 << 0;
        /// x delta is one unsigned byte
        const X_SHORT_VECTOR = 1 << 1;
        /// y delta is one unsigned byte
        const Y_SHORT_VECTOR = 1 << 2;
        /// Next byte is a count of additional points using this flag
        const REPEAT = 1 << 3;
        /// Short x is positive; otherwise x is unchanged (no delta stored)
        const X_IS_SAME_OR_POSITIVE = 1 << 4;
        /// Short y is positive; otherwise y is unchanged (no delta stored)
        const Y_IS_SAME_OR_POSITIVE = 1 << 5;
        const OVERLAP_SIMPLE = 1 << 6;
    }
}

/// A glyph described directly by its contours
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleGlyph {
    pub header: GlyphHeader,
    /// Index of the last point of each contour
    pub contour_ends: Vec<u16>,
    /// Length of the skipped hinting program
    pub instruction_length: u16,
    /// Points grouped by contour
    pub contours: Vec<Vec<ContourPoint>>,
}

impl SimpleGlyph {
    /// Decode the body following `header`
    pub fn parse(reader: &mut FontReader<'_>, header: GlyphHeader) -> Result<Self> {
        let contour_count = header.number_of_contours.max(0) as usize;
        let ends_position = reader.tell();
        let contour_ends = (0..contour_count)
            .map(|_| reader.read_u16())
            .collect::<Result<Vec<u16>>>()?;

        if contour_ends.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FontError::FormatViolation {
                position: ends_position,
                message: format!("contour end indices not increasing: {contour_ends:?}"),
            });
        }

        let instruction_length = reader.read_u16()?;
        reader.skip(instruction_length as usize)?;

        let num_points = match contour_ends.iter().max() {
            Some(&last) => last as usize + 1,
            None => {
                return Ok(Self {
                    header,
                    contour_ends,
                    instruction_length,
                    contours: Vec::new(),
                })
            }
        };

        let flags = read_flags(reader, num_points)?;
        let xs = read_coordinates(
            reader,
            &flags,
            PointFlags::X_SHORT_VECTOR,
            PointFlags::X_IS_SAME_OR_POSITIVE,
        )?;
        let ys = read_coordinates(
            reader,
            &flags,
            PointFlags::Y_SHORT_VECTOR,
            PointFlags::Y_IS_SAME_OR_POSITIVE,
        )?;

        let points: Vec<ContourPoint> = flags
            .iter()
            .zip(xs.iter().zip(ys.iter()))
            .map(|(flag, (&x, &y))| ContourPoint::new(x, y, flag.contains(PointFlags::ON_CURVE)))
            .collect();

        let mut contours = Vec::with_capacity(contour_count);
        let mut start = 0usize;
        for &end in &contour_ends {
            let end = end as usize + 1;
            contours.push(points[start..end].to_vec());
            start = end;
        }

        Ok(Self {
            header,
            contour_ends,
            instruction_length,
            contours,
        })
    }

    /// Total number of points over all contours
    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }
}

/// Decode `num_points` flags, expanding REPEAT runs
fn read_flags(reader: &mut FontReader<'_>, num_points: usize) -> Result<Vec<PointFlags>> {
    let mut flags = Vec::with_capacity(num_points);
    while flags.len() < num_points {
        let flag = PointFlags::from_bits_retain(reader.read_u8()?);
        flags.push(flag);

        if flag.contains(PointFlags::REPEAT) {
            let position = reader.tell();
            let count = reader.read_u8()? as usize;
            if flags.len() + count > num_points {
                return Err(FontError::FormatViolation {
                    position,
                    message: format!(
                        "flag repeat count {count} overruns point count {num_points}"
                    ),
                });
            }
            flags.extend(std::iter::repeat(flag).take(count));
        }
    }
    Ok(flags)
}

/// Decode one axis of coordinates as running sums of deltas
fn read_coordinates(
    reader: &mut FontReader<'_>,
    flags: &[PointFlags],
    short_vector: PointFlags,
    same_or_positive: PointFlags,
) -> Result<Vec<i32>> {
    let mut value = 0i32;
    let mut coordinates = Vec::with_capacity(flags.len());
    for flag in flags {
        if flag.contains(short_vector) {
            let delta = i32::from(reader.read_u8()?);
            if flag.contains(same_or_positive) {
                value += delta;
            } else {
                value -= delta;
            }
        } else if !flag.contains(same_or_positive) {
            value += i32::from(reader.read_i16()?);
        }
        coordinates.push(value);
    }
    Ok(coordinates)
}
