//! Hershey font record encoding
//!
//! Each character becomes one line: the character code right-aligned in 5
//! columns, the length of the coordinate string right-aligned in 3, then
//! the left/right bounds followed by coordinate pairs. Every coordinate is
//! stored as a 7-bit character offset from `'R'`. A `" R"` pair lifts the
//! pen between polylines.

use thiserror::Error;
use ttf2hershey::{BoundingBox, Font, GlyphGeometry};

/// Character that encodes coordinate 0
const ORIGIN: i32 = 'R' as i32;

/// Half the coordinate span available on either side of the origin
const FULL_SCALE: i32 = 36;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Character {ch:?} has coordinate {value} outside the encodable range")]
    OutOfRange { ch: char, value: i32 },

    #[error("Font bounding box is empty; cannot derive a scale")]
    DegenerateFont,
}

/// Records for a run of characters plus the characters left out
#[derive(Debug, Default)]
pub struct Encoded {
    /// One record per encodable character, each ending in a newline
    pub records: String,
    /// Why each skipped character could not be encoded
    pub skipped: Vec<EncodeError>,
}

/// Encoder settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Extra spacing added to both bounds; also shrinks the scale
    pub kern: i32,
}

/// Encodes glyphs of one font at a fixed scale
pub struct HersheyEncoder<'a> {
    font: &'a Font,
    scale: f64,
    kern: i32,
}

impl<'a> HersheyEncoder<'a> {
    pub fn new(font: &'a Font, options: &EncodeOptions) -> Result<Self, EncodeError> {
        let bbox = font.global_bounding_box();
        let baseline = font.baseline();
        let span = [
            (i32::from(bbox.x_max) - i32::from(bbox.x_min)).abs(),
            (i32::from(bbox.y_max) - i32::from(bbox.y_min)).abs(),
            (i32::from(bbox.y_max) - baseline).abs(),
            (i32::from(bbox.y_min) - baseline).abs(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        if span == 0 {
            return Err(EncodeError::DegenerateFont);
        }

        let scale = f64::from((FULL_SCALE - options.kern) * 2) / f64::from(span);
        tracing::debug!(scale, span, kern = options.kern, "hershey scale");
        Ok(Self {
            font,
            scale,
            kern: options.kern,
        })
    }

    /// Design units to Hershey units
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Encode every character of `text`, one record per line.
    ///
    /// A character whose coordinates fall outside the encodable range is
    /// left out and reported in [`Encoded::skipped`].
    pub fn encode(&self, text: impl IntoIterator<Item = char>) -> Encoded {
        let mut encoded = Encoded::default();
        for ch in text {
            match self.encode_char(ch) {
                Ok(record) => {
                    encoded.records.push_str(&record);
                    encoded.records.push('\n');
                }
                Err(error) => {
                    tracing::warn!("skipping character: {error}");
                    encoded.skipped.push(error);
                }
            }
        }
        encoded
    }

    /// Encode one character as a record without the trailing newline
    pub fn encode_char(&self, ch: char) -> Result<String, EncodeError> {
        if ch == ' ' {
            return self.encode_space();
        }

        let empty = GlyphGeometry::empty();
        let glyph = self.font.geometry_for_char(ch).unwrap_or(&empty);
        let rect = glyph.rect;
        let x_center = f64::from(rect.x_min) + f64::from(rect.width()) / 2.0;
        let baseline = f64::from(self.font.baseline());

        let mut body = String::new();
        body.push(coordinate(ch, self.round(f64::from(rect.x_min) - x_center) - self.kern)?);
        body.push(coordinate(ch, self.round(f64::from(rect.x_max) - x_center) + self.kern)?);

        let polylines: Vec<_> = glyph.polylines.iter().filter(|p| !p.is_empty()).collect();
        for (i, polyline) in polylines.iter().enumerate() {
            // Close the outline by revisiting the first point
            for point in polyline.iter().chain(polyline.first()) {
                let x = point.x - x_center;
                let y = -(point.y - baseline);
                body.push(coordinate(ch, self.round(x))?);
                body.push(coordinate(ch, self.round(y))?);
            }
            if i + 1 != polylines.len() {
                body.push_str(" R");
            }
        }

        Ok(format!("{:>5}{:>3}{}", ch as u32, body.len(), body))
    }

    /// Space has no outline; it is half as wide as `x`
    fn encode_space(&self) -> Result<String, EncodeError> {
        let rect = self
            .font
            .geometry_for_char('x')
            .map(|g| g.rect)
            .unwrap_or_else(BoundingBox::default);
        let x_center = (f64::from(rect.x_min) + f64::from(rect.x_max)) / 2.0;
        let left = ((f64::from(rect.x_min) - x_center) / 2.0 * self.scale) as i32;
        let right = ((f64::from(rect.x_max) - x_center) / 2.0 * self.scale) as i32;

        let mut body = String::with_capacity(2);
        body.push(coordinate(' ', left)?);
        body.push(coordinate(' ', right)?);
        Ok(format!("{:>5}{:>3}{}", ' ' as u32, body.len(), body))
    }

    fn round(&self, units: f64) -> i32 {
        (units * self.scale).round() as i32
    }
}

/// ASCII character for a Hershey coordinate; line breaks would split the record
fn coordinate(ch: char, value: i32) -> Result<char, EncodeError> {
    match u8::try_from(value + ORIGIN) {
        Ok(byte) if byte.is_ascii() && byte != b'\n' && byte != b'\r' => Ok(char::from(byte)),
        _ => Err(EncodeError::OutOfRange { ch, value }),
    }
}
