use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected end of data at position {position}: {needed} more byte(s) required")]
    UnexpectedEndOfData { position: usize, needed: usize },

    #[error("Position {position} out of range (buffer length {length})")]
    OutOfRange { position: usize, length: usize },

    #[error("Checksum mismatch in '{tag}' table: expected 0x{expected:08X}, computed 0x{actual:08X}")]
    ChecksumMismatch {
        tag: String,
        expected: u32,
        actual: u32,
    },

    #[error("Bad magic number in head table: 0x{0:08X}")]
    BadMagicNumber(u32),

    #[error("Missing required table: {0}")]
    MissingTable(String),

    #[error("Format violation at position {position}: {message}")]
    FormatViolation { position: usize, message: String },

    #[error("Compound glyph {glyph} exceeds component recursion limit ({depth})")]
    RecursionLimitExceeded { glyph: u16, depth: usize },

    #[error("Glyph {glyph} expands to {points} points, over the limit of {limit}")]
    GlyphTooComplex {
        glyph: u16,
        points: usize,
        limit: usize,
    },

    #[error("Glyph index {index} out of range (font has {count} glyphs)")]
    GlyphIndexOutOfRange { index: u16, count: u16 },
}

impl FontError {
    /// Whether this error only invalidates the glyph being decoded.
    ///
    /// Load-time structural errors (bad magic, checksum mismatch, missing
    /// tables) are never glyph-local.
    pub fn is_glyph_local(&self) -> bool {
        matches!(
            self,
            FontError::UnexpectedEndOfData { .. }
                | FontError::OutOfRange { .. }
                | FontError::FormatViolation { .. }
                | FontError::RecursionLimitExceeded { .. }
                | FontError::GlyphTooComplex { .. }
                | FontError::GlyphIndexOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FontError>;

/// Non-fatal condition encountered while loading a font.
///
/// Each diagnostic is also emitted through `tracing` at `warn` level when it
/// is recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// No (platform 0, format 4) cmap subtable was found; the character map
    /// is empty and every character resolves to glyph 0.
    UnsupportedCmap,
    /// A compound component is anchored by point matching, which is not
    /// implemented; the component was placed with zero translation.
    PointMatching { glyph: u16, component: u16 },
    /// A glyph failed to decode and was replaced by empty geometry.
    GlyphDecodeFailed { glyph: u16, reason: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnsupportedCmap => write!(
                f,
                "no cmap subtable with platform 0 and format 4; character map is empty"
            ),
            Diagnostic::PointMatching { glyph, component } => write!(
                f,
                "glyph {glyph}: component {component} uses point matching, placed at zero offset"
            ),
            Diagnostic::GlyphDecodeFailed { glyph, reason } => {
                write!(f, "glyph {glyph}: decode failed ({reason}), using empty geometry")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_font_error_display() {
        let error = FontError::BadMagicNumber(0xDEADBEEF);
        assert_eq!(
            error.to_string(),
            "Bad magic number in head table: 0xDEADBEEF"
        );

        let error = FontError::ChecksumMismatch {
            tag: "glyf".to_string(),
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            error.to_string(),
            "Checksum mismatch in 'glyf' table: expected 0x00000001, computed 0x00000002"
        );
    }

    #[test]
    fn test_font_error_from_io_error() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let font_error = FontError::from(io_error);

        match font_error {
            FontError::Io(ref err) => {
                assert_eq!(err.kind(), ErrorKind::NotFound);
            }
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_glyph_local_classification() {
        assert!(FontError::FormatViolation {
            position: 0,
            message: "bad".to_string()
        }
        .is_glyph_local());
        assert!(FontError::RecursionLimitExceeded { glyph: 3, depth: 8 }.is_glyph_local());
        assert!(FontError::GlyphTooComplex {
            glyph: 5,
            points: 10,
            limit: 4
        }
        .is_glyph_local());
        assert!(!FontError::BadMagicNumber(0).is_glyph_local());
        assert!(!FontError::MissingTable("loca".to_string()).is_glyph_local());
        assert!(!FontError::ChecksumMismatch {
            tag: "cmap".to_string(),
            expected: 0,
            actual: 1
        }
        .is_glyph_local());
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::PointMatching {
            glyph: 12,
            component: 4,
        };
        assert!(d.to_string().contains("point matching"));
        assert!(Diagnostic::UnsupportedCmap.to_string().contains("format 4"));
    }
}
