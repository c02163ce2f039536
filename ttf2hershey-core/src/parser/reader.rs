//! Sequential big-endian reader over an in-memory font buffer
//!
//! [`FontReader`] knows nothing about font semantics: it decodes the
//! primitive types used by the TrueType format (integers, `Fixed`,
//! `F2Dot14`, `Fword`, tags) and tracks a seekable position. Every read
//! either consumes exactly its width or fails without moving the cursor.

use crate::error::{FontError, Result};

/// Bounds-checked big-endian cursor
#[derive(Debug, Clone)]
pub struct FontReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FontReader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a reader positioned at `pos`
    pub fn at(data: &'a [u8], pos: usize) -> Result<Self> {
        let mut reader = Self::new(data);
        reader.seek(pos)?;
        Ok(reader)
    }

    /// Move to `pos`, returning the previous position.
    ///
    /// Seeking exactly to the end of the buffer is allowed; any read from
    /// there fails.
    pub fn seek(&mut self, pos: usize) -> Result<usize> {
        if pos > self.data.len() {
            return Err(FontError::OutOfRange {
                position: pos,
                length: self.data.len(),
            });
        }
        let old = self.pos;
        self.pos = pos;
        Ok(old)
    }

    /// Current position
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Total buffer length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// The whole underlying buffer
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Run `f` with the cursor at `pos`, then restore the previous position.
    ///
    /// The position is restored whether or not `f` succeeds.
    pub fn with_position<T>(
        &mut self,
        pos: usize,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let old = self.seek(pos)?;
        let result = f(self);
        self.pos = old;
        result
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(FontError::UnexpectedEndOfData {
                position: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Skip `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Read `n` raw bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a big-endian i16; values >= 0x8000 are negative
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    /// Read an `FWORD` (signed design units)
    pub fn read_fword(&mut self) -> Result<i16> {
        self.read_i16()
    }

    /// Read a signed 2.14 fixed-point number
    pub fn read_f2dot14(&mut self) -> Result<f64> {
        Ok(f64::from(self.read_i16()?) / f64::from(1u32 << 14))
    }

    /// Read a signed 16.16 fixed-point number
    pub fn read_fixed(&mut self) -> Result<f64> {
        Ok(f64::from(self.read_i32()?) / f64::from(1u32 << 16))
    }

    /// Read a `LONGDATETIME` (seconds since 1904-01-01)
    pub fn read_long_datetime(&mut self) -> Result<i64> {
        let high = self.read_u32()?;
        let low = self.read_u32()?;
        Ok(((u64::from(high) << 32) | u64::from(low)) as i64)
    }

    /// Read a 4-byte table tag
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// Read `length` bytes as single-byte (Latin-1) characters
    pub fn read_string(&mut self, length: usize) -> Result<String> {
        Ok(self.take(length)?.iter().map(|&b| char::from(b)).collect())
    }
}
