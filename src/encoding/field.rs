// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-order-aware field primitives.
//!
//! Records are decoded and encoded one field at a time, strictly left to
//! right. Nothing is ever reinterpreted in place: every integer and float is
//! assembled from bytes with an explicit [`Endianness`], so the same code is
//! correct on either-endian hosts.
//!
//! # Example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sonarcodec::encoding::{Endianness, FieldReader, FieldWriter};
//! use sonarcodec::types::GrowableBuffer;
//!
//! let mut buf = GrowableBuffer::new();
//! let mut writer = FieldWriter::new(&mut buf, Endianness::Big);
//! writer.write_u16(0x0244)?;
//! writer.pad(2)?;
//! writer.write_f32(1.5)?;
//!
//! let mut reader = FieldReader::new(buf.as_slice(), Endianness::Big);
//! assert_eq!(reader.read_u16()?, 0x0244);
//! reader.skip_padding(2)?;
//! assert_eq!(reader.read_f32()?, 1.5);
//! # Ok(())
//! # }
//! ```

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::types::GrowableBuffer;
use crate::{CodecError, Result};

/// Byte order of a format's multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl std::fmt::Display for Endianness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endianness::Little => write!(f, "little-endian"),
            Endianness::Big => write!(f, "big-endian"),
        }
    }
}

macro_rules! read_primitive {
    ($name:ident, $ty:ty, $size:expr, $method:ident) => {
        #[doc = concat!("Read a `", stringify!($ty), "`.")]
        #[inline]
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.take($size)?;
            Ok(match self.endianness {
                Endianness::Little => LittleEndian::$method(bytes),
                Endianness::Big => BigEndian::$method(bytes),
            })
        }
    };
}

macro_rules! write_primitive {
    ($name:ident, $ty:ty, $size:expr, $method:ident) => {
        #[doc = concat!("Write a `", stringify!($ty), "`.")]
        #[inline]
        pub fn $name(&mut self, value: $ty) -> Result<()> {
            let mut bytes = [0u8; $size];
            match self.endianness {
                Endianness::Little => LittleEndian::$method(&mut bytes, value),
                Endianness::Big => BigEndian::$method(&mut bytes, value),
            }
            self.buf.extend_from_slice(&bytes)
        }
    };
}

/// Cursor over one record payload.
///
/// Reads past the end of the payload fail with
/// [`CodecError::BufferTooShort`]; array counts are checked up front with
/// [`FieldReader::ensure_items`].
pub struct FieldReader<'a> {
    /// Record payload
    data: &'a [u8],
    /// Current read position
    offset: usize,
    /// Byte order of multi-byte fields
    endianness: Endianness,
    /// Record name used in error messages
    context: &'static str,
}

impl<'a> FieldReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8], endianness: Endianness) -> Self {
        Self {
            data,
            offset: 0,
            endianness,
            context: "record",
        }
    }

    /// Name the record being decoded, for error messages.
    pub fn with_context(mut self, context: &'static str) -> Self {
        self.context = context;
        self
    }

    /// Get the current position relative to the payload start.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Get the remaining bytes available to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if at end of payload.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Byte order in use.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::buffer_too_short(
                n,
                self.remaining(),
                self.offset as u64,
            ));
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    /// Skip documented padding bytes without interpreting them.
    pub fn skip_padding(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Check that `count` items of `item_size` bytes fit in the rest of the payload.
    ///
    /// Must be called before allocating storage for a counted array.
    pub fn ensure_items(&self, count: usize, item_size: usize) -> Result<()> {
        let needed = count.checked_mul(item_size);
        match needed {
            Some(needed) if needed <= self.remaining() => Ok(()),
            _ => Err(CodecError::malformed(
                self.context,
                format!(
                    "declared count {count} x {item_size} bytes exceeds the {} bytes left at offset {}",
                    self.remaining(),
                    self.offset
                ),
            )),
        }
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a single signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    read_primitive!(read_u16, u16, 2, read_u16);
    read_primitive!(read_i16, i16, 2, read_i16);
    read_primitive!(read_u32, u32, 4, read_u32);
    read_primitive!(read_i32, i32, 4, read_i32);
    read_primitive!(read_f32, f32, 4, read_f32);
    read_primitive!(read_f64, f64, 8, read_f64);

    /// Read `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Read a fixed-width byte field, such as a NUL-padded name.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}

/// Appends encoded fields to a [`GrowableBuffer`].
pub struct FieldWriter<'a> {
    /// Destination buffer
    buf: &'a mut GrowableBuffer,
    /// Byte order of multi-byte fields
    endianness: Endianness,
}

impl<'a> FieldWriter<'a> {
    /// Create a writer appending to `buf`.
    pub fn new(buf: &'a mut GrowableBuffer, endianness: Endianness) -> Self {
        Self { buf, endianness }
    }

    /// Current length of the destination buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Write `n` zero bytes of padding.
    pub fn pad(&mut self, n: usize) -> Result<()> {
        self.buf.extend_zeros(n)
    }

    /// Write a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.extend_from_slice(&[value])
    }

    /// Write a single signed byte.
    #[inline]
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.buf.extend_from_slice(&[value as u8])
    }

    write_primitive!(write_u16, u16, 2, write_u16);
    write_primitive!(write_i16, i16, 2, write_i16);
    write_primitive!(write_u32, u32, 4, write_u32);
    write_primitive!(write_i32, i32, 4, write_i32);
    write_primitive!(write_f32, f32, 4, write_f32);
    write_primitive!(write_f64, f64, 8, write_f64);

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut buf = GrowableBuffer::new();
        let mut w = FieldWriter::new(&mut buf, Endianness::Little);
        w.write_i32(0x01df01df).unwrap();
        w.write_u16(0x1234).unwrap();
        assert_eq!(buf.as_slice(), &[0xdf, 0x01, 0xdf, 0x01, 0x34, 0x12]);
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = GrowableBuffer::new();
        let mut w = FieldWriter::new(&mut buf, Endianness::Big);
        w.write_u32(24).unwrap();
        w.write_i16(-2).unwrap();
        assert_eq!(buf.as_slice(), &[0, 0, 0, 24, 0xff, 0xfe]);
    }

    #[test]
    fn test_read_mixed_fields() {
        let data = [
            0x2a, // u8
            0xff, // i8
            0x00, 0x00, 0x80, 0x3f, // f32 1.0 LE
            0, 0, 0, 0, 0, 0, 0xf0, 0xbf, // f64 -1.0 LE
        ];
        let mut r = FieldReader::new(&data, Endianness::Little);
        assert_eq!(r.read_u8().unwrap(), 42);
        assert_eq!(r.read_i8().unwrap(), -1);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert_eq!(r.read_f64().unwrap(), -1.0);
        assert!(r.is_at_end());
    }

    #[test]
    fn test_read_past_end() {
        let data = [1, 2, 3];
        let mut r = FieldReader::new(&data, Endianness::Big);
        r.skip_padding(2).unwrap();
        let err = r.read_u16().unwrap_err();
        assert!(matches!(
            err,
            CodecError::BufferTooShort {
                requested: 2,
                available: 1,
                cursor_pos: 2
            }
        ));
    }

    #[test]
    fn test_ensure_items_guard() {
        let data = [0u8; 20];
        let r = FieldReader::new(&data, Endianness::Little).with_context("SxpPing");
        assert!(r.ensure_items(2, 10).is_ok());
        let err = r.ensure_items(3, 10).unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { .. }));
        assert!(err.to_string().contains("SxpPing"));
        assert!(r.ensure_items(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_fixed_array_keeps_every_byte() {
        // non-UTF-8 byte and a tail after the NUL
        let data = [b'N', 0xb0, 0, b'e', 7];
        let mut r = FieldReader::new(&data, Endianness::Little);
        let name: [u8; 4] = r.read_array().unwrap();
        assert_eq!(name, [b'N', 0xb0, 0, b'e']);
        assert_eq!(r.remaining(), 1);
        assert!(r.read_array::<2>().is_err());
    }

    #[test]
    fn test_padding_is_zero() {
        let mut buf = GrowableBuffer::new();
        buf.extend_from_slice(&[0xaa]).unwrap();
        let mut w = FieldWriter::new(&mut buf, Endianness::Little);
        w.pad(3).unwrap();
        assert_eq!(buf.as_slice(), &[0xaa, 0, 0, 0]);
    }
}
