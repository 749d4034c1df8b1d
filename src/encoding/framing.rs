// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record framing conventions.
//!
//! Every format frames its records in one of two ways, chosen once when the
//! driver is registered:
//!
//! ```text
//! Plain        [record_type: 4][payload_size: 4][payload ...]
//! Checksummed  [size: 4][STX][type: 1][system_id: 2][body ...][ETX][checksum: 2]
//! ```
//!
//! For the checksummed framing, `size` counts every byte after the size
//! field and the checksum is the 16-bit wrapping sum of the bytes strictly
//! between STX and ETX (type, system id and body). Some recorders omit the
//! size field; such streams start directly with the 4-byte label
//! `[STX][type][system_id]` (see [`Framing::parse_label`]).

use serde::Serialize;

use crate::encoding::field::Endianness;
use crate::io::metadata::RecordHeader;
use crate::types::GrowableBuffer;
use crate::{CodecError, Result};

/// Start-of-record marker for checksummed framing.
pub const STX: u8 = 0x02;

/// End-of-record marker for checksummed framing.
pub const ETX: u8 = 0x03;

/// Size of the header window for both framings.
pub const HEADER_LEN: usize = 8;

/// Width of the checksummed size field.
pub const SIZE_FIELD_LEN: usize = 4;

/// `[STX][type][system_id]` label that follows the size field.
pub const LABEL_LEN: usize = 4;

/// Bytes counted by the size field that are not body: STX, type, system id, ETX, checksum.
pub const CHECKSUMMED_OVERHEAD: usize = 7;

/// Running 16-bit additive checksum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum16(u16);

impl Checksum16 {
    /// Start a new sum at zero.
    pub fn new() -> Self {
        Self(0)
    }

    /// Add every byte of `bytes` to the sum.
    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_add(u16::from(b));
        }
    }

    /// Current sum.
    pub fn value(&self) -> u16 {
        self.0
    }
}

/// Sum of `bytes` modulo 65536.
pub fn checksum16(bytes: &[u8]) -> u16 {
    let mut sum = Checksum16::new();
    sum.update(bytes);
    sum.value()
}

/// Header/trailer convention delimiting one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Framing {
    /// `(type, payload_size)` header, no trailer.
    Plain {
        /// Byte order of the header fields
        endianness: Endianness,
    },
    /// `(size, STX, type, system_id)` header with `ETX` and checksum trailer.
    Checksummed {
        /// Byte order of the header and checksum fields
        endianness: Endianness,
    },
}

impl Framing {
    /// Byte order of header fields.
    pub fn endianness(&self) -> Endianness {
        match self {
            Framing::Plain { endianness } | Framing::Checksummed { endianness } => *endianness,
        }
    }

    /// True for the checksummed framing.
    pub fn has_checksum(&self) -> bool {
        matches!(self, Framing::Checksummed { .. })
    }

    /// Size of the header window the resynchronizer slides over.
    pub fn header_len(&self) -> usize {
        HEADER_LEN
    }

    /// Parse a header window.
    ///
    /// Returns `None` when the window is structurally impossible for this
    /// framing (negative size, missing STX, size too small for the trailer).
    /// Whether the record type is known is the driver's call.
    pub fn parse_header(&self, window: &[u8]) -> Option<RecordHeader> {
        if window.len() < HEADER_LEN {
            return None;
        }
        match self {
            Framing::Plain { endianness } => {
                let record_type = read_u32(&window[0..4], *endianness);
                let size = read_u32(&window[4..8], *endianness) as i32;
                if size < 0 {
                    return None;
                }
                Some(RecordHeader::new(record_type, size as u32))
            }
            Framing::Checksummed { endianness } => {
                let size = read_u32(&window[0..4], *endianness);
                if window[4] != STX || (size as usize) < CHECKSUMMED_OVERHEAD {
                    return None;
                }
                let system_id = match endianness {
                    Endianness::Little => u16::from_le_bytes([window[6], window[7]]),
                    Endianness::Big => u16::from_be_bytes([window[6], window[7]]),
                };
                Some(RecordHeader::new(u32::from(window[5]), size).with_system_id(system_id))
            }
        }
    }

    /// Parse a checksummed label that is not preceded by a size field.
    ///
    /// The returned header has a zero size. Always `None` for the plain
    /// framing.
    pub fn parse_label(&self, label: &[u8]) -> Option<RecordHeader> {
        match self {
            Framing::Plain { .. } => None,
            Framing::Checksummed { endianness } => {
                if label.len() < LABEL_LEN || label[0] != STX {
                    return None;
                }
                let system_id = match endianness {
                    Endianness::Little => u16::from_le_bytes([label[2], label[3]]),
                    Endianness::Big => u16::from_be_bytes([label[2], label[3]]),
                };
                Some(RecordHeader::new(u32::from(label[1]), 0).with_system_id(system_id))
            }
        }
    }

    /// Bytes that follow the header window for this record.
    pub fn remaining_len(&self, header: &RecordHeader) -> usize {
        match self {
            Framing::Plain { .. } => header.payload_size as usize,
            Framing::Checksummed { .. } => {
                (header.payload_size as usize).saturating_sub(SIZE_FIELD_LEN)
            }
        }
    }

    /// Total bytes of a framed record, header included.
    pub fn record_len(&self, header: &RecordHeader) -> usize {
        HEADER_LEN + self.remaining_len(header)
    }

    /// Strip framing from a complete record and verify its trailer.
    ///
    /// `record` holds the header window followed by the remaining bytes.
    pub fn payload<'a>(&self, header: &RecordHeader, record: &'a [u8]) -> Result<&'a [u8]> {
        let expected_len = self.record_len(header);
        if record.len() != expected_len {
            return Err(CodecError::malformed(
                "Framing::payload",
                format!(
                    "record of type {:#x} has {} bytes, header declares {}",
                    header.record_type,
                    record.len(),
                    expected_len
                ),
            ));
        }
        match self {
            Framing::Plain { .. } => Ok(&record[HEADER_LEN..]),
            Framing::Checksummed { endianness } => {
                let etx_pos = record.len() - 3;
                if etx_pos < HEADER_LEN || record[etx_pos] != ETX {
                    return Err(CodecError::malformed(
                        "Framing::payload",
                        format!(
                            "record of type {:#x} is missing its end marker",
                            header.record_type
                        ),
                    ));
                }
                let stored = match endianness {
                    Endianness::Little => {
                        u16::from_le_bytes([record[etx_pos + 1], record[etx_pos + 2]])
                    }
                    Endianness::Big => {
                        u16::from_be_bytes([record[etx_pos + 1], record[etx_pos + 2]])
                    }
                };
                let computed = checksum16(&record[5..etx_pos]);
                if stored != computed {
                    return Err(CodecError::checksum_mismatch(
                        header.record_type,
                        stored,
                        computed,
                    ));
                }
                Ok(&record[HEADER_LEN..etx_pos])
            }
        }
    }

    /// Clear `out` and write a header placeholder for a new record.
    ///
    /// The body is appended after this call; [`Framing::finish`] then patches
    /// the size and appends any trailer.
    pub fn begin(&self, out: &mut GrowableBuffer, record_type: u32, system_id: u16) -> Result<()> {
        out.clear();
        match self {
            Framing::Plain { endianness } => {
                out.extend_from_slice(&write_u32(record_type, *endianness))?;
                out.extend_zeros(4)
            }
            Framing::Checksummed { endianness } => {
                let tag = u8::try_from(record_type).map_err(|_| {
                    CodecError::unsupported(format!(
                        "record type {record_type:#x} does not fit a one-byte tag"
                    ))
                })?;
                let sys = match endianness {
                    Endianness::Little => system_id.to_le_bytes(),
                    Endianness::Big => system_id.to_be_bytes(),
                };
                out.extend_zeros(4)?;
                out.extend_from_slice(&[STX, tag, sys[0], sys[1]])
            }
        }
    }

    /// Patch the size field and append the trailer.
    ///
    /// Returns the header describing the finished record.
    pub fn finish(&self, out: &mut GrowableBuffer) -> Result<RecordHeader> {
        if out.len() < HEADER_LEN {
            return Err(CodecError::buffer_too_short(HEADER_LEN, out.len(), 0));
        }
        match self {
            Framing::Plain { endianness } => {
                let payload_size = out.len() - HEADER_LEN;
                let size = i32::try_from(payload_size).map_err(|_| {
                    CodecError::unsupported(format!("payload of {payload_size} bytes"))
                })?;
                out.patch(4, &write_u32(size as u32, *endianness))?;
                let header = self
                    .parse_header(&out.as_slice()[..HEADER_LEN])
                    .ok_or_else(|| CodecError::malformed("Framing::finish", "invalid header"))?;
                Ok(header)
            }
            Framing::Checksummed { endianness } => {
                let sum = checksum16(&out.as_slice()[5..]);
                let sum_bytes = match endianness {
                    Endianness::Little => sum.to_le_bytes(),
                    Endianness::Big => sum.to_be_bytes(),
                };
                out.extend_from_slice(&[ETX, sum_bytes[0], sum_bytes[1]])?;
                let size = u32::try_from(out.len() - SIZE_FIELD_LEN).map_err(|_| {
                    CodecError::unsupported(format!("record of {} bytes", out.len()))
                })?;
                out.patch(0, &write_u32(size, *endianness))?;
                let header = self
                    .parse_header(&out.as_slice()[..HEADER_LEN])
                    .ok_or_else(|| CodecError::malformed("Framing::finish", "invalid header"))?;
                Ok(header)
            }
        }
    }
}

fn read_u32(bytes: &[u8], endianness: Endianness) -> u32 {
    let arr = [bytes[0], bytes[1], bytes[2], bytes[3]];
    match endianness {
        Endianness::Little => u32::from_le_bytes(arr),
        Endianness::Big => u32::from_be_bytes(arr),
    }
}

fn write_u32(value: u32, endianness: Endianness) -> [u8; 4] {
    match endianness {
        Endianness::Little => value.to_le_bytes(),
        Endianness::Big => value.to_be_bytes(),
    }
}
