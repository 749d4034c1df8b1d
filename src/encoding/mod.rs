// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Binary field encoding.
//!
//! - [`field`]: primitive reads and writes with explicit byte order
//! - [`framing`]: record headers, trailers and checksums

pub mod field;
pub mod framing;

pub use field::{Endianness, FieldReader, FieldWriter};
pub use framing::{checksum16, Checksum16, Framing};
