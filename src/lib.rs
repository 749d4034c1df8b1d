// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Sonarcodec
//!
//! Multibeam sonar record codec library for SEA SWATHplus and Simrad EM files.
//!
//! The library reads and writes binary record streams through a
//! format-pluggable driver layer:
//! - **SWATHplus** processed and raw files in [`io::formats::swathplus`](crate::io::formats::swathplus)
//! - **Simrad EM** raw datagrams in [`io::formats::simrad`](crate::io::formats::simrad)
//! - **Georeferencing** of soundings to revised navigation in [`transform`](crate::transform)
//!
//! ## Architecture
//!
//! - `core/` - error taxonomy and driver registry
//! - `types/` - growable record buffer
//! - `encoding/` - primitive field codec and record framing
//! - `io/` - resynchronizer, reader/writer loops, detection, config and format drivers
//! - `transform/` - affine matrices, quaternions and the georeference state machine
//!
//! ## Example: Reading a file
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sonarcodec::SonarReader;
//!
//! let mut reader = SonarReader::open("0001_20020315.all")?;
//! for record in &mut reader {
//!     let record = record?;
//!     println!("{record}");
//! }
//! println!("skipped {} bytes", reader.stats().resync.bytes_skipped);
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Copying records
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sonarcodec::{FormatId, SonarReader, SonarWriter};
//!
//! let reader = SonarReader::open("line.sxp")?;
//! let mut writer = SonarWriter::create("copy.sxp", FormatId::Swathplus)?;
//! for record in reader {
//!     writer.write_record(&record?)?;
//! }
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{CodecError, DriverRegistry, FormatId, Result, Severity};

// Field codec and framing
pub mod encoding;

// Coordinate transforms
pub mod transform;

// Record buffer
pub mod types;

// I/O (traits, metadata, resync, reader/writer, formats)
pub mod io;

// Re-export key I/O types
pub use io::metadata::{DataKind, FormatInfo, Record, RecordHeader};
pub use io::traits::{FormatDriver, HeaderValidator, SonarRecord};
pub use io::{ReadStats, ReaderBuilder, SonarConfig, SonarReader, SonarWriter, WriterBuilder};

// Re-export format records
pub use io::formats::simrad::SimradRecord;
pub use io::formats::swathplus::SwathplusRecord;
