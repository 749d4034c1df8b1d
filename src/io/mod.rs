// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for sonar record streams.
//!
//! This module provides the format-independent pieces (record header,
//! driver traits, resynchronizer, reader and writer loops) and the format
//! drivers under [`formats`].

pub mod config;
pub mod detection;
pub mod formats;
pub mod metadata;
pub mod resync;
pub mod size_fields;

// Traits implemented by every format driver
pub mod traits;
pub use traits::{FormatDriver, HeaderValidator, SonarRecord};

// Generic reader/writer with format detection
pub mod reader;
pub mod writer;

pub use config::{ConfigError, SonarConfig};
pub use detection::detect_format;
pub use metadata::{CoordinateConvention, DataKind, FormatInfo, Record, RecordHeader};
pub use reader::{ReadStats, ReaderBuilder, SonarReader};
pub use resync::{ResyncStats, StreamResynchronizer};
pub use size_fields::{restore_size_fields, SizeFieldRestorer};
pub use writer::{SonarWriter, WriterBuilder};
