// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core traits for format-pluggable record I/O.
//!
//! The generic reader and writer loops only ever see a
//! `Box<dyn FormatDriver>`. A driver owns its strongly-typed per-stream
//! state, validates candidate headers for the resynchronizer, and decodes or
//! encodes one record at a time.

use std::any::Any;

use crate::types::GrowableBuffer;
use crate::Result;

use super::metadata::{DataKind, FormatInfo, Record, RecordHeader};
use crate::encoding::Framing;

/// Common accessors implemented by every decoded record type.
pub trait SonarRecord {
    /// Record type tag as stored in the header.
    fn record_type(&self) -> u32;

    /// Broad category of the record.
    fn kind(&self) -> DataKind;

    /// Short record name for logs and listings.
    fn name(&self) -> &'static str;

    /// Record timestamp in seconds since the Unix epoch, when it has one.
    fn time_seconds(&self) -> Option<f64>;
}

/// Format-specific structural validation of a candidate header.
///
/// The resynchronizer calls this for every window position until it
/// returns `true`.
pub trait HeaderValidator {
    /// True if the header names a known record type (and system id).
    fn accepts_header(&mut self, header: &RecordHeader) -> bool;
}

/// Per-format driver: the dispatch table behind the generic loops.
///
/// # Example
///
/// ```no_run
/// use sonarcodec::io::traits::FormatDriver;
///
/// fn describe(driver: &dyn FormatDriver) {
///     let info = driver.info();
///     println!("{} ({}), up to {} beams", info.name, info.system, info.max_beams);
/// }
/// ```
pub trait FormatDriver: HeaderValidator + Send {
    /// Capability table for this format.
    fn info(&self) -> &FormatInfo;

    /// Framing strategy chosen at registration.
    fn framing(&self) -> Framing {
        self.info().framing
    }

    /// Decode one complete framed record (header window included).
    fn read_one_record(&mut self, header: &RecordHeader, record: &[u8]) -> Result<Record>;

    /// Encode one record into `out`, replacing its contents.
    ///
    /// Returns the header of the encoded record.
    fn write_one_record(&mut self, record: &Record, out: &mut GrowableBuffer)
        -> Result<RecordHeader>;

    /// Reset per-stream state so the driver can serve a new stream.
    fn reset_state(&mut self);

    /// Human-readable one-line summary of the per-stream state.
    fn state_summary(&self) -> String;

    /// Downcast to `Any` for accessing format-specific functionality.
    fn as_any(&self) -> &dyn Any;

    /// Downcast mutably to `Any` for accessing format-specific functionality.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
