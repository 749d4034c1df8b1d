// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared metadata types for all sonar record formats.
//!
//! This module provides the types every format has in common: the record
//! header found by the resynchronizer, the decoded record union, and the
//! capability description each driver publishes.

use std::fmt;

use serde::Serialize;

use crate::core::registry::FormatId;
use crate::encoding::{Endianness, Framing};
use crate::io::formats::simrad::SimradRecord;
use crate::io::formats::swathplus::SwathplusRecord;
use crate::io::traits::SonarRecord;

/// The fixed field group at the start of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RecordHeader {
    /// Format-specific record type tag
    pub record_type: u32,
    /// Size field as stored (payload bytes, or bytes after the size field
    /// for checksummed framing)
    pub payload_size: u32,
    /// Sonar model or system id (0 when the format has none)
    pub system_id: u16,
}

impl RecordHeader {
    /// Create a header without a system id.
    pub fn new(record_type: u32, payload_size: u32) -> Self {
        Self {
            record_type,
            payload_size,
            system_id: 0,
        }
    }

    /// Set the system id.
    pub fn with_system_id(mut self, system_id: u16) -> Self {
        self.system_id = system_id;
        self
    }
}

/// Broad category of a record, independent of format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// File or stream header
    FileHeader,
    /// Ping with soundings
    Ping,
    /// Roll/pitch/heave samples
    Attitude,
    /// Navigation fix
    Position,
    /// Heading samples
    Heading,
    /// Surface sound velocity
    SoundSpeed,
    /// Altitude or echosounder depth
    Altitude,
    /// Tide correction
    Tide,
    /// Height (heave/GPS height)
    Height,
    /// Clock synchronization
    Clock,
    /// Seabed classification
    SeabedClass,
    /// Free text
    Comment,
    /// Sensor lever arm or mounting offset
    SensorOffset,
    /// Projection identifier
    Projection,
    /// Parameter block carried as opaque bytes
    Parameter,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataKind::FileHeader => "file-header",
            DataKind::Ping => "ping",
            DataKind::Attitude => "attitude",
            DataKind::Position => "position",
            DataKind::Heading => "heading",
            DataKind::SoundSpeed => "sound-speed",
            DataKind::Altitude => "altitude",
            DataKind::Tide => "tide",
            DataKind::Height => "height",
            DataKind::Clock => "clock",
            DataKind::SeabedClass => "seabed-class",
            DataKind::Comment => "comment",
            DataKind::SensorOffset => "sensor-offset",
            DataKind::Projection => "projection",
            DataKind::Parameter => "parameter",
        };
        f.write_str(name)
    }
}

/// How sounding coordinates are expressed in the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateConvention {
    /// Projected easting/northing in metres, depth positive down
    ProjectedMetres,
    /// Vessel-relative across/along-track distances, depth positive down
    VesselRelative,
}

/// Capability table published by a format driver.
#[derive(Debug, Clone, Serialize)]
pub struct FormatInfo {
    /// Registry key
    pub id: FormatId,
    /// Short format name
    pub name: &'static str,
    /// Instrument system name
    pub system: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Other names accepted on the command line and in configuration
    pub aliases: &'static [&'static str],
    /// File extensions associated with the format
    pub extensions: &'static [&'static str],
    /// Largest framed record the reader will accept, header included
    pub max_record_size: usize,
    /// Maximum bathymetry beams per ping
    pub max_beams: usize,
    /// Maximum amplitude beams per ping
    pub max_amplitude_beams: usize,
    /// Maximum sidescan pixels per ping
    pub max_pixels: usize,
    /// Ping beam count varies from ping to ping
    pub variable_beams: bool,
    /// Format stores per-beam flags
    pub beam_flagging: bool,
    /// Record kind carrying navigation
    pub nav_source: DataKind,
    /// Record kind carrying heading
    pub heading_source: DataKind,
    /// Record kind carrying roll/pitch/heave
    pub attitude_source: DataKind,
    /// Default across-track beam width (degrees)
    pub beamwidth_xtrack: f64,
    /// Default along-track beam width (degrees)
    pub beamwidth_ltrack: f64,
    /// Byte order of all fields
    pub endianness: Endianness,
    /// Record framing
    pub framing: Framing,
    /// Sounding coordinate convention
    pub coordinates: CoordinateConvention,
}

/// A decoded record of any supported format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "record", rename_all = "lowercase")]
pub enum Record {
    /// SEA SWATHplus SXP/SXI record
    Swathplus(SwathplusRecord),
    /// Simrad EM multibeam record
    Simrad(SimradRecord),
}

impl SonarRecord for Record {
    fn record_type(&self) -> u32 {
        match self {
            Record::Swathplus(r) => r.record_type(),
            Record::Simrad(r) => r.record_type(),
        }
    }

    fn kind(&self) -> DataKind {
        match self {
            Record::Swathplus(r) => r.kind(),
            Record::Simrad(r) => r.kind(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Record::Swathplus(r) => r.name(),
            Record::Simrad(r) => r.name(),
        }
    }

    fn time_seconds(&self) -> Option<f64> {
        match self {
            Record::Swathplus(r) => r.time_seconds(),
            Record::Simrad(r) => r.time_seconds(),
        }
    }
}

impl From<SwathplusRecord> for Record {
    fn from(record: SwathplusRecord) -> Self {
        Record::Swathplus(record)
    }
}

impl From<SimradRecord> for Record {
    fn from(record: SimradRecord) -> Self {
        Record::Simrad(record)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Swathplus(r) => fmt::Display::fmt(r, f),
            Record::Simrad(r) => fmt::Display::fmt(r, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_header_builder() {
        let header = RecordHeader::new(0x44, 120).with_system_id(300);
        assert_eq!(header.record_type, 0x44);
        assert_eq!(header.payload_size, 120);
        assert_eq!(header.system_id, 300);
    }

    #[test]
    fn test_data_kind_display() {
        assert_eq!(DataKind::Ping.to_string(), "ping");
        assert_eq!(DataKind::SensorOffset.to_string(), "sensor-offset");
    }
}
