// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Simrad EM format driver.

use std::any::Any;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::core::registry::FormatId;
use crate::io::metadata::{CoordinateConvention, DataKind, FormatInfo, Record, RecordHeader};
use crate::io::traits::{FormatDriver, HeaderValidator, SonarRecord};
use crate::types::GrowableBuffer;
use crate::{CodecError, Result};

use super::codec::{self, ENDIANNESS, FRAMING};
use super::{
    datagram_name, is_known_datagram_type, is_known_sonar, BEAMWIDTH, EM3000, ID_SVP, MAX_BEAMS,
    MAX_DATAGRAM_SIZE, MAX_PIXELS,
};

/// Capability table for Simrad EM raw datagrams.
pub fn format_info() -> FormatInfo {
    FormatInfo {
        id: FormatId::SimradEm,
        name: "EM300RAW",
        system: "SIMRAD2",
        description: "Simrad EM120, EM300, EM1002, EM2000 and EM3000 multibeam vendor \
                      format: bathymetry, amplitude and sidescan in binary datagrams",
        aliases: &["simrad_em", "simrad2", "56"],
        extensions: &["all"],
        max_record_size: MAX_DATAGRAM_SIZE,
        max_beams: MAX_BEAMS,
        max_amplitude_beams: MAX_BEAMS,
        max_pixels: MAX_PIXELS,
        variable_beams: true,
        beam_flagging: false,
        nav_source: DataKind::Position,
        heading_source: DataKind::Position,
        attitude_source: DataKind::Attitude,
        beamwidth_xtrack: BEAMWIDTH,
        beamwidth_ltrack: BEAMWIDTH,
        endianness: ENDIANNESS,
        framing: FRAMING,
        coordinates: CoordinateConvention::VesselRelative,
    }
}

/// Per-stream state carried between datagrams.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimradState {
    /// Sonar model of the last accepted header
    pub last_sonar: Option<u16>,
    /// Type of the last accepted header
    pub last_record_type: Option<u8>,
    /// Datagrams decoded, by type
    pub counts: BTreeMap<u8, u64>,
    /// Datagrams decoded
    pub records_read: u64,
    /// Datagrams encoded
    pub records_written: u64,
}

/// Driver for Simrad EM raw datagram streams.
pub struct SimradDriver {
    info: FormatInfo,
    state: SimradState,
}

impl Default for SimradDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimradDriver {
    /// Create a driver with fresh state.
    pub fn new() -> Self {
        Self {
            info: format_info(),
            state: SimradState::default(),
        }
    }

    /// Boxed constructor for the registry.
    pub fn allocate() -> Box<dyn FormatDriver> {
        Box::new(Self::new())
    }

    /// Per-stream state.
    pub fn state(&self) -> &SimradState {
        &self.state
    }
}

impl HeaderValidator for SimradDriver {
    /// Known type from a known sonar; some EM3000 files also carry SVP
    /// datagrams with sonar 0.
    fn accepts_header(&mut self, header: &RecordHeader) -> bool {
        if !is_known_datagram_type(header.record_type) {
            return false;
        }
        // checked above: the type fits a byte
        let datagram_type = header.record_type as u8;

        if is_known_sonar(header.system_id) {
            self.state.last_sonar = Some(header.system_id);
            self.state.last_record_type = Some(datagram_type);
            return true;
        }
        if datagram_type == ID_SVP && header.system_id == 0 && self.state.last_sonar == Some(EM3000)
        {
            trace!("accepting SVP datagram with sonar 0 after EM3000 data");
            self.state.last_record_type = Some(datagram_type);
            return true;
        }
        false
    }
}

impl FormatDriver for SimradDriver {
    fn info(&self) -> &FormatInfo {
        &self.info
    }

    fn read_one_record(&mut self, header: &RecordHeader, record: &[u8]) -> Result<Record> {
        let body = FRAMING.payload(header, record)?;
        let decoded = codec::decode(header, body)?;
        self.state.records_read += 1;
        // decoded types always fit a byte
        *self
            .state
            .counts
            .entry(decoded.record_type() as u8)
            .or_insert(0) += 1;
        Ok(Record::Simrad(decoded))
    }

    fn write_one_record(
        &mut self,
        record: &Record,
        out: &mut GrowableBuffer,
    ) -> Result<RecordHeader> {
        match record {
            Record::Simrad(r) => {
                let header = codec::encode(r, out)?;
                self.state.records_written += 1;
                Ok(header)
            }
            other => Err(CodecError::unsupported(format!(
                "{} record in a Simrad EM stream",
                other.name()
            ))),
        }
    }

    fn reset_state(&mut self) {
        debug!(summary = %self.state_summary(), "resetting Simrad EM state");
        self.state = SimradState::default();
    }

    fn state_summary(&self) -> String {
        let counts = self
            .state
            .counts
            .iter()
            .map(|(t, n)| format!("{}={n}", datagram_name(*t)))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{} datagrams read, {} written, last sonar {}, last type {} [{}]",
            self.state.records_read,
            self.state.records_written,
            self.state
                .last_sonar
                .map_or_else(|| "none".to_string(), |s| format!("EM{s}")),
            self.state
                .last_record_type
                .map_or("none", datagram_name),
            counts
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
