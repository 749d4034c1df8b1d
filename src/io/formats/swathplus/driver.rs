// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! SWATHplus format driver and per-stream state.

use std::any::Any;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::registry::FormatId;
use crate::io::metadata::{CoordinateConvention, DataKind, FormatInfo, Record, RecordHeader};
use crate::io::traits::{FormatDriver, HeaderValidator, SonarRecord};
use crate::transform::{Georeferenced, LeverArm, Matrix, PingGeometry, Vector3};
use crate::types::GrowableBuffer;
use crate::{CodecError, Result};

use super::codec::{self, ENDIANNESS, FRAMING};
use super::records::{SwathplusRecord, SxpPing, SxpPoint, POINT_ACCEPTED, POINT_REJECTED};
use super::{
    is_known_record_type, BEAMWIDTH_117KHZ, BEAMWIDTH_234KHZ, BEAMWIDTH_468KHZ, MAX_BEAMS,
    MAX_PIXELS, MAX_RECORD_SIZE,
};

/// Time offset per transducer so simultaneous pings stay distinct (s).
const TRANSDUCER_TIME_NUDGE: f64 = 1e-5;

/// Capability table for SWATHplus.
pub fn format_info() -> FormatInfo {
    FormatInfo {
        id: FormatId::Swathplus,
        name: "SWPLSSXP",
        system: "SWATHPLUS",
        description: "SEA SWATHplus interferometric sonar: vendor processed (SXP) \
                      and parsed (SXI) data, bathymetry and amplitude, variable beams",
        aliases: &["222"],
        extensions: &["sxp", "sxi"],
        max_record_size: MAX_RECORD_SIZE,
        max_beams: MAX_BEAMS,
        max_amplitude_beams: MAX_BEAMS,
        max_pixels: MAX_PIXELS,
        variable_beams: true,
        beam_flagging: true,
        nav_source: DataKind::Ping,
        heading_source: DataKind::Ping,
        attitude_source: DataKind::Ping,
        beamwidth_xtrack: BEAMWIDTH_234KHZ,
        beamwidth_ltrack: BEAMWIDTH_234KHZ,
        endianness: ENDIANNESS,
        framing: FRAMING,
        coordinates: CoordinateConvention::ProjectedMetres,
    }
}

/// Across- and along-track beam width for a sonar frequency in Hz.
pub fn beamwidth_for_frequency(frequency: f64) -> f64 {
    if frequency < 200_000.0 {
        BEAMWIDTH_117KHZ
    } else if frequency < 400_000.0 {
        BEAMWIDTH_234KHZ
    } else {
        BEAMWIDTH_468KHZ
    }
}

/// Per-stream state carried between records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SwathplusState {
    /// A ping above [`MAX_BEAMS`] soundings has been reported
    pub warned_oversize: bool,
    /// Transducer whose pings drive the speed estimate
    pub speed_reference: Option<u8>,
    /// Last (easting, northing, time) of the reference transducer
    pub last_fix: Option<(f64, f64, f64)>,
    /// Most recent speed estimate (m/s)
    pub speed: f64,
    /// Projection identifier, once seen
    pub projection: Option<String>,
    /// Records decoded
    pub records_read: u64,
    /// Processed pings decoded
    pub pings_read: u64,
    /// Records encoded
    pub records_written: u64,
}

/// Navigation and attitude summary of a processed ping.
///
/// Roll is positive starboard up and heave positive up, the reverse of the
/// values stored in the ping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PingNavigation {
    /// Ping time nudged by transducer number (s)
    pub time_d: f64,
    /// Transducer easting (m)
    pub navlon: f64,
    /// Transducer northing (m)
    pub navlat: f64,
    /// Speed over ground from the reference transducer (m/s)
    pub speed: f64,
    /// Heading (degrees)
    pub heading: f64,
    /// Roll (degrees)
    pub roll: f64,
    /// Pitch (degrees)
    pub pitch: f64,
    /// Heave (m)
    pub heave: f64,
    /// Sound speed (m/s)
    pub sos: f64,
    /// Across-track beam width (degrees)
    pub beamwidth_xtrack: f64,
    /// Along-track beam width (degrees)
    pub beamwidth_ltrack: f64,
}

/// A sounding relative to the transducer in the vessel frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VesselSounding {
    /// Depth below the transducer (m, positive down)
    pub bath: f64,
    /// Across-track distance (m, positive starboard)
    pub across_track: f64,
    /// Along-track distance (m, positive forward)
    pub along_track: f64,
    /// Processed amplitude
    pub amplitude: f64,
    /// Passed the vendor's filters
    pub accepted: bool,
}

fn heading_matrix_world_to_vessel(ping: &SxpPing) -> Matrix {
    Matrix::identity()
        .translate(-ping.txer_e, 0.0, -ping.txer_n)
        .rotate_y(-ping.heading.to_radians())
}

fn heading_matrix_vessel_to_world(ping: &SxpPing) -> Matrix {
    Matrix::identity()
        .rotate_y(ping.heading.to_radians())
        .translate(ping.txer_e, 0.0, ping.txer_n)
}

/// Soundings of `ping` in the vessel frame, rotated by heading about the transducer.
pub fn extract_soundings(ping: &SxpPing) -> Vec<VesselSounding> {
    let wtov = heading_matrix_world_to_vessel(ping);
    ping.points
        .iter()
        .map(|point| {
            let p = wtov.apply(&Vector3::new(point.x, -f64::from(point.z), point.y));
            VesselSounding {
                bath: -p.y,
                across_track: p.x,
                along_track: p.z,
                amplitude: f64::from(point.procamp),
                accepted: point.is_accepted(),
            }
        })
        .collect()
}

/// Replace the soundings of `ping` with vessel-frame `soundings`.
///
/// Points beyond the current count are created with zero raw amplitude and
/// TPU; existing points keep those fields.
pub fn insert_soundings(ping: &mut SxpPing, soundings: &[VesselSounding]) {
    let vtow = heading_matrix_vessel_to_world(ping);
    ping.points.truncate(soundings.len());
    while ping.points.len() < soundings.len() {
        ping.points.push(SxpPoint {
            sampnum: 0,
            y: 0.0,
            x: 0.0,
            z: 0.0,
            amp: 0,
            procamp: 0,
            status: POINT_REJECTED,
            tpu: 0.0,
        });
    }

    for (i, (point, s)) in ping.points.iter_mut().zip(soundings).enumerate() {
        let p = vtow.apply(&Vector3::new(s.across_track, -s.bath, s.along_track));
        point.sampnum = i32::try_from(i).unwrap_or(i32::MAX);
        point.x = p.x;
        point.y = p.z;
        point.z = (-p.y) as f32;
        point.procamp = s.amplitude.round().clamp(0.0, f64::from(u16::MAX)) as u16;
        point.status = if s.accepted {
            POINT_ACCEPTED
        } else {
            POINT_REJECTED
        };
    }
}

/// Heave of the vessel reference point (m, positive up).
pub fn ping_heave(ping: &SxpPing) -> f64 {
    ping.geometry().heave()
}

/// Set the stored transducer height from a reference point heave.
pub fn set_ping_height(ping: &mut SxpPing, heave: f64) {
    ping.height = ping.geometry().height_for_heave(heave);
}

impl Georeferenced for SxpPing {
    fn geometry(&self) -> PingGeometry {
        PingGeometry {
            easting: self.txer_e,
            northing: self.txer_n,
            height: self.height,
            tide: self.tide,
            heading: self.heading,
            pitch: self.pitch,
            roll: self.roll,
            lever_arm: LeverArm {
                starboard: self.txer_starboard,
                forward: self.txer_forward,
                height: self.txer_height,
            },
        }
    }

    fn set_geometry(&mut self, geometry: &PingGeometry) {
        self.txer_e = geometry.easting;
        self.easting = geometry.easting;
        self.txer_n = geometry.northing;
        self.northing = geometry.northing;
        self.height = geometry.height;
        self.heading = geometry.heading;
        self.pitch = geometry.pitch;
        self.roll = geometry.roll;
    }

    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn for_each_point(&mut self, f: &mut dyn FnMut(&mut Vector3)) {
        for point in &mut self.points {
            let mut p = Vector3::new(point.x, -f64::from(point.z), point.y);
            f(&mut p);
            point.x = p.x;
            point.y = p.z;
            point.z = (-p.y) as f32;
        }
    }
}

/// Driver for SXP and SXI streams.
pub struct SwathplusDriver {
    info: FormatInfo,
    state: SwathplusState,
    navigation: Option<PingNavigation>,
}

impl Default for SwathplusDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SwathplusDriver {
    /// Create a driver with fresh state.
    pub fn new() -> Self {
        Self {
            info: format_info(),
            state: SwathplusState::default(),
            navigation: None,
        }
    }

    /// Boxed constructor for the registry.
    pub fn allocate() -> Box<dyn FormatDriver> {
        Box::new(Self::new())
    }

    /// Per-stream state.
    pub fn state(&self) -> &SwathplusState {
        &self.state
    }

    /// Navigation of the most recently decoded processed ping.
    pub fn navigation(&self) -> Option<&PingNavigation> {
        self.navigation.as_ref()
    }

    /// Update speed and navigation state from a processed ping.
    pub fn track_ping(&mut self, ping: &SxpPing) -> PingNavigation {
        self.state.pings_read += 1;
        if ping.points.len() > MAX_BEAMS && !self.state.warned_oversize {
            warn!(
                ping = ping.pingnumber,
                points = ping.points.len(),
                max = MAX_BEAMS,
                "ping holds more soundings than the format maximum; downstream tools may truncate"
            );
            self.state.warned_oversize = true;
        }

        let reference = *self.state.speed_reference.get_or_insert(ping.txno);
        if ping.txno == reference {
            if let Some((e, n, t)) = self.state.last_fix {
                let dt = ping.time_d - t;
                if dt > 0.0 {
                    let dx = ping.txer_e - e;
                    let dy = ping.txer_n - n;
                    self.state.speed = (dx * dx + dy * dy).sqrt() / dt;
                }
            }
            self.state.last_fix = Some((ping.txer_e, ping.txer_n, ping.time_d));
        }

        let beamwidth = beamwidth_for_frequency(ping.frequency);
        let nav = PingNavigation {
            time_d: ping.time_d + (f64::from(ping.txno) - 1.0) * TRANSDUCER_TIME_NUDGE,
            navlon: ping.txer_e,
            navlat: ping.txer_n,
            speed: self.state.speed,
            heading: ping.heading,
            roll: -ping.roll,
            pitch: ping.pitch,
            heave: -ping.height,
            sos: ping.sos,
            beamwidth_xtrack: beamwidth,
            beamwidth_ltrack: beamwidth,
        };
        self.navigation = Some(nav);
        nav
    }
}

impl HeaderValidator for SwathplusDriver {
    fn accepts_header(&mut self, header: &RecordHeader) -> bool {
        is_known_record_type(header.record_type)
    }
}

impl FormatDriver for SwathplusDriver {
    fn info(&self) -> &FormatInfo {
        &self.info
    }

    fn read_one_record(&mut self, header: &RecordHeader, record: &[u8]) -> Result<Record> {
        let payload = FRAMING.payload(header, record)?;
        let decoded = codec::decode(header.record_type, payload)?;
        self.state.records_read += 1;

        match &decoded {
            SwathplusRecord::SxpPing(ping) => {
                self.track_ping(ping);
            }
            SwathplusRecord::Projection(p) => {
                let text = p.text.to_string_lossy();
                if self.state.projection.as_deref() != Some(text.as_ref()) {
                    debug!(projection = %text, "projection record");
                    self.state.projection = Some(text.into_owned());
                }
            }
            _ => {}
        }
        Ok(Record::Swathplus(decoded))
    }

    fn write_one_record(
        &mut self,
        record: &Record,
        out: &mut GrowableBuffer,
    ) -> Result<RecordHeader> {
        match record {
            Record::Swathplus(r) => {
                let header = codec::encode(r, out)?;
                self.state.records_written += 1;
                Ok(header)
            }
            other => Err(CodecError::unsupported(format!(
                "{} record in a SWATHplus stream",
                other.name()
            ))),
        }
    }

    fn reset_state(&mut self) {
        self.state = SwathplusState::default();
        self.navigation = None;
    }

    fn state_summary(&self) -> String {
        format!(
            "{} records read ({} pings), {} written, speed {:.2} m/s, projection {}",
            self.state.records_read,
            self.state.pings_read,
            self.state.records_written,
            self.state.speed,
            self.state.projection.as_deref().unwrap_or("none")
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
