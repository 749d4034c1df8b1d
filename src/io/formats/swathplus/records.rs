// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! SWATHplus record types.
//!
//! Field names follow the vendor's SXP/SXI documentation so the layouts in
//! [`super::codec`] can be checked against it line by line.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::io::metadata::DataKind;
use crate::io::traits::SonarRecord;

use super::{
    ID_AGDS, ID_COMMENT, ID_ECHOSOUNDER, ID_IMU_OFFSET, ID_PARSED_ATTITUDE, ID_PARSED_PING,
    ID_POSITION_EN, ID_POSITION_LL, ID_POS_OFFSET, ID_PROCESSED_PING, ID_PROCESSED_PING2,
    ID_PROJECTION, ID_SSV, ID_SXI_HEADER, ID_SXP_HEADER, ID_TIDE, ID_TXER_OFFSET, ID_WL_OFFSET,
    MAX_LINENAME,
};

/// Scale applied to `microsec` by most parsed (SXI) records when forming
/// the record time.
///
/// This multiplies where a division by 1e6 looks intended. Comments and
/// projection records use [`COMMENT_MICROSEC_SCALE`].
pub const SXI_MICROSEC_SCALE: f64 = 1e6;

/// Scale applied to `microsec` by comment and projection records.
pub const COMMENT_MICROSEC_SCALE: f64 = 1e-6;

/// Point status: rejected by the vendor's filters.
pub const POINT_REJECTED: u8 = 0;

/// Point status: accepted.
pub const POINT_ACCEPTED: u8 = 1;

/// Text up to the first NUL, with invalid UTF-8 replaced.
fn until_nul(bytes: &[u8]) -> Cow<'_, str> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end])
}

/// Survey line name as the 40 stored bytes.
///
/// Bytes are never reinterpreted: non-UTF-8 names and anything left after
/// the terminating NUL re-encode unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineName([u8; MAX_LINENAME]);

impl LineName {
    /// NUL-padded name. Text beyond 39 bytes is cut so the field stays terminated.
    pub fn new(text: &str) -> Self {
        let mut bytes = [0u8; MAX_LINENAME];
        let keep = text.len().min(MAX_LINENAME - 1);
        bytes[..keep].copy_from_slice(&text.as_bytes()[..keep]);
        Self(bytes)
    }

    /// Wrap the stored field.
    pub fn from_bytes(bytes: [u8; MAX_LINENAME]) -> Self {
        Self(bytes)
    }

    /// The stored field.
    pub fn as_bytes(&self) -> &[u8; MAX_LINENAME] {
        &self.0
    }

    /// Name for display.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        until_nul(&self.0)
    }
}

impl fmt::Debug for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineName({:?}, {})", self.to_string_lossy(), hex::encode(self.0))
    }
}

impl fmt::Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl Serialize for LineName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

/// Variable-length text exactly as stored, padding NULs included.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RawText(Vec<u8>);

impl RawText {
    /// Wrap stored bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// `text` followed by 1 to 4 NULs, leaving the length a multiple of 4.
    pub fn padded(text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        let padding = 4 - bytes.len() % 4;
        bytes.resize(bytes.len() + padding, 0);
        Self(bytes)
    }

    /// The stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Stored length, the record's `nchars`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text for display, up to the first NUL.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        until_nul(&self.0)
    }
}

impl fmt::Debug for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawText({:?}, {})", self.to_string_lossy(), hex::encode(&self.0))
    }
}

impl fmt::Display for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl Serialize for RawText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

/// File version block shared by SXP and SXI files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    /// Acquisition software version
    pub swver: i32,
    /// File format version
    pub fmtver: i32,
}

/// Processed ping layout generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PingVersion {
    /// Pings recorded before January 2010 (no TPU, no transducer pitch)
    V1,
    /// Pings recorded after January 2010
    V2,
}

impl PingVersion {
    /// Record id for this generation.
    pub fn record_type(&self) -> u32 {
        match self {
            PingVersion::V1 => ID_PROCESSED_PING,
            PingVersion::V2 => ID_PROCESSED_PING2,
        }
    }
}

/// One georeferenced sounding in a processed ping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SxpPoint {
    /// Sample number
    pub sampnum: i32,
    /// Northing (m)
    pub y: f64,
    /// Easting (m)
    pub x: f64,
    /// Depth below the datum, positive down (m)
    pub z: f32,
    /// Raw amplitude
    pub amp: u16,
    /// Processed amplitude
    pub procamp: u16,
    /// [`POINT_ACCEPTED`] or [`POINT_REJECTED`]
    pub status: u8,
    /// Total propagated uncertainty (V2 only)
    pub tpu: f64,
}

impl SxpPoint {
    /// True if the point passed the vendor's filters.
    pub fn is_accepted(&self) -> bool {
        self.status != POINT_REJECTED
    }
}

/// Processed ping (SXP).
///
/// Easting/northing are projected coordinates; roll is positive starboard
/// down, pitch positive bow up, height positive down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SxpPing {
    /// Layout generation
    pub version: PingVersion,
    /// Survey line name
    pub linename: LineName,
    /// Ping number
    pub pingnumber: u32,
    /// Ping time, seconds since the Unix epoch
    pub time_d: f64,
    /// Number of transducers
    pub notxers: i32,
    /// Vessel easting (m)
    pub easting: f64,
    /// Vessel northing (m)
    pub northing: f64,
    /// Roll (degrees)
    pub roll: f64,
    /// Pitch (degrees)
    pub pitch: f64,
    /// Heading (degrees)
    pub heading: f64,
    /// Vessel height (m, positive down)
    pub height: f64,
    /// Tide (m)
    pub tide: f64,
    /// Sound speed (m/s)
    pub sos: f64,
    /// Transducer number (1-based)
    pub txno: u8,
    /// Transducer status
    pub txstat: u8,
    /// Transmit power
    pub txpower: u8,
    /// Analog gain
    pub analoggain: i16,
    /// Number of staves
    pub nostaves: u8,
    /// Board type/revision/serial
    pub txinfo: [u8; 3],
    /// Frequency code
    pub freq: u8,
    /// Sonar frequency (Hz)
    pub frequency: f64,
    /// Transmit time (cycles)
    pub trnstime: i16,
    /// Receive time
    pub recvtime: i16,
    /// Sample rate code
    pub samprate: u8,
    /// Samples originally recorded
    pub nosampsorig: i32,
    /// Sample slots
    pub nosampslots: i32,
    /// Transducer easting (m)
    pub txer_e: f64,
    /// Transducer northing (m)
    pub txer_n: f64,
    /// Transducer height offset (m)
    pub txer_height: f64,
    /// Transducer forward offset (m)
    pub txer_forward: f64,
    /// Transducer starboard offset (m)
    pub txer_starboard: f64,
    /// Transducer azimuth (degrees)
    pub txer_azimuth: f64,
    /// Transducer elevation (degrees)
    pub txer_elevation: f64,
    /// Transducer skew (degrees)
    pub txer_skew: f64,
    /// Transducer time offset (s)
    pub txer_time: f64,
    /// Water depth at the transducer (m)
    pub txer_waterdepth: f64,
    /// Transducer pitch (degrees, V2 only)
    pub txer_pitch: f64,
    /// Soundings; the stored count is always `points.len()`
    pub points: Vec<SxpPoint>,
}

/// One raw sample of a parsed ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SxiSample {
    /// Sample number
    pub sampnum: u16,
    /// Angle code
    pub angle: i16,
    /// Amplitude
    pub amplitude: u16,
    /// Quality flags
    pub quality: u8,
}

/// Parsed ping (SXI).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SxiPing {
    /// Whole seconds
    pub time_d: i32,
    /// Sub-second part
    pub microsec: i32,
    /// Transducer channel
    pub channel: u8,
    /// Ping number
    pub pingnumber: u32,
    /// Frequency (Hz)
    pub frequency: f32,
    /// Sample period (s)
    pub samp_period: f32,
    /// Sound speed (m/s)
    pub sos: f32,
    /// Transmit pulse length code
    pub txpulse: i16,
    /// Data options
    pub data_options: i8,
    /// Ping state
    pub ping_state: u8,
    /// Maximum sample count
    pub max_count: u16,
    /// Reserved
    pub reserve1: u16,
    /// Samples; the stored count is always `samples.len()`
    pub samples: Vec<SxiSample>,
}

/// Time stamp and channel prefix shared by parsed sensor records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorStamp {
    /// Whole seconds
    pub time_d: i32,
    /// Sub-second part
    pub microsec: i32,
    /// Sensor channel
    pub channel: u8,
}

impl SensorStamp {
    /// Record time using the parsed-record microsecond scale.
    pub fn seconds(&self) -> f64 {
        f64::from(self.time_d) + f64::from(self.microsec) * SXI_MICROSEC_SCALE
    }
}

/// Attitude sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attitude {
    /// Stamp
    pub stamp: SensorStamp,
    /// Roll (degrees)
    pub roll: f32,
    /// Pitch (degrees)
    pub pitch: f32,
    /// Heading (degrees)
    pub heading: f32,
    /// Height (m)
    pub height: f32,
}

/// Geographic position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionLatLon {
    /// Stamp
    pub stamp: SensorStamp,
    /// Latitude (degrees)
    pub latitude: f64,
    /// Longitude (degrees)
    pub longitude: f64,
}

/// Projected position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionEastNorth {
    /// Stamp
    pub stamp: SensorStamp,
    /// Easting (m)
    pub easting: f64,
    /// Northing (m)
    pub northing: f64,
}

/// Single-value sensor sample (sound speed, tide, echosounder altitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarSample {
    /// Stamp
    pub stamp: SensorStamp,
    /// Sample value
    pub value: f32,
}

/// Acoustic ground discrimination sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Agds {
    /// Stamp
    pub stamp: SensorStamp,
    /// Hardness index
    pub hardness: f32,
    /// Roughness index
    pub roughness: f32,
}

/// Lever arm of a position or motion sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorOffset {
    /// Stamp
    pub stamp: SensorStamp,
    /// Height (m)
    pub height: f32,
    /// Forward (m)
    pub forward: f32,
    /// Starboard (m)
    pub starboard: f32,
    /// Latency (s)
    pub time: f32,
}

/// Transducer mounting offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransducerOffset {
    /// Stamp
    pub stamp: SensorStamp,
    /// Height (m)
    pub height: f32,
    /// Forward (m)
    pub forward: f32,
    /// Starboard (m)
    pub starboard: f32,
    /// Azimuth (degrees)
    pub azimuth: f32,
    /// Elevation (degrees)
    pub elevation: f32,
    /// Pitch (degrees)
    pub pitch: f32,
    /// Skew (degrees)
    pub skew: f32,
    /// Latency (s)
    pub time: f32,
}

/// Water line offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaterLineOffset {
    /// Stamp
    pub stamp: SensorStamp,
    /// Height (m)
    pub height: f32,
}

/// Free-text record (comment or projection identifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRecord {
    /// Whole seconds
    pub time_d: i32,
    /// Sub-second part, in microseconds
    pub microsec: i32,
    /// Stored bytes; `nchars` is their length
    pub text: RawText,
}

impl TextRecord {
    /// Create a text record, NUL-padding `text` to a 4-byte multiple.
    pub fn new(time_d: i32, microsec: i32, text: &str) -> Self {
        Self {
            time_d,
            microsec,
            text: RawText::padded(text),
        }
    }

    /// Record time in seconds.
    pub fn seconds(&self) -> f64 {
        f64::from(self.time_d) + f64::from(self.microsec) * COMMENT_MICROSEC_SCALE
    }
}

/// Any SWATHplus record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwathplusRecord {
    /// SXP file header
    SxpHeader(FileHeader),
    /// Processed ping
    SxpPing(SxpPing),
    /// SXI file header
    SxiHeader(FileHeader),
    /// Parsed ping
    SxiPing(SxiPing),
    /// Attitude
    Attitude(Attitude),
    /// Geographic position
    PositionLatLon(PositionLatLon),
    /// Projected position
    PositionEastNorth(PositionEastNorth),
    /// Surface sound velocity
    SoundSpeed(ScalarSample),
    /// Echosounder altitude
    Echosounder(ScalarSample),
    /// Tide
    Tide(ScalarSample),
    /// Seabed classification
    Agds(Agds),
    /// Comment
    Comment(TextRecord),
    /// Position sensor lever arm
    PosOffset(SensorOffset),
    /// Motion sensor lever arm
    ImuOffset(SensorOffset),
    /// Transducer offset
    TxerOffset(TransducerOffset),
    /// Water line offset
    WlOffset(WaterLineOffset),
    /// Opaque projection identifier
    Projection(TextRecord),
}

impl SonarRecord for SwathplusRecord {
    fn record_type(&self) -> u32 {
        match self {
            SwathplusRecord::SxpHeader(_) => ID_SXP_HEADER,
            SwathplusRecord::SxpPing(ping) => ping.version.record_type(),
            SwathplusRecord::SxiHeader(_) => ID_SXI_HEADER,
            SwathplusRecord::SxiPing(_) => ID_PARSED_PING,
            SwathplusRecord::Attitude(_) => ID_PARSED_ATTITUDE,
            SwathplusRecord::PositionLatLon(_) => ID_POSITION_LL,
            SwathplusRecord::PositionEastNorth(_) => ID_POSITION_EN,
            SwathplusRecord::SoundSpeed(_) => ID_SSV,
            SwathplusRecord::Echosounder(_) => ID_ECHOSOUNDER,
            SwathplusRecord::Tide(_) => ID_TIDE,
            SwathplusRecord::Agds(_) => ID_AGDS,
            SwathplusRecord::Comment(_) => ID_COMMENT,
            SwathplusRecord::PosOffset(_) => ID_POS_OFFSET,
            SwathplusRecord::ImuOffset(_) => ID_IMU_OFFSET,
            SwathplusRecord::TxerOffset(_) => ID_TXER_OFFSET,
            SwathplusRecord::WlOffset(_) => ID_WL_OFFSET,
            SwathplusRecord::Projection(_) => ID_PROJECTION,
        }
    }

    fn kind(&self) -> DataKind {
        match self {
            SwathplusRecord::SxpHeader(_) | SwathplusRecord::SxiHeader(_) => DataKind::FileHeader,
            SwathplusRecord::SxpPing(_) | SwathplusRecord::SxiPing(_) => DataKind::Ping,
            SwathplusRecord::Attitude(_) => DataKind::Attitude,
            SwathplusRecord::PositionLatLon(_) | SwathplusRecord::PositionEastNorth(_) => {
                DataKind::Position
            }
            SwathplusRecord::SoundSpeed(_) => DataKind::SoundSpeed,
            SwathplusRecord::Echosounder(_) => DataKind::Altitude,
            SwathplusRecord::Tide(_) => DataKind::Tide,
            SwathplusRecord::Agds(_) => DataKind::SeabedClass,
            SwathplusRecord::Comment(_) => DataKind::Comment,
            SwathplusRecord::PosOffset(_)
            | SwathplusRecord::ImuOffset(_)
            | SwathplusRecord::TxerOffset(_)
            | SwathplusRecord::WlOffset(_) => DataKind::SensorOffset,
            SwathplusRecord::Projection(_) => DataKind::Projection,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SwathplusRecord::SxpHeader(_) => "SXP_HEADER",
            SwathplusRecord::SxpPing(ping) => match ping.version {
                PingVersion::V1 => "PROCESSED_PING",
                PingVersion::V2 => "PROCESSED_PING2",
            },
            SwathplusRecord::SxiHeader(_) => "SXI_HEADER",
            SwathplusRecord::SxiPing(_) => "PARSED_PING",
            SwathplusRecord::Attitude(_) => "PARSED_ATTITUDE",
            SwathplusRecord::PositionLatLon(_) => "PARSED_POSITION_LL",
            SwathplusRecord::PositionEastNorth(_) => "PARSED_POSITION_EN",
            SwathplusRecord::SoundSpeed(_) => "PARSED_SSV",
            SwathplusRecord::Echosounder(_) => "PARSED_ECHOSOUNDER",
            SwathplusRecord::Tide(_) => "PARSED_TIDE",
            SwathplusRecord::Agds(_) => "PARSED_AGDS",
            SwathplusRecord::Comment(_) => "COMMENT",
            SwathplusRecord::PosOffset(_) => "POS_OFFSET",
            SwathplusRecord::ImuOffset(_) => "IMU_OFFSET",
            SwathplusRecord::TxerOffset(_) => "TXER_OFFSET",
            SwathplusRecord::WlOffset(_) => "WL_OFFSET",
            SwathplusRecord::Projection(_) => "PROJECTION",
        }
    }

    fn time_seconds(&self) -> Option<f64> {
        match self {
            SwathplusRecord::SxpHeader(_) | SwathplusRecord::SxiHeader(_) => None,
            SwathplusRecord::SxpPing(ping) => Some(ping.time_d),
            SwathplusRecord::SxiPing(ping) => Some(
                f64::from(ping.time_d) + f64::from(ping.microsec) * SXI_MICROSEC_SCALE,
            ),
            SwathplusRecord::Attitude(r) => Some(r.stamp.seconds()),
            SwathplusRecord::PositionLatLon(r) => Some(r.stamp.seconds()),
            SwathplusRecord::PositionEastNorth(r) => Some(r.stamp.seconds()),
            SwathplusRecord::SoundSpeed(r)
            | SwathplusRecord::Echosounder(r)
            | SwathplusRecord::Tide(r) => Some(r.stamp.seconds()),
            SwathplusRecord::Agds(r) => Some(r.stamp.seconds()),
            SwathplusRecord::PosOffset(r) | SwathplusRecord::ImuOffset(r) => {
                Some(r.stamp.seconds())
            }
            SwathplusRecord::TxerOffset(r) => Some(r.stamp.seconds()),
            SwathplusRecord::WlOffset(r) => Some(r.stamp.seconds()),
            SwathplusRecord::Comment(r) | SwathplusRecord::Projection(r) => Some(r.seconds()),
        }
    }
}

impl fmt::Display for SwathplusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [ID: {:#X}]", self.name(), self.record_type())?;
        match self {
            SwathplusRecord::SxpHeader(h) | SwathplusRecord::SxiHeader(h) => {
                write!(f, " swver={} fmtver={}", h.swver, h.fmtver)
            }
            SwathplusRecord::SxpPing(p) => write!(
                f,
                " line={} ping={} txno={} time={:.6} e={:.3} n={:.3} hdg={:.2} points={}",
                p.linename,
                p.pingnumber,
                p.txno,
                p.time_d,
                p.easting,
                p.northing,
                p.heading,
                p.points.len()
            ),
            SwathplusRecord::SxiPing(p) => write!(
                f,
                " ping={} channel={} freq={} samples={}",
                p.pingnumber,
                p.channel,
                p.frequency,
                p.samples.len()
            ),
            SwathplusRecord::Attitude(a) => write!(
                f,
                " roll={} pitch={} heading={} height={}",
                a.roll, a.pitch, a.heading, a.height
            ),
            SwathplusRecord::PositionLatLon(p) => {
                write!(f, " lat={:.8} lon={:.8}", p.latitude, p.longitude)
            }
            SwathplusRecord::PositionEastNorth(p) => {
                write!(f, " e={:.3} n={:.3}", p.easting, p.northing)
            }
            SwathplusRecord::SoundSpeed(s)
            | SwathplusRecord::Echosounder(s)
            | SwathplusRecord::Tide(s) => write!(f, " value={}", s.value),
            SwathplusRecord::Agds(a) => {
                write!(f, " hardness={} roughness={}", a.hardness, a.roughness)
            }
            SwathplusRecord::PosOffset(o) | SwathplusRecord::ImuOffset(o) => write!(
                f,
                " height={} forward={} starboard={} time={}",
                o.height, o.forward, o.starboard, o.time
            ),
            SwathplusRecord::TxerOffset(o) => write!(
                f,
                " height={} forward={} starboard={} azimuth={} elevation={}",
                o.height, o.forward, o.starboard, o.azimuth, o.elevation
            ),
            SwathplusRecord::WlOffset(o) => write!(f, " height={}", o.height),
            SwathplusRecord::Comment(t) | SwathplusRecord::Projection(t) => {
                write!(f, " \"{}\"", t.text)
            }
        }
    }
}
