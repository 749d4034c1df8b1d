// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoded Simrad EM datagrams.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::io::metadata::DataKind;
use crate::io::traits::SonarRecord;

use super::*;

/// Latitude units per degree in position datagrams.
pub const LATITUDE_SCALE: f64 = 5e-8;
/// Longitude units per degree in position datagrams.
pub const LONGITUDE_SCALE: f64 = 1e-7;

/// Fields shared by every datagram: sonar model from the header, then the
/// date, time and counters at the start of the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatagramStamp {
    /// Sonar model (EM number)
    pub sonar: u16,
    /// Date as `yyyymmdd`
    pub date: i32,
    /// Milliseconds since midnight
    pub msec: i32,
    /// Datagram counter
    pub count: u16,
    /// System serial number
    pub serial: u16,
}

impl DatagramStamp {
    /// Calendar date, when `date` is a valid `yyyymmdd`.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        date_from_yyyymmdd(self.date)
    }

    /// Date and time of day, when the date is valid.
    pub fn date_time(&self) -> Option<NaiveDateTime> {
        let midnight = self.calendar_date()?.and_hms_opt(0, 0, 0)?;
        Some(midnight + chrono::Duration::milliseconds(i64::from(self.msec)))
    }

    /// Seconds since the Unix epoch.
    pub fn seconds(&self) -> Option<f64> {
        let midnight = self.calendar_date()?.and_hms_opt(0, 0, 0)?;
        Some(midnight.and_utc().timestamp() as f64 + f64::from(self.msec) * 0.001)
    }
}

/// Parse a `yyyymmdd` integer.
pub fn date_from_yyyymmdd(date: i32) -> Option<NaiveDate> {
    if date <= 0 {
        return None;
    }
    let year = date / 10_000;
    let month = u32::try_from((date / 100) % 100).ok()?;
    let day = u32::try_from(date % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Clock datagram: system time against an external clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clock {
    pub stamp: DatagramStamp,
    /// External clock date as `yyyymmdd`
    pub origin_date: i32,
    /// External clock milliseconds since midnight
    pub origin_msec: i32,
    /// 1 when a PPS signal is in use
    pub pps: u8,
}

/// Tide datagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tide {
    pub stamp: DatagramStamp,
    /// Tide input date as `yyyymmdd`
    pub origin_date: i32,
    /// Tide input milliseconds since midnight
    pub origin_msec: i32,
    /// Tide offset (cm)
    pub tide: i16,
}

/// Height datagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Height {
    pub stamp: DatagramStamp,
    /// Height (cm)
    pub height: i32,
    /// Height source type
    pub height_type: u8,
}

/// One heading sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadingSample {
    /// Milliseconds since the datagram time
    pub time: u16,
    /// Heading (0.01 degrees)
    pub heading: u16,
}

/// Heading datagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    pub stamp: DatagramStamp,
    pub samples: Vec<HeadingSample>,
    /// Heading indicator active
    pub status: u8,
}

/// One motion sensor sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttitudeSample {
    /// Milliseconds since the datagram time
    pub time: u16,
    pub sensor_status: u16,
    /// Roll (0.01 degrees)
    pub roll: i16,
    /// Pitch (0.01 degrees)
    pub pitch: i16,
    /// Heave (cm)
    pub heave: i16,
    /// Heading (0.01 degrees)
    pub heading: u16,
}

/// Attitude datagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attitude {
    pub stamp: DatagramStamp,
    pub samples: Vec<AttitudeSample>,
    /// Sensor used for heading
    pub heading_status: u8,
}

/// Position datagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub stamp: DatagramStamp,
    /// Latitude in units of [`LATITUDE_SCALE`] degrees
    pub latitude: i32,
    /// Longitude in units of [`LONGITUDE_SCALE`] degrees
    pub longitude: i32,
    /// Fix quality (cm)
    pub quality: u16,
    /// Speed over ground (cm/s)
    pub speed: u16,
    /// Course over ground (0.01 degrees)
    pub course: u16,
    /// Heading (0.01 degrees)
    pub heading: u16,
    /// Position system descriptor
    pub system: u8,
    /// Raw telegram as received from the positioning system
    #[serde(with = "hex_bytes")]
    pub input: Vec<u8>,
}

impl Position {
    /// Latitude in degrees.
    pub fn latitude_degrees(&self) -> f64 {
        f64::from(self.latitude) * LATITUDE_SCALE
    }

    /// Longitude in degrees.
    pub fn longitude_degrees(&self) -> f64 {
        f64::from(self.longitude) * LONGITUDE_SCALE
    }
}

/// One bathymetry beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Beam {
    /// Depth in `depth_res` cm units; unsigned on EM120/EM300
    pub depth: i32,
    /// Across-track distance in `distance_res` cm units
    pub across: i16,
    /// Along-track distance in `distance_res` cm units
    pub along: i16,
    /// Depression angle (0.01 degrees)
    pub depression: i16,
    /// Azimuth angle (0.01 degrees)
    pub azimuth: u16,
    /// One-way range in samples
    pub range: u16,
    pub quality: u8,
    /// Detection window length in samples
    pub window: u8,
    /// Reflectivity (0.5 dB)
    pub amplitude: i8,
    /// Beam number, 1-based
    pub beam_num: u8,
}

/// Bathymetry datagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bathymetry {
    pub stamp: DatagramStamp,
    /// Vessel heading (0.01 degrees)
    pub heading: u16,
    /// Sound speed at the transducer (0.1 m/s)
    pub ssv: u16,
    /// Transducer depth (cm)
    pub xducer_depth: u16,
    /// Maximum beams possible for the current mode
    pub nbeams_max: u8,
    /// Depth resolution (cm)
    pub depth_res: u8,
    /// Across/along-track resolution (cm)
    pub distance_res: u8,
    /// Range sampling rate (Hz)
    pub sample_rate: u16,
    pub beams: Vec<Beam>,
    /// Transducer depth offset multiplier
    pub offset_multiplier: i8,
}

impl Bathymetry {
    /// True when depths are stored unsigned for this sonar.
    pub fn unsigned_depth(&self) -> bool {
        unsigned_depth(self.stamp.sonar)
    }
}

/// A Simrad EM datagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum SimradRecord {
    Clock(Clock),
    Tide(Tide),
    Height(Height),
    Heading(Heading),
    Attitude(Attitude),
    Position(Position),
    Bathymetry(Bathymetry),
    /// Any other known datagram, kept as the raw body
    Opaque {
        /// Datagram type byte
        datagram_type: u8,
        /// Sonar model from the header
        sonar: u16,
        /// Bytes between the header and ETX
        #[serde(with = "hex_bytes")]
        body: Vec<u8>,
    },
}

impl SimradRecord {
    /// Shared date/time fields, for every decoded datagram.
    pub fn stamp(&self) -> Option<&DatagramStamp> {
        match self {
            SimradRecord::Clock(r) => Some(&r.stamp),
            SimradRecord::Tide(r) => Some(&r.stamp),
            SimradRecord::Height(r) => Some(&r.stamp),
            SimradRecord::Heading(r) => Some(&r.stamp),
            SimradRecord::Attitude(r) => Some(&r.stamp),
            SimradRecord::Position(r) => Some(&r.stamp),
            SimradRecord::Bathymetry(r) => Some(&r.stamp),
            SimradRecord::Opaque { .. } => None,
        }
    }

    /// Sonar model written into the header.
    pub fn sonar(&self) -> u16 {
        match self {
            SimradRecord::Opaque { sonar, .. } => *sonar,
            other => other.stamp().map_or(0, |s| s.sonar),
        }
    }
}

impl SonarRecord for SimradRecord {
    fn record_type(&self) -> u32 {
        u32::from(match self {
            SimradRecord::Clock(_) => ID_CLOCK,
            SimradRecord::Tide(_) => ID_TIDE,
            SimradRecord::Height(_) => ID_HEIGHT,
            SimradRecord::Heading(_) => ID_HEADING,
            SimradRecord::Attitude(_) => ID_ATTITUDE,
            SimradRecord::Position(_) => ID_POS,
            SimradRecord::Bathymetry(_) => ID_BATH,
            SimradRecord::Opaque { datagram_type, .. } => *datagram_type,
        })
    }

    fn kind(&self) -> DataKind {
        match self {
            SimradRecord::Clock(_) => DataKind::Clock,
            SimradRecord::Tide(_) => DataKind::Tide,
            SimradRecord::Height(_) => DataKind::Height,
            SimradRecord::Heading(_) => DataKind::Heading,
            SimradRecord::Attitude(_) => DataKind::Attitude,
            SimradRecord::Position(_) => DataKind::Position,
            SimradRecord::Bathymetry(_) => DataKind::Ping,
            SimradRecord::Opaque { datagram_type, .. } => match *datagram_type {
                ID_SSV => DataKind::SoundSpeed,
                ID_RAWBEAM | ID_SS => DataKind::Ping,
                _ => DataKind::Parameter,
            },
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SimradRecord::Opaque { datagram_type, .. } => datagram_name(*datagram_type),
            // record_type() of a decoded datagram always fits a byte
            other => datagram_name(other.record_type() as u8),
        }
    }

    fn time_seconds(&self) -> Option<f64> {
        match self {
            SimradRecord::Opaque { body, .. } => {
                // every EM datagram body starts with date and msec
                if body.len() < 8 {
                    return None;
                }
                let stamp = DatagramStamp {
                    date: i32::from_be_bytes([body[0], body[1], body[2], body[3]]),
                    msec: i32::from_be_bytes([body[4], body[5], body[6], body[7]]),
                    ..DatagramStamp::default()
                };
                stamp.seconds()
            }
            other => other.stamp().and_then(DatagramStamp::seconds),
        }
    }
}

impl fmt::Display for SimradRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [ID: {:#04X}] EM{}",
            self.name(),
            self.record_type(),
            self.sonar()
        )?;
        if let Some(time) = self.stamp().and_then(DatagramStamp::date_time) {
            write!(f, " {}", time.format("%Y-%m-%d %H:%M:%S%.3f"))?;
        }
        match self {
            SimradRecord::Clock(c) => write!(
                f,
                " origin={}/{} pps={}",
                c.origin_date, c.origin_msec, c.pps
            ),
            SimradRecord::Tide(t) => write!(f, " tide={}cm", t.tide),
            SimradRecord::Height(h) => {
                write!(f, " height={}cm type={}", h.height, h.height_type)
            }
            SimradRecord::Heading(h) => write!(f, " samples={}", h.samples.len()),
            SimradRecord::Attitude(a) => write!(f, " samples={}", a.samples.len()),
            SimradRecord::Position(p) => write!(
                f,
                " lat={:.7} lon={:.7} input={}",
                p.latitude_degrees(),
                p.longitude_degrees(),
                String::from_utf8_lossy(&p.input).trim_end()
            ),
            SimradRecord::Bathymetry(b) => write!(
                f,
                " ping={} beams={}/{} heading={:.2}",
                b.stamp.count,
                b.beams.len(),
                b.nbeams_max,
                f64::from(b.heading) * 0.01
            ),
            SimradRecord::Opaque { body, .. } => {
                let preview = &body[..body.len().min(16)];
                write!(f, " {} bytes: {}", body.len(), hex::encode(preview))
            }
        }
    }
}

/// Serialize raw bytes as a hex string.
mod hex_bytes {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }
}
