// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! SEA SWATHplus interferometric sonar format (SXP processed and SXI parsed files).
//!
//! Records are little-endian with plain `[id: i32][size: i32]` framing and
//! no trailer. Processed pings carry georeferenced soundings in projected
//! metres; parsed files carry raw samples and time-stamped sensor records.

pub mod codec;
pub mod driver;
pub mod records;

pub use driver::{PingNavigation, SwathplusDriver, SwathplusState, VesselSounding};
pub use records::{
    Agds, Attitude, FileHeader, LineName, PingVersion, PositionEastNorth, PositionLatLon,
    RawText, ScalarSample, SensorOffset, SensorStamp, SwathplusRecord, SxiPing, SxiSample,
    SxpPing, SxpPoint, TextRecord, TransducerOffset, WaterLineOffset,
};

/// SXP file header id.
pub const ID_SXP_HEADER: u32 = 0x01df_01df;
/// Processed ping, pre-2010 layout.
pub const ID_PROCESSED_PING: u32 = 0x28;
/// Processed ping with TPU and transducer pitch.
pub const ID_PROCESSED_PING2: u32 = 0x52;
/// SXI file header id.
pub const ID_SXI_HEADER: u32 = 0x521d_52d1;
/// Parsed ping.
pub const ID_PARSED_PING: u32 = 0x29;
/// Parsed attitude.
pub const ID_PARSED_ATTITUDE: u32 = 0x2b;
/// Parsed latitude/longitude position.
pub const ID_POSITION_LL: u32 = 0x2c;
/// Parsed easting/northing position.
pub const ID_POSITION_EN: u32 = 0x2d;
/// Parsed surface sound velocity.
pub const ID_SSV: u32 = 0x2e;
/// Parsed echosounder altitude.
pub const ID_ECHOSOUNDER: u32 = 0x2f;
/// Parsed tide.
pub const ID_TIDE: u32 = 0x30;
/// Parsed seabed classification.
pub const ID_AGDS: u32 = 0x31;
/// Comment.
pub const ID_COMMENT: u32 = 0x100;
/// Position sensor lever arm.
pub const ID_POS_OFFSET: u32 = 0x101;
/// Motion sensor lever arm.
pub const ID_IMU_OFFSET: u32 = 0x102;
/// Transducer mounting offset.
pub const ID_TXER_OFFSET: u32 = 0x103;
/// Water line offset.
pub const ID_WL_OFFSET: u32 = 0x104;
/// Projection identifier.
pub const ID_PROJECTION: u32 = 0x105;

/// Every record id this driver accepts.
pub const KNOWN_RECORD_TYPES: [u32; 18] = [
    ID_SXP_HEADER,
    ID_PROCESSED_PING,
    ID_PROCESSED_PING2,
    ID_SXI_HEADER,
    ID_PARSED_PING,
    ID_PARSED_ATTITUDE,
    ID_POSITION_LL,
    ID_POSITION_EN,
    ID_SSV,
    ID_ECHOSOUNDER,
    ID_TIDE,
    ID_AGDS,
    ID_COMMENT,
    ID_POS_OFFSET,
    ID_IMU_OFFSET,
    ID_TXER_OFFSET,
    ID_WL_OFFSET,
    ID_PROJECTION,
];

/// Payload size of a file header.
pub const SIZE_FILE_HEADER: usize = 8;
/// Fixed part of a pre-2010 processed ping.
pub const SIZE_PING_FIXED_V1: usize = 256;
/// Fixed part of a processed ping with transducer pitch.
pub const SIZE_PING_FIXED_V2: usize = 264;
/// Pre-2010 processed point.
pub const SIZE_POINT_V1: usize = 40;
/// Processed point with TPU.
pub const SIZE_POINT_V2: usize = 48;
/// Fixed part of a parsed ping.
pub const SIZE_PARSED_PING_FIXED: usize = 35;
/// One parsed ping sample.
pub const SIZE_PARSED_SAMPLE: usize = 7;
/// Attitude, positions and sensor lever arms.
pub const SIZE_SENSOR_QUAD: usize = 25;
/// Sound speed, tide, echosounder and water line offset.
pub const SIZE_SENSOR_SCALAR: usize = 13;
/// Seabed classification.
pub const SIZE_AGDS: usize = 17;
/// Transducer offset.
pub const SIZE_TXER_OFFSET: usize = 41;
/// Fixed part of comment and projection records.
pub const SIZE_TEXT_FIXED: usize = 12;

/// Width of the line name field.
pub const MAX_LINENAME: usize = 40;
/// Largest record the reader accepts, header included. Room for a
/// processed ping of over 87 000 points, far beyond [`MAX_BEAMS`].
pub const MAX_RECORD_SIZE: usize = 1 << 22;
/// Transducer board info bytes.
pub const MAX_TX_INFO: usize = 3;
/// Maximum soundings per ping.
pub const MAX_BEAMS: usize = 2048;
/// Maximum sidescan pixels per ping.
pub const MAX_PIXELS: usize = 2048;

/// Across-track beam width below 200 kHz (degrees).
pub const BEAMWIDTH_117KHZ: f64 = 0.85;
/// Across-track beam width below 400 kHz (degrees).
pub const BEAMWIDTH_234KHZ: f64 = 0.55;
/// Across-track beam width at and above 400 kHz (degrees).
pub const BEAMWIDTH_468KHZ: f64 = 0.55;

/// Earliest plausible processed ping time (2000-01-01T00:00:00Z).
pub const MIN_PING_TIME: f64 = 946_684_800.0;

/// True if `record_type` is a SWATHplus record id.
pub fn is_known_record_type(record_type: u32) -> bool {
    KNOWN_RECORD_TYPES.contains(&record_type)
}
