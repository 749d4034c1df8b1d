// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Simrad EM multibeam raw datagram format (EM120, EM300, EM1002, EM2000, EM3000 family).
//!
//! Datagrams are big-endian and checksummed:
//!
//! ```text
//! [size: u32][STX][type: u8][sonar: u16][date: i32][msec: i32][count: u16][serial: u16] ... [ETX][checksum: u16]
//! ```
//!
//! Navigation, attitude, clock and bathymetry datagrams are decoded; every
//! other known datagram is carried as an opaque body and written back
//! unchanged.

pub mod codec;
pub mod driver;
pub mod records;

pub use driver::{SimradDriver, SimradState};
pub use records::{
    Attitude, AttitudeSample, Bathymetry, Beam, Clock, DatagramStamp, Heading, HeadingSample,
    Height, Position, SimradRecord, Tide,
};

pub const ID_STOP2: u8 = 0x30;
pub const ID_OFF: u8 = 0x31;
pub const ID_ON: u8 = 0x32;
pub const ID_ATTITUDE: u8 = 0x41;
pub const ID_CLOCK: u8 = 0x43;
pub const ID_BATH: u8 = 0x44;
pub const ID_RAWBEAM: u8 = 0x46;
pub const ID_SSV: u8 = 0x47;
pub const ID_HEADING: u8 = 0x48;
pub const ID_START: u8 = 0x49;
pub const ID_TILT: u8 = 0x4a;
pub const ID_POS: u8 = 0x50;
pub const ID_RUN_PARAMETER: u8 = 0x52;
pub const ID_SS: u8 = 0x53;
pub const ID_TIDE: u8 = 0x54;
pub const ID_SVP2: u8 = 0x55;
pub const ID_SVP: u8 = 0x56;
pub const ID_HEIGHT: u8 = 0x68;
pub const ID_STOP: u8 = 0x69;

/// Datagram types accepted by the header check.
pub const KNOWN_DATAGRAM_TYPES: [u8; 19] = [
    ID_ATTITUDE,
    ID_CLOCK,
    ID_BATH,
    ID_RAWBEAM,
    ID_SSV,
    ID_HEADING,
    ID_START,
    ID_TILT,
    ID_POS,
    ID_RUN_PARAMETER,
    ID_SS,
    ID_TIDE,
    ID_SVP2,
    ID_SVP,
    ID_HEIGHT,
    ID_STOP,
    ID_STOP2,
    ID_OFF,
    ID_ON,
];

pub const EM120: u16 = 120;
pub const EM300: u16 = 300;
pub const EM1002: u16 = 1002;
pub const EM2000: u16 = 2000;
pub const EM3000: u16 = 3000;
pub const EM3002: u16 = 3020;

/// Sonar models accepted by the header check.
pub const KNOWN_SONARS: [u16; 14] = [
    EM120, EM300, EM1002, EM2000, EM3000, 3001, 3002, 3003, 3004, 3005, 3006, 3007, 3008, EM3002,
];

/// Body sizes of the fixed-size datagrams.
pub const SIZE_CLOCK_BODY: usize = 21;
pub const SIZE_TIDE_BODY: usize = 23;
pub const SIZE_HEIGHT_BODY: usize = 17;

/// Date, time and counters at the start of every body.
pub const SIZE_STAMP: usize = 12;
/// Fixed part of heading and attitude bodies (stamp plus sample count).
pub const SIZE_SAMPLED_HEADER: usize = 14;
pub const SIZE_HEADING_SAMPLE: usize = 4;
pub const SIZE_ATTITUDE_SAMPLE: usize = 12;
/// Fixed part of a position body.
pub const SIZE_POS_HEADER: usize = 30;
/// Fixed part of a bathymetry body.
pub const SIZE_BATH_HEADER: usize = 24;
pub const SIZE_BATH_BEAM: usize = 16;

/// Maximum bathymetry beams per ping.
pub const MAX_BEAMS: usize = 254;
/// Maximum sidescan pixels per ping.
pub const MAX_PIXELS: usize = 1024;
/// Largest datagram the reader accepts, size field included.
pub const MAX_DATAGRAM_SIZE: usize = 1 << 20;

/// Default beam width (degrees).
pub const BEAMWIDTH: f64 = 2.0;

/// Earliest plausible datagram date; the EM2 family postdates it.
pub const MIN_DATE: i32 = 19960101;

/// True if `datagram_type` is a known EM datagram.
pub fn is_known_datagram_type(datagram_type: u32) -> bool {
    u8::try_from(datagram_type).is_ok_and(|t| KNOWN_DATAGRAM_TYPES.contains(&t))
}

/// True if `sonar` is a supported EM model.
pub fn is_known_sonar(sonar: u16) -> bool {
    KNOWN_SONARS.contains(&sonar)
}

/// Depth fields are unsigned on the deep-water models.
pub fn unsigned_depth(sonar: u16) -> bool {
    sonar == EM120 || sonar == EM300
}

/// Datagram name for listings.
pub fn datagram_name(datagram_type: u8) -> &'static str {
    match datagram_type {
        ID_STOP2 => "STOP2",
        ID_OFF => "OFF",
        ID_ON => "ON",
        ID_ATTITUDE => "ATTITUDE",
        ID_CLOCK => "CLOCK",
        ID_BATH => "BATH",
        ID_RAWBEAM => "RAWBEAM",
        ID_SSV => "SSV",
        ID_HEADING => "HEADING",
        ID_START => "START",
        ID_TILT => "TILT",
        ID_POS => "POS",
        ID_RUN_PARAMETER => "RUN_PARAMETER",
        ID_SS => "SS",
        ID_TIDE => "TIDE",
        ID_SVP2 => "SVP2",
        ID_SVP => "SVP",
        ID_HEIGHT => "HEIGHT",
        ID_STOP => "STOP",
        _ => "UNKNOWN",
    }
}
