// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;

use sonarcodec::io::formats::simrad::records::{
    Attitude, AttitudeSample, Bathymetry, Beam, DatagramStamp, Position,
};
use sonarcodec::io::formats::simrad::codec::FRAMING as EM_FRAMING;
use sonarcodec::io::formats::simrad::{SimradDriver, SimradRecord, EM3000, EM300};
use sonarcodec::io::formats::swathplus::records::{
    FileHeader, LineName, PingVersion, SensorStamp, SxpPing, SxpPoint, POINT_ACCEPTED,
};
use sonarcodec::io::formats::swathplus::{SwathplusDriver, SwathplusRecord};
use sonarcodec::types::GrowableBuffer;
use sonarcodec::{FormatDriver, Record};

// ============================================================================
// SWATHplus fixtures
// ============================================================================

/// 2014-05-13 16:53:20 UTC
pub const PING_TIME: f64 = 1_400_000_000.0;

pub fn sxp_header() -> Record {
    Record::Swathplus(SwathplusRecord::SxpHeader(FileHeader {
        swver: 3021,
        fmtver: 2,
    }))
}

pub fn sensor_stamp(offset_secs: i32) -> SensorStamp {
    SensorStamp {
        time_d: 1_400_000_000 + offset_secs,
        microsec: 500_000,
        channel: 1,
    }
}

/// A processed ping with `npoints` accepted soundings fanning out to starboard.
pub fn sxp_ping(pingnumber: u32, npoints: usize) -> SxpPing {
    let easting = 512_340.25;
    let northing = 5_702_118.5;
    let points = (0..npoints)
        .map(|i| SxpPoint {
            sampnum: i as i32,
            y: northing + 0.5 * i as f64,
            x: easting + 2.0 * i as f64 + 1.0,
            z: 18.0 + 0.25 * i as f32,
            amp: 1000 + i as u16,
            procamp: 900 + i as u16,
            status: POINT_ACCEPTED,
            tpu: 0.05,
        })
        .collect();

    SxpPing {
        version: PingVersion::V2,
        linename: LineName::new("line_0001"),
        pingnumber,
        time_d: PING_TIME + f64::from(pingnumber) * 0.25,
        notxers: 2,
        easting,
        northing,
        roll: 1.5,
        pitch: -0.75,
        heading: 42.0,
        height: 0.35,
        tide: 0.4,
        sos: 1498.5,
        txno: 1,
        txstat: 0,
        txpower: 6,
        analoggain: 8,
        nostaves: 4,
        txinfo: [0, 1, 2],
        freq: 1,
        frequency: 234_000.0,
        trnstime: 120,
        recvtime: 2400,
        samprate: 2,
        nosampsorig: npoints as i32,
        nosampslots: npoints as i32,
        txer_e: easting,
        txer_n: northing,
        txer_height: 0.6,
        txer_forward: 1.2,
        txer_starboard: 0.8,
        txer_azimuth: 90.0,
        txer_elevation: 30.0,
        txer_skew: 0.0,
        txer_time: 0.0,
        txer_waterdepth: 18.5,
        txer_pitch: 0.0,
        points,
    }
}

pub fn sxp_ping_record(pingnumber: u32, npoints: usize) -> Record {
    Record::Swathplus(SwathplusRecord::SxpPing(sxp_ping(pingnumber, npoints)))
}

// ============================================================================
// Simrad EM fixtures
// ============================================================================

pub fn em_stamp(sonar: u16, msec: i32, count: u16) -> DatagramStamp {
    DatagramStamp {
        sonar,
        date: 20020315,
        msec,
        count,
        serial: 142,
    }
}

/// Bathymetry with `nbeams` beams numbered 1..=nbeams.
pub fn em_bathymetry(sonar: u16, nbeams: u8) -> Bathymetry {
    let beams = (0..nbeams)
        .map(|i| Beam {
            depth: 2500 + i32::from(i) * 3,
            across: -400 + i16::from(i) * 8,
            along: 12,
            depression: 6000 - i16::from(i) * 10,
            azimuth: 9000,
            range: 800 + u16::from(i),
            quality: 140,
            window: 12,
            amplitude: -25,
            beam_num: i + 1,
        })
        .collect();
    Bathymetry {
        stamp: em_stamp(sonar, 43_200_000, 17),
        heading: 4200,
        ssv: 14985,
        xducer_depth: 350,
        nbeams_max: 135,
        depth_res: 10,
        distance_res: 10,
        sample_rate: 4500,
        beams,
        offset_multiplier: 0,
    }
}

pub fn em_position(input: &[u8]) -> Position {
    Position {
        stamp: em_stamp(EM300, 43_200_100, 18),
        latitude: 1_154_000_000,
        longitude: -52_000_000,
        quality: 120,
        speed: 410,
        course: 4210,
        heading: 4200,
        system: 0x81,
        input: input.to_vec(),
    }
}

pub fn em_attitude(nsamples: u16) -> Attitude {
    Attitude {
        stamp: em_stamp(EM3000, 43_199_000, 5),
        samples: (0..nsamples)
            .map(|i| AttitudeSample {
                time: i * 10,
                sensor_status: 0x90,
                roll: 150 - i as i16,
                pitch: -40,
                heave: 12,
                heading: 4200,
            })
            .collect(),
        heading_status: 1,
    }
}

/// One record of each decoded Simrad kind.
pub fn em_records() -> Vec<Record> {
    vec![
        Record::Simrad(SimradRecord::Attitude(em_attitude(3))),
        Record::Simrad(SimradRecord::Position(em_position(
            b"$INGGA,120000.10,5742.000,N,00312.000,W",
        ))),
        Record::Simrad(SimradRecord::Bathymetry(em_bathymetry(EM300, 5))),
        Record::Simrad(SimradRecord::Opaque {
            datagram_type: 0x52,
            sonar: EM300,
            body: vec![0x01, 0x31, 0x7c, 0x5b, 0x02, 0x93, 0x2e, 0x00, 0x11, 0x22],
        }),
    ]
}

// ============================================================================
// Encoding helpers
// ============================================================================

/// Encode records back to back with a fresh driver.
pub fn encode_all(mut driver: Box<dyn FormatDriver>, records: &[Record]) -> Vec<u8> {
    let mut out = GrowableBuffer::new();
    let mut bytes = Vec::new();
    for record in records {
        driver
            .write_one_record(record, &mut out)
            .expect("fixture record encodes");
        bytes.extend_from_slice(out.as_slice());
    }
    bytes
}

pub fn encode_swathplus(records: &[Record]) -> Vec<u8> {
    encode_all(SwathplusDriver::allocate(), records)
}

pub fn encode_simrad(records: &[Record]) -> Vec<u8> {
    encode_all(SimradDriver::allocate(), records)
}

/// EM stream as written by recorders that omit the size field.
pub fn strip_size_fields(mut sized: &[u8]) -> Vec<u8> {
    let mut bare = Vec::new();
    while !sized.is_empty() {
        let header = EM_FRAMING
            .parse_header(&sized[..8])
            .expect("fixture datagram header");
        let len = EM_FRAMING.record_len(&header);
        bare.extend_from_slice(&sized[4..len]);
        sized = &sized[len..];
    }
    bare
}

/// Write bytes to a named temporary file with the given suffix.
pub fn temp_file(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("sonarcodec_")
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

pub fn sensor_attitude(offset_secs: i32) -> Record {
    Record::Swathplus(SwathplusRecord::Attitude(
        sonarcodec::io::formats::swathplus::records::Attitude {
            stamp: sensor_stamp(offset_secs),
            roll: 0.5,
            pitch: -0.25,
            heading: 41.5,
            height: 0.1,
        },
    ))
}
