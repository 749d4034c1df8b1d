// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! SWATHplus record codec tests.
//!
//! Round trips every record kind through the plain little-endian framing and
//! checks the byte layouts that other tools depend on.

mod common;

use common::{sensor_stamp, sxp_ping, PING_TIME};
use sonarcodec::io::formats::swathplus::codec::{decode, encode, FRAMING};
use sonarcodec::io::formats::swathplus::records::{
    Agds, Attitude, FileHeader, PingVersion, PositionEastNorth, PositionLatLon, RawText,
    ScalarSample, SensorOffset, SxiPing, SxiSample, TextRecord, TransducerOffset,
    WaterLineOffset,
};
use sonarcodec::io::formats::swathplus::driver::{extract_soundings, ping_heave, set_ping_height};
use sonarcodec::io::formats::swathplus::{
    SwathplusRecord, ID_COMMENT, ID_PROCESSED_PING, ID_PROCESSED_PING2, SIZE_PING_FIXED_V2,
    SIZE_POINT_V2,
};
use sonarcodec::transform::{regeoreference, GeorefOutcome, Georeferenced, NavUpdate};
use sonarcodec::types::GrowableBuffer;
use sonarcodec::{CodecError, RecordHeader, SonarRecord};

fn encode_record(record: &SwathplusRecord) -> (RecordHeader, Vec<u8>) {
    let mut out = GrowableBuffer::new();
    let header = encode(record, &mut out).unwrap();
    (header, out.into_inner())
}

fn roundtrip(record: SwathplusRecord) -> Vec<u8> {
    let (header, bytes) = encode_record(&record);
    assert_eq!(header.record_type, record.record_type());
    assert_eq!(header.payload_size as usize, bytes.len() - 8);
    let payload = FRAMING.payload(&header, &bytes).unwrap();
    let decoded = decode(header.record_type, payload).unwrap();
    assert_eq!(decoded, record, "round trip of {}", record.name());
    bytes
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_roundtrip_every_kind() {
    let stamp = sensor_stamp(3);
    let records = vec![
        SwathplusRecord::SxpHeader(FileHeader {
            swver: 3021,
            fmtver: 2,
        }),
        SwathplusRecord::SxiHeader(FileHeader {
            swver: 3021,
            fmtver: 1,
        }),
        SwathplusRecord::SxpPing(sxp_ping(9, 3)),
        SwathplusRecord::SxiPing(SxiPing {
            time_d: 1_400_000_003,
            microsec: 12_000,
            channel: 1,
            pingnumber: 9,
            frequency: 117_000.0,
            samp_period: 2.5e-5,
            sos: 1497.0,
            txpulse: 3,
            data_options: 1,
            ping_state: 2,
            max_count: 2,
            reserve1: 0,
            samples: vec![
                SxiSample {
                    sampnum: 10,
                    angle: -1200,
                    amplitude: 512,
                    quality: 3,
                },
                SxiSample {
                    sampnum: 11,
                    angle: 1300,
                    amplitude: 498,
                    quality: 2,
                },
            ],
        }),
        SwathplusRecord::Attitude(Attitude {
            stamp,
            roll: 0.5,
            pitch: -1.0,
            heading: 181.25,
            height: 0.125,
        }),
        SwathplusRecord::PositionLatLon(PositionLatLon {
            stamp,
            latitude: 57.7,
            longitude: -3.2,
        }),
        SwathplusRecord::PositionEastNorth(PositionEastNorth {
            stamp,
            easting: 512_340.25,
            northing: 5_702_118.5,
        }),
        SwathplusRecord::SoundSpeed(ScalarSample {
            stamp,
            value: 1497.5,
        }),
        SwathplusRecord::Echosounder(ScalarSample { stamp, value: 18.5 }),
        SwathplusRecord::Tide(ScalarSample { stamp, value: 0.75 }),
        SwathplusRecord::Agds(Agds {
            stamp,
            hardness: 0.4,
            roughness: 0.6,
        }),
        SwathplusRecord::Comment(TextRecord::new(1_400_000_003, 0, "start of line")),
        SwathplusRecord::PosOffset(SensorOffset {
            stamp,
            height: -2.0,
            forward: 1.0,
            starboard: 0.5,
            time: 0.0,
        }),
        SwathplusRecord::ImuOffset(SensorOffset {
            stamp,
            height: 0.2,
            forward: 0.0,
            starboard: 0.0,
            time: 0.01,
        }),
        SwathplusRecord::TxerOffset(TransducerOffset {
            stamp,
            height: 0.6,
            forward: 1.2,
            starboard: 0.8,
            azimuth: 90.0,
            elevation: 30.0,
            pitch: 0.0,
            skew: 0.0,
            time: 0.0,
        }),
        SwathplusRecord::WlOffset(WaterLineOffset {
            stamp,
            height: 0.3,
        }),
        SwathplusRecord::Projection(TextRecord::new(0, 0, "UTM zone 30N WGS84")),
    ];

    for record in records {
        roundtrip(record);
    }
}

#[test]
fn test_ping_layout() {
    let bytes = roundtrip(SwathplusRecord::SxpPing(sxp_ping(1, 3)));
    assert_eq!(&bytes[..4], &ID_PROCESSED_PING2.to_le_bytes());
    assert_eq!(bytes.len(), 8 + SIZE_PING_FIXED_V2 + 3 * SIZE_POINT_V2);

    // line name is NUL-padded
    let name = &bytes[8..8 + 40];
    assert_eq!(&name[..9], b"line_0001");
    assert!(name[9..].iter().all(|&b| b == 0));
}

#[test]
fn test_v1_ping_has_no_tpu() {
    let mut ping = sxp_ping(1, 2);
    ping.version = PingVersion::V1;
    ping.txer_pitch = 0.0;
    for point in &mut ping.points {
        point.tpu = 0.0;
    }
    let bytes = roundtrip(SwathplusRecord::SxpPing(ping));
    assert_eq!(&bytes[..4], &ID_PROCESSED_PING.to_le_bytes());
}

#[test]
fn test_comment_is_padded_to_four() {
    let bytes = roundtrip(SwathplusRecord::Comment(TextRecord::new(1, 0, "abc")));
    // 12 fixed bytes + 3 chars + 1 NUL
    assert_eq!(bytes.len(), 8 + 16);
    assert_eq!(bytes[bytes.len() - 1], 0);
}

#[test]
fn test_non_utf8_comment_is_kept_verbatim() {
    // ISO-8859-1 "café" with a stray byte after the terminator
    let text = [b'c', b'a', b'f', 0xe9, 0, b'z', 0, 0];
    let mut payload = Vec::new();
    payload.extend_from_slice(&1_400_000_000i32.to_le_bytes());
    payload.extend_from_slice(&0i32.to_le_bytes());
    payload.extend_from_slice(&(text.len() as i32).to_le_bytes());
    payload.extend_from_slice(&text);

    let decoded = decode(ID_COMMENT, &payload).unwrap();
    let SwathplusRecord::Comment(comment) = &decoded else {
        panic!("expected a comment, got {decoded:?}");
    };
    assert_eq!(comment.text, RawText::from_bytes(text.to_vec()));
    assert_eq!(comment.text.to_string_lossy(), "caf\u{fffd}");

    let (_, bytes) = encode_record(&decoded);
    assert_eq!(&bytes[8..], payload.as_slice());
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_point_count_guard() {
    let (header, bytes) = encode_record(&SwathplusRecord::SxpPing(sxp_ping(1, 3)));
    // a payload shortened by one point still claims three
    let payload = &bytes[8..bytes.len() - SIZE_POINT_V2];
    let err = decode(header.record_type, payload).unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { .. }), "{err}");
}

#[test]
fn test_implausible_ping_time() {
    let mut ping = sxp_ping(1, 1);
    ping.time_d = 12.0;
    let (header, bytes) = encode_record(&SwathplusRecord::SxpPing(ping));
    let err = decode(header.record_type, &bytes[8..]).unwrap_err();
    assert!(matches!(err, CodecError::UnintelligibleData { .. }), "{err}");
}

#[test]
fn test_sxi_time_scale_is_reproduced() {
    let record = SwathplusRecord::PositionEastNorth(PositionEastNorth {
        stamp: sensor_stamp(0),
        easting: 1.0,
        northing: 2.0,
    });
    // microseconds are scaled by 1e6, not 1e-6
    let expected = 1_400_000_000.0 + 500_000.0 * 1e6;
    assert_eq!(record.time_seconds(), Some(expected));

    let comment = SwathplusRecord::Comment(TextRecord::new(1_400_000_000, 500_000, "x"));
    let t = comment.time_seconds().unwrap();
    assert!((t - 1_400_000_000.5).abs() < 1e-6);
}

// ============================================================================
// Ping geometry
// ============================================================================

#[test]
fn test_soundings_relative_to_transducer() {
    let mut ping = sxp_ping(1, 1);
    ping.heading = 0.0;
    let soundings = extract_soundings(&ping);
    assert_eq!(soundings.len(), 1);
    assert!((soundings[0].across_track - 1.0).abs() < 1e-9);
    assert!(soundings[0].along_track.abs() < 1e-9);
    assert!((soundings[0].bath - 18.0).abs() < 1e-6);
    assert!(soundings[0].accepted);
}

#[test]
fn test_heave_round_trip() {
    let mut ping = sxp_ping(1, 0);
    let heave = ping_heave(&ping);
    let height = ping.height;
    set_ping_height(&mut ping, heave + 0.5);
    assert!((ping_heave(&ping) - heave - 0.5).abs() < 1e-9);
    assert!((ping.height - (height - 0.5)).abs() < 1e-9);
}

#[test]
fn test_regeoreference_decoded_ping() {
    let (header, bytes) = encode_record(&SwathplusRecord::SxpPing(sxp_ping(4, 3)));
    let decoded = decode(header.record_type, &bytes[8..]).unwrap();
    let SwathplusRecord::SxpPing(mut ping) = decoded else {
        panic!("expected a processed ping");
    };
    let original = ping.clone();

    // same navigation: nothing moves
    let same = NavUpdate::from_geometry(&ping.geometry());
    assert_eq!(regeoreference(&mut ping, &same), GeorefOutcome::Unchanged);
    assert_eq!(ping, original);

    // 10 m east: every point follows
    let mut update = same;
    update.navlon += 10.0;
    assert_eq!(
        regeoreference(&mut ping, &update),
        GeorefOutcome::Transformed { points: 3 }
    );
    assert!((ping.easting - original.easting - 10.0).abs() < 1e-9);
    for (moved, old) in ping.points.iter().zip(&original.points) {
        assert!((moved.x - old.x - 10.0).abs() < 1e-6);
        assert!((moved.y - old.y).abs() < 1e-6);
        assert!((moved.z - old.z).abs() < 1e-4);
    }
    assert!((ping.time_d - (PING_TIME + 1.0)).abs() < 1e-9);
}
