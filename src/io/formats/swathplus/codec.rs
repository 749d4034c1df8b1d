// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field-by-field SWATHplus payload codec.
//!
//! Every layout is read strictly left to right with explicit offsets;
//! padding bytes are skipped on read and zero-filled on write. Counted
//! arrays are checked against the remaining payload before allocation.

use crate::encoding::{Endianness, FieldReader, FieldWriter, Framing};
use crate::io::metadata::RecordHeader;
use crate::io::traits::SonarRecord;
use crate::types::GrowableBuffer;
use crate::{CodecError, Result};

use super::records::{
    Agds, Attitude, FileHeader, LineName, PingVersion, PositionEastNorth, PositionLatLon,
    RawText, ScalarSample, SensorOffset, SensorStamp, SwathplusRecord, SxiPing, SxiSample,
    SxpPing, SxpPoint, TextRecord, TransducerOffset, WaterLineOffset,
};
use super::*;

/// Byte order of every SWATHplus field.
pub const ENDIANNESS: Endianness = Endianness::Little;

/// Framing shared by SXP and SXI files.
pub const FRAMING: Framing = Framing::Plain {
    endianness: ENDIANNESS,
};

/// Decode one payload whose header named `record_type`.
pub fn decode(record_type: u32, payload: &[u8]) -> Result<SwathplusRecord> {
    let r = FieldReader::new(payload, ENDIANNESS);
    match record_type {
        ID_SXP_HEADER => decode_file_header(r).map(SwathplusRecord::SxpHeader),
        ID_SXI_HEADER => decode_file_header(r).map(SwathplusRecord::SxiHeader),
        ID_PROCESSED_PING => decode_sxp_ping(r, PingVersion::V1).map(SwathplusRecord::SxpPing),
        ID_PROCESSED_PING2 => decode_sxp_ping(r, PingVersion::V2).map(SwathplusRecord::SxpPing),
        ID_PARSED_PING => decode_sxi_ping(r).map(SwathplusRecord::SxiPing),
        ID_PARSED_ATTITUDE => {
            let mut r = sized(r, "PARSED_ATTITUDE", SIZE_SENSOR_QUAD)?;
            Ok(SwathplusRecord::Attitude(Attitude {
                stamp: read_stamp(&mut r)?,
                roll: r.read_f32()?,
                pitch: r.read_f32()?,
                heading: r.read_f32()?,
                height: r.read_f32()?,
            }))
        }
        ID_POSITION_LL => {
            let mut r = sized(r, "PARSED_POSITION_LL", SIZE_SENSOR_QUAD)?;
            Ok(SwathplusRecord::PositionLatLon(PositionLatLon {
                stamp: read_stamp(&mut r)?,
                latitude: r.read_f64()?,
                longitude: r.read_f64()?,
            }))
        }
        ID_POSITION_EN => {
            let mut r = sized(r, "PARSED_POSITION_EN", SIZE_SENSOR_QUAD)?;
            Ok(SwathplusRecord::PositionEastNorth(PositionEastNorth {
                stamp: read_stamp(&mut r)?,
                easting: r.read_f64()?,
                northing: r.read_f64()?,
            }))
        }
        ID_SSV => decode_scalar(r, "PARSED_SSV").map(SwathplusRecord::SoundSpeed),
        ID_ECHOSOUNDER => decode_scalar(r, "PARSED_ECHOSOUNDER").map(SwathplusRecord::Echosounder),
        ID_TIDE => decode_scalar(r, "PARSED_TIDE").map(SwathplusRecord::Tide),
        ID_AGDS => {
            let mut r = sized(r, "PARSED_AGDS", SIZE_AGDS)?;
            Ok(SwathplusRecord::Agds(Agds {
                stamp: read_stamp(&mut r)?,
                hardness: r.read_f32()?,
                roughness: r.read_f32()?,
            }))
        }
        ID_POS_OFFSET => decode_sensor_offset(r, "POS_OFFSET").map(SwathplusRecord::PosOffset),
        ID_IMU_OFFSET => decode_sensor_offset(r, "IMU_OFFSET").map(SwathplusRecord::ImuOffset),
        ID_TXER_OFFSET => {
            let mut r = sized(r, "TXER_OFFSET", SIZE_TXER_OFFSET)?;
            Ok(SwathplusRecord::TxerOffset(TransducerOffset {
                stamp: read_stamp(&mut r)?,
                height: r.read_f32()?,
                forward: r.read_f32()?,
                starboard: r.read_f32()?,
                azimuth: r.read_f32()?,
                elevation: r.read_f32()?,
                pitch: r.read_f32()?,
                skew: r.read_f32()?,
                time: r.read_f32()?,
            }))
        }
        ID_WL_OFFSET => {
            let mut r = sized(r, "WL_OFFSET", SIZE_SENSOR_SCALAR)?;
            Ok(SwathplusRecord::WlOffset(WaterLineOffset {
                stamp: read_stamp(&mut r)?,
                height: r.read_f32()?,
            }))
        }
        ID_COMMENT => decode_text(r, "COMMENT").map(SwathplusRecord::Comment),
        ID_PROJECTION => decode_text(r, "PROJECTION").map(SwathplusRecord::Projection),
        other => Err(CodecError::unsupported(format!(
            "SWATHplus record type {other:#x}"
        ))),
    }
}

/// Encode `record` into `out` with SWATHplus framing.
///
/// `out` is cleared first. Returns the header of the encoded record.
pub fn encode(record: &SwathplusRecord, out: &mut GrowableBuffer) -> Result<RecordHeader> {
    FRAMING.begin(out, record.record_type(), 0)?;
    {
        let mut w = FieldWriter::new(out, ENDIANNESS);
        match record {
            SwathplusRecord::SxpHeader(h) | SwathplusRecord::SxiHeader(h) => {
                w.write_i32(h.swver)?;
                w.write_i32(h.fmtver)?;
            }
            SwathplusRecord::SxpPing(ping) => encode_sxp_ping(&mut w, ping)?,
            SwathplusRecord::SxiPing(ping) => encode_sxi_ping(&mut w, ping)?,
            SwathplusRecord::Attitude(a) => {
                write_stamp(&mut w, &a.stamp)?;
                w.write_f32(a.roll)?;
                w.write_f32(a.pitch)?;
                w.write_f32(a.heading)?;
                w.write_f32(a.height)?;
            }
            SwathplusRecord::PositionLatLon(p) => {
                write_stamp(&mut w, &p.stamp)?;
                w.write_f64(p.latitude)?;
                w.write_f64(p.longitude)?;
            }
            SwathplusRecord::PositionEastNorth(p) => {
                write_stamp(&mut w, &p.stamp)?;
                w.write_f64(p.easting)?;
                w.write_f64(p.northing)?;
            }
            SwathplusRecord::SoundSpeed(s)
            | SwathplusRecord::Echosounder(s)
            | SwathplusRecord::Tide(s) => {
                write_stamp(&mut w, &s.stamp)?;
                w.write_f32(s.value)?;
            }
            SwathplusRecord::Agds(a) => {
                write_stamp(&mut w, &a.stamp)?;
                w.write_f32(a.hardness)?;
                w.write_f32(a.roughness)?;
            }
            SwathplusRecord::PosOffset(o) | SwathplusRecord::ImuOffset(o) => {
                write_stamp(&mut w, &o.stamp)?;
                w.write_f32(o.height)?;
                w.write_f32(o.forward)?;
                w.write_f32(o.starboard)?;
                w.write_f32(o.time)?;
            }
            SwathplusRecord::TxerOffset(o) => {
                write_stamp(&mut w, &o.stamp)?;
                w.write_f32(o.height)?;
                w.write_f32(o.forward)?;
                w.write_f32(o.starboard)?;
                w.write_f32(o.azimuth)?;
                w.write_f32(o.elevation)?;
                w.write_f32(o.pitch)?;
                w.write_f32(o.skew)?;
                w.write_f32(o.time)?;
            }
            SwathplusRecord::WlOffset(o) => {
                write_stamp(&mut w, &o.stamp)?;
                w.write_f32(o.height)?;
            }
            SwathplusRecord::Comment(t) | SwathplusRecord::Projection(t) => {
                encode_text(&mut w, t)?
            }
        }
    }
    FRAMING.finish(out)
}

/// Check a fixed-size payload is at least `size` bytes long.
fn sized<'a>(r: FieldReader<'a>, context: &'static str, size: usize) -> Result<FieldReader<'a>> {
    if r.remaining() < size {
        return Err(CodecError::malformed(
            context,
            format!("payload of {} bytes, layout needs {size}", r.remaining()),
        ));
    }
    Ok(r.with_context(context))
}

fn decode_file_header(r: FieldReader<'_>) -> Result<FileHeader> {
    let mut r = sized(r, "FILE_HEADER", SIZE_FILE_HEADER)?;
    Ok(FileHeader {
        swver: r.read_i32()?,
        fmtver: r.read_i32()?,
    })
}

fn read_stamp(r: &mut FieldReader<'_>) -> Result<SensorStamp> {
    Ok(SensorStamp {
        time_d: r.read_i32()?,
        microsec: r.read_i32()?,
        channel: r.read_u8()?,
    })
}

fn write_stamp(w: &mut FieldWriter<'_>, stamp: &SensorStamp) -> Result<()> {
    w.write_i32(stamp.time_d)?;
    w.write_i32(stamp.microsec)?;
    w.write_u8(stamp.channel)
}

fn decode_scalar(r: FieldReader<'_>, context: &'static str) -> Result<ScalarSample> {
    let mut r = sized(r, context, SIZE_SENSOR_SCALAR)?;
    Ok(ScalarSample {
        stamp: read_stamp(&mut r)?,
        value: r.read_f32()?,
    })
}

fn decode_sensor_offset(r: FieldReader<'_>, context: &'static str) -> Result<SensorOffset> {
    let mut r = sized(r, context, SIZE_SENSOR_QUAD)?;
    Ok(SensorOffset {
        stamp: read_stamp(&mut r)?,
        height: r.read_f32()?,
        forward: r.read_f32()?,
        starboard: r.read_f32()?,
        time: r.read_f32()?,
    })
}

/// Turn a stored signed count into a length, rejecting negatives.
fn count_field(value: i32, context: &'static str, field: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| CodecError::malformed(context, format!("negative {field} count {value}")))
}

fn decode_sxp_ping(r: FieldReader<'_>, version: PingVersion) -> Result<SxpPing> {
    let (context, fixed, point_size) = match version {
        PingVersion::V1 => ("PROCESSED_PING", SIZE_PING_FIXED_V1, SIZE_POINT_V1),
        PingVersion::V2 => ("PROCESSED_PING2", SIZE_PING_FIXED_V2, SIZE_POINT_V2),
    };
    let mut r = sized(r, context, fixed)?;

    let linename = LineName::from_bytes(r.read_array()?);
    let pingnumber = r.read_u32()?;
    r.skip_padding(4)?;
    let time_d = r.read_f64()?;
    if !time_d.is_finite() || time_d < MIN_PING_TIME {
        return Err(CodecError::unintelligible(
            context,
            format!("ping {pingnumber} has implausible time {time_d}"),
        ));
    }
    let notxers = r.read_i32()?;
    r.skip_padding(4)?;
    let easting = r.read_f64()?;
    let northing = r.read_f64()?;
    let roll = r.read_f64()?;
    let pitch = r.read_f64()?;
    let heading = r.read_f64()?;
    let height = r.read_f64()?;
    let tide = r.read_f64()?;
    let sos = r.read_f64()?;
    let txno = r.read_u8()?;
    let txstat = r.read_u8()?;
    let txpower = r.read_u8()?;
    r.skip_padding(1)?;
    let analoggain = r.read_i16()?;
    let nostaves = r.read_u8()?;
    let txinfo: [u8; MAX_TX_INFO] = r.read_array()?;
    r.skip_padding(1)?;
    let freq = r.read_u8()?;
    r.skip_padding(4)?;
    let frequency = r.read_f64()?;
    let trnstime = r.read_i16()?;
    let recvtime = r.read_i16()?;
    let samprate = r.read_u8()?;
    r.skip_padding(3)?;
    let nosampsorig = r.read_i32()?;
    let nosampsfile = count_field(r.read_i32()?, context, "point")?;
    let nosampslots = r.read_i32()?;
    r.skip_padding(4)?;
    let txer_e = r.read_f64()?;
    let txer_n = r.read_f64()?;
    let txer_height = r.read_f64()?;
    let txer_forward = r.read_f64()?;
    let txer_starboard = r.read_f64()?;
    let txer_azimuth = r.read_f64()?;
    let txer_elevation = r.read_f64()?;
    let txer_skew = r.read_f64()?;
    let txer_time = r.read_f64()?;
    let txer_waterdepth = r.read_f64()?;
    let txer_pitch = match version {
        PingVersion::V1 => 0.0,
        PingVersion::V2 => r.read_f64()?,
    };

    r.ensure_items(nosampsfile, point_size)?;
    let mut points = Vec::with_capacity(nosampsfile);
    for _ in 0..nosampsfile {
        let sampnum = r.read_i32()?;
        r.skip_padding(4)?;
        let y = r.read_f64()?;
        let x = r.read_f64()?;
        let z = r.read_f32()?;
        let amp = r.read_u16()?;
        let procamp = r.read_u16()?;
        let status = r.read_u8()?;
        r.skip_padding(7)?;
        let tpu = match version {
            PingVersion::V1 => 0.0,
            PingVersion::V2 => r.read_f64()?,
        };
        points.push(SxpPoint {
            sampnum,
            y,
            x,
            z,
            amp,
            procamp,
            status,
            tpu,
        });
    }

    Ok(SxpPing {
        version,
        linename,
        pingnumber,
        time_d,
        notxers,
        easting,
        northing,
        roll,
        pitch,
        heading,
        height,
        tide,
        sos,
        txno,
        txstat,
        txpower,
        analoggain,
        nostaves,
        txinfo,
        freq,
        frequency,
        trnstime,
        recvtime,
        samprate,
        nosampsorig,
        nosampslots,
        txer_e,
        txer_n,
        txer_height,
        txer_forward,
        txer_starboard,
        txer_azimuth,
        txer_elevation,
        txer_skew,
        txer_time,
        txer_waterdepth,
        txer_pitch,
        points,
    })
}

fn encode_sxp_ping(w: &mut FieldWriter<'_>, ping: &SxpPing) -> Result<()> {
    let count = i32::try_from(ping.points.len())
        .map_err(|_| CodecError::unsupported(format!("{} points", ping.points.len())))?;

    w.write_bytes(ping.linename.as_bytes())?;
    w.write_u32(ping.pingnumber)?;
    w.pad(4)?;
    w.write_f64(ping.time_d)?;
    w.write_i32(ping.notxers)?;
    w.pad(4)?;
    for value in [
        ping.easting,
        ping.northing,
        ping.roll,
        ping.pitch,
        ping.heading,
        ping.height,
        ping.tide,
        ping.sos,
    ] {
        w.write_f64(value)?;
    }
    w.write_u8(ping.txno)?;
    w.write_u8(ping.txstat)?;
    w.write_u8(ping.txpower)?;
    w.pad(1)?;
    w.write_i16(ping.analoggain)?;
    w.write_u8(ping.nostaves)?;
    w.write_bytes(&ping.txinfo)?;
    w.pad(1)?;
    w.write_u8(ping.freq)?;
    w.pad(4)?;
    w.write_f64(ping.frequency)?;
    w.write_i16(ping.trnstime)?;
    w.write_i16(ping.recvtime)?;
    w.write_u8(ping.samprate)?;
    w.pad(3)?;
    w.write_i32(ping.nosampsorig)?;
    w.write_i32(count)?;
    w.write_i32(ping.nosampslots)?;
    w.pad(4)?;
    for value in [
        ping.txer_e,
        ping.txer_n,
        ping.txer_height,
        ping.txer_forward,
        ping.txer_starboard,
        ping.txer_azimuth,
        ping.txer_elevation,
        ping.txer_skew,
        ping.txer_time,
        ping.txer_waterdepth,
    ] {
        w.write_f64(value)?;
    }
    if ping.version == PingVersion::V2 {
        w.write_f64(ping.txer_pitch)?;
    }

    for point in &ping.points {
        w.write_i32(point.sampnum)?;
        w.pad(4)?;
        w.write_f64(point.y)?;
        w.write_f64(point.x)?;
        w.write_f32(point.z)?;
        w.write_u16(point.amp)?;
        w.write_u16(point.procamp)?;
        w.write_u8(point.status)?;
        w.pad(7)?;
        if ping.version == PingVersion::V2 {
            w.write_f64(point.tpu)?;
        }
    }
    Ok(())
}

fn decode_sxi_ping(r: FieldReader<'_>) -> Result<SxiPing> {
    let mut r = sized(r, "PARSED_PING", SIZE_PARSED_PING_FIXED)?;
    let time_d = r.read_i32()?;
    let microsec = r.read_i32()?;
    let channel = r.read_u8()?;
    let pingnumber = r.read_u32()?;
    let frequency = r.read_f32()?;
    let samp_period = r.read_f32()?;
    let nosamps = usize::from(r.read_u16()?);
    let sos = r.read_f32()?;
    let txpulse = r.read_i16()?;
    let data_options = r.read_i8()?;
    let ping_state = r.read_u8()?;
    let max_count = r.read_u16()?;
    let reserve1 = r.read_u16()?;

    r.ensure_items(nosamps, SIZE_PARSED_SAMPLE)?;
    let mut samples = Vec::with_capacity(nosamps);
    for _ in 0..nosamps {
        samples.push(SxiSample {
            sampnum: r.read_u16()?,
            angle: r.read_i16()?,
            amplitude: r.read_u16()?,
            quality: r.read_u8()?,
        });
    }

    Ok(SxiPing {
        time_d,
        microsec,
        channel,
        pingnumber,
        frequency,
        samp_period,
        sos,
        txpulse,
        data_options,
        ping_state,
        max_count,
        reserve1,
        samples,
    })
}

fn encode_sxi_ping(w: &mut FieldWriter<'_>, ping: &SxiPing) -> Result<()> {
    let nosamps = u16::try_from(ping.samples.len()).map_err(|_| {
        CodecError::unsupported(format!("{} samples in a parsed ping", ping.samples.len()))
    })?;
    w.write_i32(ping.time_d)?;
    w.write_i32(ping.microsec)?;
    w.write_u8(ping.channel)?;
    w.write_u32(ping.pingnumber)?;
    w.write_f32(ping.frequency)?;
    w.write_f32(ping.samp_period)?;
    w.write_u16(nosamps)?;
    w.write_f32(ping.sos)?;
    w.write_i16(ping.txpulse)?;
    w.write_i8(ping.data_options)?;
    w.write_u8(ping.ping_state)?;
    w.write_u16(ping.max_count)?;
    w.write_u16(ping.reserve1)?;
    for sample in &ping.samples {
        w.write_u16(sample.sampnum)?;
        w.write_i16(sample.angle)?;
        w.write_u16(sample.amplitude)?;
        w.write_u8(sample.quality)?;
    }
    Ok(())
}

fn decode_text(r: FieldReader<'_>, context: &'static str) -> Result<TextRecord> {
    let mut r = sized(r, context, SIZE_TEXT_FIXED)?;
    let time_d = r.read_i32()?;
    let microsec = r.read_i32()?;
    let nchars = count_field(r.read_i32()?, context, "character")?;
    r.ensure_items(nchars, 1)?;
    let text = RawText::from_bytes(r.read_bytes(nchars)?);
    Ok(TextRecord {
        time_d,
        microsec,
        text,
    })
}

/// Stored bytes go out unchanged; [`TextRecord::new`] does the NUL padding.
fn encode_text(w: &mut FieldWriter<'_>, text: &TextRecord) -> Result<()> {
    let bytes = text.text.as_bytes();
    let nchars = i32::try_from(bytes.len())
        .map_err(|_| CodecError::unsupported(format!("text of {} bytes", bytes.len())))?;
    w.write_i32(text.time_d)?;
    w.write_i32(text.microsec)?;
    w.write_i32(nchars)?;
    w.write_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(record: SwathplusRecord) -> (RecordHeader, Vec<u8>) {
        let mut out = GrowableBuffer::new();
        let header = encode(&record, &mut out).unwrap();
        let payload = FRAMING.payload(&header, out.as_slice()).unwrap();
        let decoded = decode(header.record_type, payload).unwrap();
        assert_eq!(decoded, record);
        (header, out.into_inner())
    }

    fn stamp() -> SensorStamp {
        SensorStamp {
            time_d: 1_400_000_000,
            microsec: 250_000,
            channel: 2,
        }
    }

    #[test]
    fn test_sensor_sizes() {
        let (h, _) = roundtrip(SwathplusRecord::Attitude(Attitude {
            stamp: stamp(),
            roll: 1.5,
            pitch: -0.5,
            heading: 271.0,
            height: 0.25,
        }));
        assert_eq!(h.payload_size as usize, SIZE_SENSOR_QUAD);

        let (h, _) = roundtrip(SwathplusRecord::Tide(ScalarSample {
            stamp: stamp(),
            value: 1.25,
        }));
        assert_eq!(h.payload_size as usize, SIZE_SENSOR_SCALAR);

        let (h, _) = roundtrip(SwathplusRecord::Agds(Agds {
            stamp: stamp(),
            hardness: 0.3,
            roughness: 0.7,
        }));
        assert_eq!(h.payload_size as usize, SIZE_AGDS);

        let (h, _) = roundtrip(SwathplusRecord::TxerOffset(TransducerOffset {
            stamp: stamp(),
            height: 1.0,
            forward: 2.0,
            starboard: 3.0,
            azimuth: 4.0,
            elevation: 5.0,
            pitch: 6.0,
            skew: 7.0,
            time: 0.01,
        }));
        assert_eq!(h.payload_size as usize, SIZE_TXER_OFFSET);
    }

    #[test]
    fn test_comment_padding() {
        // 5 chars -> 3 NULs; 8 chars -> 4 NULs
        let (h, bytes) = roundtrip(SwathplusRecord::Comment(TextRecord::new(1, 2, "hello")));
        assert_eq!(h.payload_size, 12 + 8);
        assert_eq!(&bytes[8 + 8..8 + 12], &8i32.to_le_bytes());
        assert_eq!(&bytes[bytes.len() - 3..], &[0, 0, 0]);

        let (h, _) = roundtrip(SwathplusRecord::Comment(TextRecord::new(1, 2, "abcdefgh")));
        assert_eq!(h.payload_size, 12 + 12);
    }

    #[test]
    fn test_projection_padded_like_comments() {
        let (h, bytes) = roundtrip(SwathplusRecord::Projection(TextRecord::new(
            0,
            0,
            "UTM30N",
        )));
        assert_eq!(h.payload_size, 12 + 8);
        assert_eq!(&bytes[8 + 12..], b"UTM30N\0\0");
    }

    #[test]
    fn test_stored_text_is_written_unchanged() {
        // unpadded, non-UTF-8 and with bytes after the NUL
        for stored in [&b"UTM30N"[..], &b"caf\xe9\0x"[..], &b"\0\0\0\0\0"[..]] {
            let mut payload = Vec::new();
            payload.extend_from_slice(&5i32.to_le_bytes());
            payload.extend_from_slice(&6i32.to_le_bytes());
            payload.extend_from_slice(&(stored.len() as i32).to_le_bytes());
            payload.extend_from_slice(stored);

            let record = decode(ID_PROJECTION, &payload).unwrap();
            let mut out = GrowableBuffer::new();
            encode(&record, &mut out).unwrap();
            assert_eq!(&out.as_slice()[8..], &payload[..]);
        }
    }

    #[test]
    fn test_negative_text_count() {
        let mut payload = vec![0u8; 12];
        payload[8..12].copy_from_slice(&(-1i32).to_le_bytes());
        let err = decode(ID_COMMENT, &payload).unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { .. }));
    }

    #[test]
    fn test_short_fixed_payload() {
        let err = decode(ID_PARSED_ATTITUDE, &[0u8; 10]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { .. }));
    }

    #[test]
    fn test_sample_count_guard() {
        let ping = SxiPing {
            time_d: 1,
            microsec: 0,
            channel: 0,
            pingnumber: 7,
            frequency: 234_000.0,
            samp_period: 1e-5,
            sos: 1500.0,
            txpulse: 10,
            data_options: 0,
            ping_state: 0,
            max_count: 0,
            reserve1: 0,
            samples: vec![
                SxiSample {
                    sampnum: 1,
                    angle: -20,
                    amplitude: 300,
                    quality: 1
                };
                4
            ],
        };
        let (header, bytes) = roundtrip(SwathplusRecord::SxiPing(ping));
        assert_eq!(
            header.payload_size as usize,
            SIZE_PARSED_PING_FIXED + 4 * SIZE_PARSED_SAMPLE
        );

        // drop the last sample but keep the count
        let payload = &bytes[8..bytes.len() - SIZE_PARSED_SAMPLE];
        let err = decode(ID_PARSED_PING, payload).unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { .. }));
    }

    #[test]
    fn test_unknown_type() {
        let err = decode(0x7777, &[]).unwrap_err();
        assert!(matches!(err, CodecError::Unsupported { .. }));
    }
}
