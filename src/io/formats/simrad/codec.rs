// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field-by-field Simrad EM datagram codec.
//!
//! Bodies are the bytes between the 8-byte header window and ETX; the
//! checksummed framing strips and verifies everything else.

use crate::encoding::{Endianness, FieldReader, FieldWriter, Framing};
use crate::io::metadata::RecordHeader;
use crate::io::traits::SonarRecord;
use crate::types::GrowableBuffer;
use crate::{CodecError, Result};

use super::records::{
    date_from_yyyymmdd, Attitude, AttitudeSample, Bathymetry, Beam, Clock, DatagramStamp,
    Heading, HeadingSample, Height, Position, SimradRecord, Tide,
};
use super::*;

/// Byte order of every EM datagram field.
pub const ENDIANNESS: Endianness = Endianness::Big;

/// `[size][STX][type][sonar] ... [ETX][checksum]`.
pub const FRAMING: Framing = Framing::Checksummed {
    endianness: ENDIANNESS,
};

/// Decode the body of a datagram described by `header`.
pub fn decode(header: &RecordHeader, body: &[u8]) -> Result<SimradRecord> {
    let datagram_type = u8::try_from(header.record_type).map_err(|_| {
        CodecError::unsupported(format!("EM datagram type {:#x}", header.record_type))
    })?;
    let sonar = header.system_id;
    let r = FieldReader::new(body, ENDIANNESS);

    let record = match datagram_type {
        ID_CLOCK => {
            let mut r = sized(r, "CLOCK", SIZE_CLOCK_BODY)?;
            SimradRecord::Clock(Clock {
                stamp: read_stamp(&mut r, sonar)?,
                origin_date: r.read_i32()?,
                origin_msec: r.read_i32()?,
                pps: r.read_u8()?,
            })
        }
        ID_TIDE => {
            let mut r = sized(r, "TIDE", SIZE_TIDE_BODY)?;
            let tide = Tide {
                stamp: read_stamp(&mut r, sonar)?,
                origin_date: r.read_i32()?,
                origin_msec: r.read_i32()?,
                tide: r.read_i16()?,
            };
            r.skip_padding(1)?;
            SimradRecord::Tide(tide)
        }
        ID_HEIGHT => {
            let mut r = sized(r, "HEIGHT", SIZE_HEIGHT_BODY)?;
            SimradRecord::Height(Height {
                stamp: read_stamp(&mut r, sonar)?,
                height: r.read_i32()?,
                height_type: r.read_u8()?,
            })
        }
        ID_HEADING => SimradRecord::Heading(decode_heading(r, sonar)?),
        ID_ATTITUDE => SimradRecord::Attitude(decode_attitude(r, sonar)?),
        ID_POS => SimradRecord::Position(decode_position(r, sonar)?),
        ID_BATH => SimradRecord::Bathymetry(decode_bathymetry(r, sonar)?),
        other => SimradRecord::Opaque {
            datagram_type: other,
            sonar,
            body: body.to_vec(),
        },
    };

    if let Some(stamp) = record.stamp() {
        check_date(stamp, record.name())?;
    }
    Ok(record)
}

/// Encode `record` into `out` with EM framing.
///
/// `out` is cleared first. Returns the header of the encoded datagram.
pub fn encode(record: &SimradRecord, out: &mut GrowableBuffer) -> Result<RecordHeader> {
    FRAMING.begin(out, record.record_type(), record.sonar())?;
    {
        let mut w = FieldWriter::new(out, ENDIANNESS);
        match record {
            SimradRecord::Clock(c) => {
                write_stamp(&mut w, &c.stamp)?;
                w.write_i32(c.origin_date)?;
                w.write_i32(c.origin_msec)?;
                w.write_u8(c.pps)?;
            }
            SimradRecord::Tide(t) => {
                write_stamp(&mut w, &t.stamp)?;
                w.write_i32(t.origin_date)?;
                w.write_i32(t.origin_msec)?;
                w.write_i16(t.tide)?;
                w.pad(1)?;
            }
            SimradRecord::Height(h) => {
                write_stamp(&mut w, &h.stamp)?;
                w.write_i32(h.height)?;
                w.write_u8(h.height_type)?;
            }
            SimradRecord::Heading(h) => {
                write_stamp(&mut w, &h.stamp)?;
                w.write_u16(sample_count(h.samples.len(), "HEADING")?)?;
                for s in &h.samples {
                    w.write_u16(s.time)?;
                    w.write_u16(s.heading)?;
                }
                w.write_u8(h.status)?;
            }
            SimradRecord::Attitude(a) => {
                write_stamp(&mut w, &a.stamp)?;
                w.write_u16(sample_count(a.samples.len(), "ATTITUDE")?)?;
                for s in &a.samples {
                    w.write_u16(s.time)?;
                    w.write_u16(s.sensor_status)?;
                    w.write_i16(s.roll)?;
                    w.write_i16(s.pitch)?;
                    w.write_i16(s.heave)?;
                    w.write_u16(s.heading)?;
                }
                w.write_u8(a.heading_status)?;
            }
            SimradRecord::Position(p) => encode_position(&mut w, p)?,
            SimradRecord::Bathymetry(b) => encode_bathymetry(&mut w, b)?,
            SimradRecord::Opaque { body, .. } => w.write_bytes(body)?,
        }
    }
    FRAMING.finish(out)
}

fn sized<'a>(r: FieldReader<'a>, context: &'static str, size: usize) -> Result<FieldReader<'a>> {
    if r.remaining() < size {
        return Err(CodecError::malformed(
            context,
            format!("body of {} bytes, layout needs {size}", r.remaining()),
        ));
    }
    Ok(r.with_context(context))
}

fn read_stamp(r: &mut FieldReader<'_>, sonar: u16) -> Result<DatagramStamp> {
    Ok(DatagramStamp {
        sonar,
        date: r.read_i32()?,
        msec: r.read_i32()?,
        count: r.read_u16()?,
        serial: r.read_u16()?,
    })
}

fn write_stamp(w: &mut FieldWriter<'_>, stamp: &DatagramStamp) -> Result<()> {
    w.write_i32(stamp.date)?;
    w.write_i32(stamp.msec)?;
    w.write_u16(stamp.count)?;
    w.write_u16(stamp.serial)
}

/// Reject dates that are not calendar dates or predate the EM2 family.
fn check_date(stamp: &DatagramStamp, context: &str) -> Result<()> {
    if date_from_yyyymmdd(stamp.date).is_none() || stamp.date < MIN_DATE {
        return Err(CodecError::unintelligible(
            context,
            format!("implausible date {}", stamp.date),
        ));
    }
    Ok(())
}

fn sample_count(len: usize, context: &str) -> Result<u16> {
    u16::try_from(len)
        .map_err(|_| CodecError::unsupported(format!("{len} samples in a {context} datagram")))
}

fn decode_heading(r: FieldReader<'_>, sonar: u16) -> Result<Heading> {
    let mut r = sized(r, "HEADING", SIZE_SAMPLED_HEADER)?;
    let stamp = read_stamp(&mut r, sonar)?;
    let ndata = usize::from(r.read_u16()?);
    r.ensure_items(ndata, SIZE_HEADING_SAMPLE)?;
    let mut samples = Vec::with_capacity(ndata);
    for _ in 0..ndata {
        samples.push(HeadingSample {
            time: r.read_u16()?,
            heading: r.read_u16()?,
        });
    }
    Ok(Heading {
        stamp,
        samples,
        status: r.read_u8()?,
    })
}

fn decode_attitude(r: FieldReader<'_>, sonar: u16) -> Result<Attitude> {
    let mut r = sized(r, "ATTITUDE", SIZE_SAMPLED_HEADER)?;
    let stamp = read_stamp(&mut r, sonar)?;
    let ndata = usize::from(r.read_u16()?);
    r.ensure_items(ndata, SIZE_ATTITUDE_SAMPLE)?;
    let mut samples = Vec::with_capacity(ndata);
    for _ in 0..ndata {
        samples.push(AttitudeSample {
            time: r.read_u16()?,
            sensor_status: r.read_u16()?,
            roll: r.read_i16()?,
            pitch: r.read_i16()?,
            heave: r.read_i16()?,
            heading: r.read_u16()?,
        });
    }
    Ok(Attitude {
        stamp,
        samples,
        heading_status: r.read_u8()?,
    })
}

fn decode_position(r: FieldReader<'_>, sonar: u16) -> Result<Position> {
    let mut r = sized(r, "POS", SIZE_POS_HEADER)?;
    let stamp = read_stamp(&mut r, sonar)?;
    let latitude = r.read_i32()?;
    let longitude = r.read_i32()?;
    let quality = r.read_u16()?;
    let speed = r.read_u16()?;
    let course = r.read_u16()?;
    let heading = r.read_u16()?;
    let system = r.read_u8()?;
    let input_size = usize::from(r.read_u8()?);
    r.ensure_items(input_size, 1)?;
    let input = r.read_bytes(input_size)?.to_vec();
    // any remaining byte is alignment padding

    Ok(Position {
        stamp,
        latitude,
        longitude,
        quality,
        speed,
        course,
        heading,
        system,
        input,
    })
}

/// The body is padded so the size field comes out even.
fn encode_position(w: &mut FieldWriter<'_>, p: &Position) -> Result<()> {
    let input_size = u8::try_from(p.input.len()).map_err(|_| {
        CodecError::unsupported(format!("position telegram of {} bytes", p.input.len()))
    })?;
    write_stamp(w, &p.stamp)?;
    w.write_i32(p.latitude)?;
    w.write_i32(p.longitude)?;
    w.write_u16(p.quality)?;
    w.write_u16(p.speed)?;
    w.write_u16(p.course)?;
    w.write_u16(p.heading)?;
    w.write_u8(p.system)?;
    w.write_u8(input_size)?;
    w.write_bytes(&p.input)?;
    if p.input.len() % 2 == 0 {
        w.pad(1)?;
    }
    Ok(())
}

fn decode_bathymetry(r: FieldReader<'_>, sonar: u16) -> Result<Bathymetry> {
    const CONTEXT: &str = "BATH";
    let mut r = sized(r, CONTEXT, SIZE_BATH_HEADER)?;
    let stamp = read_stamp(&mut r, sonar)?;
    let heading = r.read_u16()?;
    let ssv = r.read_u16()?;
    let xducer_depth = r.read_u16()?;
    let nbeams_max = r.read_u8()?;
    let nbeams = usize::from(r.read_u8()?);
    let depth_res = r.read_u8()?;
    let distance_res = r.read_u8()?;
    let sample_rate = r.read_u16()?;

    if nbeams > usize::from(nbeams_max)
        || nbeams > MAX_BEAMS
        || usize::from(nbeams_max) > MAX_BEAMS
    {
        return Err(CodecError::unintelligible(
            CONTEXT,
            format!("{nbeams} beams with a maximum of {nbeams_max}"),
        ));
    }

    r.ensure_items(nbeams, SIZE_BATH_BEAM)?;
    let unsigned = unsigned_depth(sonar);
    let mut beams: Vec<Beam> = Vec::with_capacity(nbeams);
    for _ in 0..nbeams {
        let depth = if unsigned {
            i32::from(r.read_u16()?)
        } else {
            i32::from(r.read_i16()?)
        };
        beams.push(Beam {
            depth,
            across: r.read_i16()?,
            along: r.read_i16()?,
            depression: r.read_i16()?,
            azimuth: r.read_u16()?,
            range: r.read_u16()?,
            quality: r.read_u8()?,
            window: r.read_u8()?,
            amplitude: r.read_i8()?,
            beam_num: r.read_u8()?,
        });
    }
    let offset_multiplier = r.read_i8()?;

    for (i, beam) in beams.iter().enumerate() {
        let descending = i > 0 && beam.beam_num < beams[i - 1].beam_num;
        if descending || beam.beam_num > nbeams_max {
            return Err(CodecError::unintelligible(
                CONTEXT,
                format!(
                    "beam {i} numbered {} (previous {}, maximum {nbeams_max})",
                    beam.beam_num,
                    if i > 0 { beams[i - 1].beam_num } else { 0 }
                ),
            ));
        }
    }

    Ok(Bathymetry {
        stamp,
        heading,
        ssv,
        xducer_depth,
        nbeams_max,
        depth_res,
        distance_res,
        sample_rate,
        beams,
        offset_multiplier,
    })
}

fn encode_bathymetry(w: &mut FieldWriter<'_>, b: &Bathymetry) -> Result<()> {
    let nbeams = u8::try_from(b.beams.len())
        .ok()
        .filter(|n| usize::from(*n) <= MAX_BEAMS)
        .ok_or_else(|| CodecError::unsupported(format!("{} beams in a ping", b.beams.len())))?;
    let unsigned = b.unsigned_depth();

    write_stamp(w, &b.stamp)?;
    w.write_u16(b.heading)?;
    w.write_u16(b.ssv)?;
    w.write_u16(b.xducer_depth)?;
    w.write_u8(b.nbeams_max)?;
    w.write_u8(nbeams)?;
    w.write_u8(b.depth_res)?;
    w.write_u8(b.distance_res)?;
    w.write_u16(b.sample_rate)?;
    for beam in &b.beams {
        if unsigned {
            let depth = u16::try_from(beam.depth).map_err(|_| {
                CodecError::unsupported(format!("unsigned depth {}", beam.depth))
            })?;
            w.write_u16(depth)?;
        } else {
            let depth = i16::try_from(beam.depth).map_err(|_| {
                CodecError::unsupported(format!("signed depth {}", beam.depth))
            })?;
            w.write_i16(depth)?;
        }
        w.write_i16(beam.across)?;
        w.write_i16(beam.along)?;
        w.write_i16(beam.depression)?;
        w.write_u16(beam.azimuth)?;
        w.write_u16(beam.range)?;
        w.write_u8(beam.quality)?;
        w.write_u8(beam.window)?;
        w.write_i8(beam.amplitude)?;
        w.write_u8(beam.beam_num)?;
    }
    w.write_i8(b.offset_multiplier)
}
