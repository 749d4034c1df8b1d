// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Checksummed streams recorded without size fields.
//!
//! Some recorders write `[STX][type][system_id] body [ETX][checksum]`
//! datagrams back to back with no leading size. [`SizeFieldRestorer`]
//! finds the end of each datagram by its trailer and re-inserts the size,
//! so the resynchronizer and drivers see an ordinary checksummed stream.
//! A datagram ends at the first `ETX` whose following checksum matches the
//! sum of the bytes read so far.

use std::collections::VecDeque;
use std::io::{self, Cursor, Read};

use tracing::{debug, trace};

use crate::encoding::field::Endianness;
use crate::encoding::framing::{
    Checksum16, Framing, CHECKSUMMED_OVERHEAD, ETX, HEADER_LEN, LABEL_LEN, SIZE_FIELD_LEN, STX,
};
use crate::io::resync::read_fully;
use crate::io::traits::FormatDriver;
use crate::Result;

/// Peek at the start of `stream` and restore size fields if they are missing.
///
/// `validator` is a fresh driver used only to judge candidate labels.
/// Returns the stream to read from and whether the source carried size
/// fields. Plain-framed streams are returned unchanged.
pub fn restore_size_fields(
    mut stream: Box<dyn Read + Send>,
    framing: Framing,
    mut validator: Box<dyn FormatDriver>,
    max_record_len: usize,
) -> Result<(Box<dyn Read + Send>, bool)> {
    if !framing.has_checksum() {
        return Ok((stream, true));
    }

    let mut head = [0u8; HEADER_LEN];
    let n = read_fully(&mut stream, &mut head, "restore_size_fields")?;
    let head = &head[..n];

    let sized = framing
        .parse_header(head)
        .is_some_and(|h| validator.accepts_header(&h));
    let bare = !sized
        && framing
            .parse_label(head)
            .is_some_and(|h| validator.accepts_header(&h));

    let chained: Box<dyn Read + Send> = Box::new(Cursor::new(head.to_vec()).chain(stream));
    if !bare {
        return Ok((chained, true));
    }
    debug!(
        format = validator.info().name,
        "stream has no size fields, restoring them"
    );
    let restorer = SizeFieldRestorer::new(chained, framing, validator, max_record_len);
    Ok((Box::new(restorer), false))
}

/// Re-inserts the size field in front of every datagram of a bare stream.
///
/// Bytes that do not start a complete, checksum-valid datagram pass
/// through unchanged, so garbage still reaches the resynchronizer.
pub struct SizeFieldRestorer<R> {
    inner: R,
    framing: Framing,
    validator: Box<dyn FormatDriver>,
    /// Longest datagram searched for, size field excluded
    max_datagram_len: usize,
    /// Bytes taken from `inner` and handed back after a failed match
    pending: VecDeque<u8>,
    out: Vec<u8>,
    out_pos: usize,
    restored: u64,
}

impl<R: Read> SizeFieldRestorer<R> {
    /// Wrap `inner`. `max_record_len` includes the restored size field.
    pub fn new(
        inner: R,
        framing: Framing,
        validator: Box<dyn FormatDriver>,
        max_record_len: usize,
    ) -> Self {
        Self {
            inner,
            framing,
            validator,
            max_datagram_len: max_record_len.saturating_sub(SIZE_FIELD_LEN),
            pending: VecDeque::new(),
            out: Vec::new(),
            out_pos: 0,
            restored: 0,
        }
    }

    /// Datagrams given a size field so far.
    pub fn restored(&self) -> u64 {
        self.restored
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pending.pop_front() {
            return Ok(Some(b));
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        self.out.clear();
        self.out_pos = 0;
        let Some(first) = self.next_byte()? else {
            return Ok(());
        };
        if first != STX {
            self.out.push(first);
            return Ok(());
        }

        let mut datagram = vec![STX];
        if self.complete_datagram(&mut datagram)? {
            let size = datagram.len() as u32;
            let size = match self.framing.endianness() {
                Endianness::Little => size.to_le_bytes(),
                Endianness::Big => size.to_be_bytes(),
            };
            self.out.extend_from_slice(&size);
            self.out.extend_from_slice(&datagram);
            self.restored += 1;
        } else {
            self.out.push(STX);
            for &b in datagram[1..].iter().rev() {
                self.pending.push_front(b);
            }
        }
        Ok(())
    }

    /// Extend `datagram` (holding STX) up to its checksum, if it has one.
    fn complete_datagram(&mut self, datagram: &mut Vec<u8>) -> io::Result<bool> {
        while datagram.len() < LABEL_LEN {
            match self.next_byte()? {
                Some(b) => datagram.push(b),
                None => return Ok(false),
            }
        }
        let Some(label) = self.framing.parse_label(datagram) else {
            return Ok(false);
        };
        if !self.validator.accepts_header(&label) {
            return Ok(false);
        }

        // sum of datagram[1..summed]
        let mut sum = Checksum16::new();
        let mut summed = 1;
        loop {
            let Some(b) = self.next_byte()? else {
                return Ok(false);
            };
            datagram.push(b);
            let len = datagram.len();
            if len > self.max_datagram_len {
                trace!(
                    record_type = label.record_type,
                    len,
                    "no datagram end within the size limit"
                );
                return Ok(false);
            }
            if len < CHECKSUMMED_OVERHEAD {
                continue;
            }
            let etx = len - 3;
            sum.update(&datagram[summed..etx]);
            summed = etx;
            if datagram[etx] != ETX {
                continue;
            }
            let trailer = [datagram[len - 2], datagram[len - 1]];
            let stored = match self.framing.endianness() {
                Endianness::Little => u16::from_le_bytes(trailer),
                Endianness::Big => u16::from_be_bytes(trailer),
            };
            if stored == sum.value() {
                return Ok(true);
            }
        }
    }
}

impl<R: Read> Read for SizeFieldRestorer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.out_pos == self.out.len() {
            self.fill()?;
        }
        let available = &self.out[self.out_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.out_pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{DriverRegistry, FormatId};
    use crate::io::formats::simrad::records::{DatagramStamp, Height};
    use crate::io::formats::simrad::{SimradDriver, SimradRecord, EM300, MAX_DATAGRAM_SIZE};
    use crate::io::metadata::Record;
    use crate::types::GrowableBuffer;

    fn em() -> Framing {
        Framing::Checksummed {
            endianness: Endianness::Big,
        }
    }

    fn validator() -> Box<dyn FormatDriver> {
        DriverRegistry::with_builtin()
            .allocate_state(FormatId::SimradEm)
            .unwrap()
    }

    fn heights(n: u16) -> Vec<u8> {
        let mut driver = SimradDriver::new();
        let mut out = GrowableBuffer::new();
        let mut bytes = Vec::new();
        for count in 1..=n {
            let record = Record::Simrad(SimradRecord::Height(Height {
                stamp: DatagramStamp {
                    sonar: EM300,
                    date: 20040601,
                    msec: 1000 * i32::from(count),
                    count,
                    serial: 117,
                },
                // 0x03 bytes inside the body must not end the datagram early
                height: 0x0303_0303,
                height_type: 3,
            }));
            driver.write_one_record(&record, &mut out).unwrap();
            bytes.extend_from_slice(out.as_slice());
        }
        bytes
    }

    /// Drop the size field in front of every datagram.
    fn strip(mut sized: &[u8]) -> Vec<u8> {
        let mut bare = Vec::new();
        while sized.len() >= SIZE_FIELD_LEN {
            let size = u32::from_be_bytes([sized[0], sized[1], sized[2], sized[3]]) as usize;
            bare.extend_from_slice(&sized[SIZE_FIELD_LEN..SIZE_FIELD_LEN + size]);
            sized = &sized[SIZE_FIELD_LEN + size..];
        }
        bare
    }

    fn restore(bytes: Vec<u8>) -> (Vec<u8>, bool) {
        let (mut stream, sized) =
            restore_size_fields(Box::new(Cursor::new(bytes)), em(), validator(), MAX_DATAGRAM_SIZE)
                .unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        (out, sized)
    }

    #[test]
    fn test_bare_stream_gets_size_fields() {
        let sized = heights(3);
        let (out, had_sizes) = restore(strip(&sized));
        assert!(!had_sizes);
        assert_eq!(out, sized);
    }

    #[test]
    fn test_sized_stream_passes_through() {
        let sized = heights(2);
        let (out, had_sizes) = restore(sized.clone());
        assert!(had_sizes);
        assert_eq!(out, sized);
    }

    #[test]
    fn test_garbage_between_datagrams_passes_through() {
        let sized = heights(2);
        let half = SIZE_FIELD_LEN + sized[3] as usize;
        let bare_first = strip(&sized[..half]);
        let bare_second = strip(&sized[half..]);

        let mut bare = bare_first.clone();
        // a lone STX followed by a label no driver accepts
        bare.extend_from_slice(&[0x02, 0xee, 0x01, 0x02, 0x99]);
        bare.extend_from_slice(&bare_second);

        let (out, _) = restore(bare);
        let mut expected = sized[..half].to_vec();
        expected.extend_from_slice(&[0x02, 0xee, 0x01, 0x02, 0x99]);
        expected.extend_from_slice(&sized[half..]);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_truncated_datagram_is_returned_raw() {
        let bare = strip(&heights(1));
        let cut = bare[..bare.len() - 1].to_vec();
        let (out, had_sizes) = restore(cut.clone());
        assert!(!had_sizes);
        assert_eq!(out, cut);
    }

    #[test]
    fn test_limit_stops_the_search() {
        let bare = strip(&heights(1));
        let mut restorer =
            SizeFieldRestorer::new(Cursor::new(bare.clone()), em(), validator(), 12);
        let mut out = Vec::new();
        restorer.read_to_end(&mut out).unwrap();
        assert_eq!(out, bare);
        assert_eq!(restorer.restored(), 0);
    }

    #[test]
    fn test_plain_framing_is_untouched() {
        let plain = Framing::Plain {
            endianness: Endianness::Little,
        };
        let data = vec![0x02, 0x44, 0x00, 0x01];
        let (mut stream, sized) =
            restore_size_fields(Box::new(Cursor::new(data.clone())), plain, validator(), 64)
                .unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert!(sized);
        assert_eq!(out, data);
    }
}
