// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Stream resynchronization.
//!
//! [`StreamResynchronizer::next_header`] reads a header window from the
//! stream and asks the framing and the driver whether it is a plausible
//! record start. If not, the window slides forward one byte at a time until
//! a valid header appears or the stream ends. A header declaring a record
//! longer than the format's limit is not a valid header. The number of
//! skipped bytes is returned to the caller and logged: the first skip on a
//! stream gets a guidance message, later ones a terse line.

use std::io::{self, Read};

use tracing::{trace, warn};

use crate::encoding::Framing;
use crate::io::metadata::RecordHeader;
use crate::io::traits::HeaderValidator;
use crate::{CodecError, Result};

/// Counters for skipped bytes on one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResyncStats {
    /// Number of times garbage was found between records
    pub events: u64,
    /// Total bytes skipped
    pub bytes_skipped: u64,
    /// Longest single run of skipped bytes
    pub largest_gap: u64,
}

/// Finds record headers in a forward-only byte stream.
#[derive(Debug)]
pub struct StreamResynchronizer {
    /// Framing used to parse the window
    framing: Framing,
    /// Current header window
    window: Vec<u8>,
    /// Stream offset of the next unread byte
    offset: u64,
    /// Skip counters
    stats: ResyncStats,
    /// Type of the last accepted header
    last_record_type: Option<u32>,
    /// Longest framed record a header may declare
    max_record_len: usize,
}

impl StreamResynchronizer {
    /// Create a resynchronizer for a stream using `framing`.
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            window: Vec::with_capacity(framing.header_len()),
            offset: 0,
            stats: ResyncStats::default(),
            last_record_type: None,
            max_record_len: usize::MAX,
        }
    }

    /// Reject headers that declare a framed record longer than `len` bytes.
    pub fn with_max_record_len(mut self, len: usize) -> Self {
        self.max_record_len = len;
        self
    }

    /// Stream offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Account for `n` bytes the caller consumed after the header.
    pub fn advance(&mut self, n: usize) {
        self.offset += n as u64;
    }

    /// Skip counters so far.
    pub fn stats(&self) -> ResyncStats {
        self.stats
    }

    /// Bytes of the most recently accepted header.
    pub fn header_bytes(&self) -> &[u8] {
        &self.window
    }

    /// Find the next valid header.
    ///
    /// Returns the header and the number of bytes skipped before it. If the
    /// stream ends first, returns [`CodecError::UnexpectedEof`] whose
    /// `skipped` counts every byte consumed since the last record boundary;
    /// zero means the stream ended cleanly between records.
    pub fn next_header<R, V>(
        &mut self,
        stream: &mut R,
        validator: &mut V,
    ) -> Result<(RecordHeader, usize)>
    where
        R: Read + ?Sized,
        V: HeaderValidator + ?Sized,
    {
        let len = self.framing.header_len();
        self.window.clear();
        self.window.resize(len, 0);

        let got = read_fully(stream, &mut self.window, "StreamResynchronizer::next_header")?;
        self.offset += got as u64;
        if got < len {
            if got > 0 {
                warn!(
                    offset = self.offset,
                    trailing = got,
                    "stream ended inside a record header"
                );
            }
            return Err(CodecError::unexpected_eof(
                "StreamResynchronizer::next_header",
                self.offset,
                got,
            ));
        }

        let start = self.offset - len as u64;
        let mut skipped = 0usize;
        let mut byte = [0u8; 1];
        loop {
            if let Some(header) = self.framing.parse_header(&self.window) {
                let record_len = self.framing.record_len(&header);
                if record_len > self.max_record_len {
                    trace!(
                        record_type = header.record_type,
                        record_len,
                        "header declares an oversized record"
                    );
                } else if validator.accepts_header(&header) {
                    if skipped > 0 {
                        self.report(skipped, start, header.record_type);
                    }
                    self.last_record_type = Some(header.record_type);
                    return Ok((header, skipped));
                }
            }

            self.window.copy_within(1.., 0);
            if read_fully(stream, &mut byte, "StreamResynchronizer::next_header")? == 0 {
                let consumed = skipped + len;
                warn!(
                    offset = self.offset,
                    skipped = consumed,
                    "stream ended while searching for a record header"
                );
                return Err(CodecError::unexpected_eof(
                    "StreamResynchronizer::next_header",
                    self.offset,
                    consumed,
                ));
            }
            self.window[len - 1] = byte[0];
            self.offset += 1;
            skipped += 1;
        }
    }

    fn report(&mut self, skipped: usize, offset: u64, next_type: u32) {
        let event = CodecError::Resyncable { skipped, offset };
        self.stats.events += 1;
        self.stats.bytes_skipped += skipped as u64;
        self.stats.largest_gap = self.stats.largest_gap.max(skipped as u64);

        if self.stats.events == 1 {
            warn!(
                skipped,
                offset,
                next_record = next_type,
                "{event}. Data were found between identified records: the file is probably \
                 corrupted upstream, or it contains a record type this reader does not \
                 recognise. Later gaps on this stream are reported briefly."
            );
        } else {
            match self.last_record_type {
                Some(prev) => warn!(
                    "skipped {skipped} bytes between records {prev:#x} and {next_type:#x}"
                ),
                None => warn!("skipped {skipped} bytes before record {next_type:#x}"),
            }
        }
    }
}

/// Read until `buf` is full or the stream ends; returns the bytes read.
pub(crate) fn read_fully<R: Read + ?Sized>(
    stream: &mut R,
    buf: &mut [u8],
    context: &str,
) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CodecError::io(context, &e)),
        }
    }
    Ok(filled)
}
