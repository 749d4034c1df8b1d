// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Generic record reader.
//!
//! [`SonarReader`] drives one stream through the resynchronizer and a
//! `Box<dyn FormatDriver>`. It never branches on format: the driver decides
//! which headers are plausible and how a framed record is decoded.
//!
//! # Example
//!
//! ```rust,no_run
//! use sonarcodec::io::SonarReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = SonarReader::open("line_0001.sxp")?;
//! while let Some(record) = reader.next_record()? {
//!     println!("{record}");
//! }
//! let stats = reader.finish();
//! println!("{} records, {} rejected", stats.records, stats.rejected);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::registry::{DriverRegistry, FormatId};
use crate::core::Severity;
use crate::encoding::framing::HEADER_LEN;
use crate::io::config::SonarConfig;
use crate::io::detection::{detect_format, detect_from_header};
use crate::io::metadata::{DataKind, Record};
use crate::io::resync::{read_fully, ResyncStats, StreamResynchronizer};
use crate::io::size_fields::restore_size_fields;
use crate::io::traits::{FormatDriver, SonarRecord};
use crate::types::GrowableBuffer;
use crate::{CodecError, Result};

/// Counters collected while reading one stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReadStats {
    /// Records decoded and returned
    pub records: u64,
    /// Records found but rejected
    pub rejected: u64,
    /// Returned records by kind
    pub by_kind: BTreeMap<DataKind, u64>,
    /// Returned records by record name
    pub by_name: BTreeMap<&'static str, u64>,
    /// Garbage skipped between records
    pub resync: ResyncStats,
    /// Earliest record time (seconds since the epoch)
    pub first_time: Option<f64>,
    /// Latest record time (seconds since the epoch)
    pub last_time: Option<f64>,
    /// Bytes consumed from the stream
    pub bytes_read: u64,
    /// Largest record staged in the read buffer
    pub largest_record: usize,
}

impl ReadStats {
    fn count(&mut self, record: &Record) {
        self.records += 1;
        *self.by_kind.entry(record.kind()).or_insert(0) += 1;
        *self.by_name.entry(record.name()).or_insert(0) += 1;
        if let Some(t) = record.time_seconds().filter(|t| t.is_finite()) {
            self.first_time = Some(self.first_time.map_or(t, |first| first.min(t)));
            self.last_time = Some(self.last_time.map_or(t, |last| last.max(t)));
        }
    }

    /// `(first, last)` record times, when any record carried one.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        Some((self.first_time?, self.last_time?))
    }
}

/// Reads typed records from a sonar data stream.
pub struct SonarReader {
    stream: Box<dyn Read + Send>,
    /// `None` only while the reader is being torn down
    driver: Option<Box<dyn FormatDriver>>,
    resync: StreamResynchronizer,
    buffer: GrowableBuffer,
    config: SonarConfig,
    stats: ReadStats,
    source: String,
    size_fields: bool,
    last_skipped: usize,
    done: bool,
}

impl SonarReader {
    /// Open a file, detecting its format.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        ReaderBuilder::new().path(path).build()
    }

    /// Read from any byte stream with a known format.
    pub fn from_stream<R: Read + Send + 'static>(stream: R, format: FormatId) -> Result<Self> {
        ReaderBuilder::new().stream(stream).format(format).build()
    }

    fn new(
        stream: Box<dyn Read + Send>,
        driver: Box<dyn FormatDriver>,
        config: SonarConfig,
        source: String,
        size_fields: bool,
    ) -> Self {
        debug!(
            source = %source,
            format = driver.info().name,
            size_fields,
            "opening sonar reader"
        );
        let resync = StreamResynchronizer::new(driver.framing())
            .with_max_record_len(driver.info().max_record_size);
        Self {
            stream,
            resync,
            buffer: GrowableBuffer::with_capacity(config.read_buffer_capacity),
            driver: Some(driver),
            config,
            stats: ReadStats::default(),
            source,
            size_fields,
            last_skipped: 0,
            done: false,
        }
    }

    /// Decode the next record.
    ///
    /// Returns `Ok(None)` at the end of the stream or once `max_records`
    /// records were returned. Records that fail to decode are logged,
    /// counted and skipped unless `stop_on_record_error` is set; fatal
    /// errors end the stream.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if self.done {
                return Ok(None);
            }
            if let Some(max) = self.config.max_records {
                if self.stats.records >= max {
                    debug!(max, "record limit reached");
                    self.done = true;
                    return Ok(None);
                }
            }

            match self.read_one() {
                Ok(record) => {
                    self.stats.count(&record);
                    return Ok(Some(record));
                }
                Err(e) if e.is_clean_eof() => {
                    self.done = true;
                    return Ok(None);
                }
                Err(e)
                    if e.severity() == Severity::PerRecord && !self.config.stop_on_record_error =>
                {
                    self.stats.rejected += 1;
                    warn!(
                        source = %self.source,
                        offset = self.resync.offset(),
                        error = %e,
                        "rejected record"
                    );
                }
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            }
        }
    }

    fn read_one(&mut self) -> Result<Record> {
        let driver = self
            .driver
            .as_deref_mut()
            .ok_or_else(|| CodecError::unsupported("reading from a finished reader"))?;

        let found = self.resync.next_header(&mut self.stream, &mut *driver);
        self.stats.resync = self.resync.stats();
        self.stats.bytes_read = self.resync.offset();
        let (header, skipped) = found?;
        self.last_skipped = skipped;

        let framing = driver.framing();
        let remaining = framing.remaining_len(&header);
        self.buffer.clear();
        self.buffer.extend_from_slice(self.resync.header_bytes())?;
        self.buffer.extend_zeros(remaining)?;
        let got = read_fully(
            &mut self.stream,
            &mut self.buffer.as_mut_slice()[HEADER_LEN..],
            "SonarReader::next_record",
        )?;
        self.resync.advance(got);
        self.stats.bytes_read = self.resync.offset();
        self.stats.largest_record = self.stats.largest_record.max(self.buffer.len());

        if got < remaining {
            warn!(
                record_type = header.record_type,
                declared = remaining,
                got,
                "stream ended inside a record"
            );
            return Err(CodecError::unexpected_eof(
                "SonarReader::next_record",
                self.resync.offset(),
                HEADER_LEN + got,
            ));
        }

        driver.read_one_record(&header, self.buffer.as_slice())
    }

    /// Counters so far.
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    /// Bytes skipped before the most recently found record header.
    pub fn last_skipped(&self) -> usize {
        self.last_skipped
    }

    /// The format driver serving this stream.
    pub fn driver(&self) -> Option<&dyn FormatDriver> {
        self.driver.as_deref()
    }

    /// Downcast the driver for format-specific state.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.driver.as_ref()?.as_any().downcast_ref::<T>()
    }

    /// Downcast the driver mutably.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.driver.as_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Record staging buffer, for capacity and high-water reporting.
    pub fn buffer(&self) -> &GrowableBuffer {
        &self.buffer
    }

    /// Name of the file or stream being read.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// False when the source omitted the size field of checksummed records.
    ///
    /// Offsets and byte counts then include the restored size fields.
    pub fn has_size_fields(&self) -> bool {
        self.size_fields
    }

    /// Release the driver and return the final counters.
    pub fn finish(mut self) -> ReadStats {
        self.release();
        std::mem::take(&mut self.stats)
    }

    fn release(&mut self) {
        if let Some(driver) = self.driver.take() {
            debug!(
                source = %self.source,
                records = self.stats.records,
                rejected = self.stats.rejected,
                skipped = self.stats.resync.bytes_skipped,
                "closing sonar reader"
            );
            DriverRegistry::free_state(driver);
        }
    }
}

impl Drop for SonarReader {
    fn drop(&mut self) {
        self.release();
    }
}

impl Iterator for SonarReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

enum Source {
    Path(PathBuf),
    Stream(Box<dyn Read + Send>),
}

/// Fluent builder for [`SonarReader`].
///
/// ```rust,no_run
/// use sonarcodec::io::ReaderBuilder;
/// use sonarcodec::FormatId;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let reader = ReaderBuilder::new()
///     .path("0001_20020315.all")
///     .format(FormatId::SimradEm)
///     .max_records(100)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ReaderBuilder {
    source: Option<Source>,
    config: SonarConfig,
    driver: Option<Box<dyn FormatDriver>>,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self {
            source: None,
            config: SonarConfig::default(),
            driver: None,
        }
    }

    /// Read from a file.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(Source::Path(path.as_ref().to_path_buf()));
        self
    }

    /// Read from a byte stream.
    pub fn stream<R: Read + Send + 'static>(mut self, stream: R) -> Self {
        self.source = Some(Source::Stream(Box::new(stream)));
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SonarConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this format instead of detecting one.
    pub fn format(mut self, format: FormatId) -> Self {
        self.config.format = Some(format);
        self
    }

    /// Use a caller-supplied driver instead of a registered one.
    pub fn driver(mut self, driver: Box<dyn FormatDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Fail on the first rejected record.
    pub fn stop_on_record_error(mut self, stop: bool) -> Self {
        self.config.stop_on_record_error = stop;
        self
    }

    /// Stop after `n` records.
    pub fn max_records(mut self, n: u64) -> Self {
        self.config.max_records = Some(n);
        self
    }

    /// Open the source and allocate the driver.
    pub fn build(self) -> Result<SonarReader> {
        self.config.validate()?;
        let source = self
            .source
            .ok_or_else(|| CodecError::parse("ReaderBuilder", "Path is not set"))?;
        let registry = DriverRegistry::with_builtin();

        let (stream, format, name): (Box<dyn Read + Send>, Option<FormatId>, String) = match source
        {
            Source::Path(path) => {
                if !path.exists() {
                    return Err(CodecError::parse(
                        "ReaderBuilder",
                        format!("File not found: {}", path.display()),
                    ));
                }
                let format = match (self.config.format, &self.driver) {
                    (Some(id), _) => Some(id),
                    (None, None) => Some(detect_format(&path)?),
                    (None, Some(_)) => None,
                };
                let file = File::open(&path)
                    .map_err(|e| CodecError::io(format!("open {}", path.display()), &e))?;
                let stream = BufReader::with_capacity(self.config.io_buffer_size, file);
                (Box::new(stream), format, path.display().to_string())
            }
            Source::Stream(stream) => {
                let mut stream = BufReader::with_capacity(self.config.io_buffer_size, stream);
                match (self.config.format, &self.driver) {
                    (None, None) => {
                        // probe the first header, then put it back in front of the stream
                        let mut head = [0u8; HEADER_LEN];
                        let n = read_fully(&mut stream, &mut head, "ReaderBuilder::build")?;
                        let format = detect_from_header(&head[..n], &registry).ok_or_else(|| {
                            CodecError::unsupported("cannot determine the format of the stream")
                        })?;
                        let chained = Cursor::new(head[..n].to_vec()).chain(stream);
                        (Box::new(chained), Some(format), "<stream>".to_string())
                    }
                    (format, _) => (Box::new(stream), format, "<stream>".to_string()),
                }
            }
        };

        let driver = match (self.driver, format) {
            (Some(driver), _) => driver,
            (None, Some(id)) => registry.allocate_state(id)?,
            (None, None) => {
                return Err(CodecError::unsupported("no format and no driver given"));
            }
        };

        let (stream, size_fields) = match registry.allocate_state(driver.info().id) {
            Ok(validator) => restore_size_fields(
                stream,
                driver.framing(),
                validator,
                driver.info().max_record_size,
            )?,
            Err(_) => (stream, true),
        };

        Ok(SonarReader::new(stream, driver, self.config, name, size_fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::formats::simrad::records::{DatagramStamp, Height};
    use crate::io::formats::simrad::{SimradDriver, SimradRecord, EM300};

    fn height(count: u16, value: i32) -> Record {
        Record::Simrad(SimradRecord::Height(Height {
            stamp: DatagramStamp {
                sonar: EM300,
                date: 20040601,
                msec: 1000 * i32::from(count),
                count,
                serial: 117,
            },
            height: value,
            height_type: 0,
        }))
    }

    fn encode(records: &[Record]) -> Vec<u8> {
        let mut driver = SimradDriver::new();
        let mut out = GrowableBuffer::new();
        let mut bytes = Vec::new();
        for record in records {
            driver.write_one_record(record, &mut out).unwrap();
            bytes.extend_from_slice(out.as_slice());
        }
        bytes
    }

    #[test]
    fn test_reads_records_and_stats() {
        let records = vec![height(1, 10), height(2, 20)];
        let data = encode(&records);
        let len = data.len() as u64;

        let mut reader = SonarReader::from_stream(Cursor::new(data), FormatId::SimradEm).unwrap();
        assert_eq!(reader.next_record().unwrap(), Some(records[0].clone()));
        assert_eq!(reader.next_record().unwrap(), Some(records[1].clone()));
        assert_eq!(reader.next_record().unwrap(), None);
        assert_eq!(reader.next_record().unwrap(), None);

        let stats = reader.finish();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.rejected, 0);
        assert_eq!(stats.bytes_read, len);
        assert_eq!(stats.by_kind.get(&DataKind::Height), Some(&2));
        let (first, last) = stats.time_span().unwrap();
        assert!(last - first > 0.999 && last - first < 1.001);
    }

    #[test]
    fn test_skips_rejected_record() {
        let mut data = encode(&[height(1, 10)]);
        let second = encode(&[height(2, 20)]);
        // corrupt the body of the first record
        data[10] ^= 0xff;
        data.extend_from_slice(&second);

        let mut reader = SonarReader::from_stream(Cursor::new(data), FormatId::SimradEm).unwrap();
        assert_eq!(reader.next_record().unwrap(), Some(height(2, 20)));
        assert_eq!(reader.stats().rejected, 1);
    }

    #[test]
    fn test_stop_on_record_error() {
        let mut data = encode(&[height(1, 10)]);
        data[10] ^= 0xff;
        let mut reader = ReaderBuilder::new()
            .stream(Cursor::new(data))
            .format(FormatId::SimradEm)
            .stop_on_record_error(true)
            .build()
            .unwrap();
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, CodecError::ChecksumMismatch { .. }));
        assert_eq!(reader.next_record().unwrap(), None);
    }

    #[test]
    fn test_truncated_record_is_fatal() {
        let mut data = encode(&[height(1, 10)]);
        data.truncate(data.len() - 4);
        let mut reader = SonarReader::from_stream(Cursor::new(data), FormatId::SimradEm).unwrap();
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEof { .. }));
        assert!(!err.is_clean_eof());
    }

    #[test]
    fn test_max_records_and_iterator() {
        let data = encode(&[height(1, 1), height(2, 2), height(3, 3)]);
        let reader = ReaderBuilder::new()
            .stream(Cursor::new(data))
            .max_records(2)
            .build()
            .unwrap();
        let records: Vec<Record> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(records, vec![height(1, 1), height(2, 2)]);
    }

    #[test]
    fn test_detects_stream_format() {
        let data = encode(&[height(1, 10)]);
        let mut reader = ReaderBuilder::new().stream(Cursor::new(data)).build().unwrap();
        assert!(reader.downcast_ref::<SimradDriver>().is_some());
        assert_eq!(reader.next_record().unwrap(), Some(height(1, 10)));
    }

    #[test]
    fn test_builder_errors() {
        let err = ReaderBuilder::new().build().err().unwrap();
        assert!(err.to_string().contains("Path is not set"));

        let err = ReaderBuilder::new()
            .path("/nonexistent/line.sxp")
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("File not found"));

        let err = ReaderBuilder::new()
            .stream(Cursor::new(vec![0u8; 4]))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, CodecError::Unsupported { .. }));
    }
}
