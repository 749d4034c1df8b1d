// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Generic record writer.
//!
//! The driver encodes each record into the writer's [`GrowableBuffer`]; the
//! framing patches the header and appends any trailer before the bytes are
//! emitted. With `write_size_fields` off, checksummed records are emitted
//! from their label on.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::core::registry::{DriverRegistry, FormatId};
use crate::encoding::framing::SIZE_FIELD_LEN;
use crate::io::config::SonarConfig;
use crate::io::metadata::Record;
use crate::io::traits::{FormatDriver, SonarRecord};
use crate::types::GrowableBuffer;
use crate::{CodecError, Result};

/// Writes typed records to a byte stream.
pub struct SonarWriter {
    stream: Box<dyn Write + Send>,
    driver: Option<Box<dyn FormatDriver>>,
    buffer: GrowableBuffer,
    /// Leading bytes of each framed record left out of the output
    skip: usize,
    destination: String,
    records_written: u64,
    bytes_written: u64,
}

impl SonarWriter {
    /// Create a file for `format`.
    pub fn create<P: AsRef<Path>>(path: P, format: FormatId) -> Result<Self> {
        WriterBuilder::new().path(path).format(format).build()
    }

    /// Write to any byte stream.
    pub fn from_stream<W: Write + Send + 'static>(stream: W, format: FormatId) -> Result<Self> {
        WriterBuilder::new().stream(stream).format(format).build()
    }

    /// Encode and emit one record.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let driver = self
            .driver
            .as_deref_mut()
            .ok_or_else(|| CodecError::unsupported("writing to a finished writer"))?;
        let header = driver.write_one_record(record, &mut self.buffer)?;
        let bytes = &self.buffer.as_slice()[self.skip..];
        self.stream
            .write_all(bytes)
            .map_err(|e| CodecError::io("SonarWriter::write_record", &e))?;
        trace!(
            record = record.name(),
            record_type = header.record_type,
            bytes = bytes.len(),
            "wrote record"
        );
        self.records_written += 1;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Flush buffered bytes to the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        self.stream
            .flush()
            .map_err(|e| CodecError::io("SonarWriter::flush", &e))
    }

    /// Records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// The format driver serving this stream.
    pub fn driver(&self) -> Option<&dyn FormatDriver> {
        self.driver.as_deref()
    }

    /// Flush, release the driver and return the number of records written.
    pub fn finish(mut self) -> Result<u64> {
        self.flush()?;
        self.release();
        Ok(self.records_written)
    }

    fn release(&mut self) {
        if let Some(driver) = self.driver.take() {
            debug!(
                destination = %self.destination,
                records = self.records_written,
                bytes = self.bytes_written,
                "closing sonar writer"
            );
            DriverRegistry::free_state(driver);
        }
    }
}

impl Drop for SonarWriter {
    fn drop(&mut self) {
        if self.driver.is_some() {
            // errors cannot be reported from drop; finish() surfaces them
            let _ = self.stream.flush();
            self.release();
        }
    }
}

enum Destination {
    Path(PathBuf),
    Stream(Box<dyn Write + Send>),
}

/// Fluent builder for [`SonarWriter`].
pub struct WriterBuilder {
    destination: Option<Destination>,
    config: SonarConfig,
    driver: Option<Box<dyn FormatDriver>>,
}

impl Default for WriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self {
            destination: None,
            config: SonarConfig::default(),
            driver: None,
        }
    }

    /// Write to a new file, truncating any existing one.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.destination = Some(Destination::Path(path.as_ref().to_path_buf()));
        self
    }

    /// Write to a byte stream.
    pub fn stream<W: Write + Send + 'static>(mut self, stream: W) -> Self {
        self.destination = Some(Destination::Stream(Box::new(stream)));
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SonarConfig) -> Self {
        self.config = config;
        self
    }

    /// Output format.
    pub fn format(mut self, format: FormatId) -> Self {
        self.config.format = Some(format);
        self
    }

    /// Emit or omit the size field of checksummed records.
    pub fn size_fields(mut self, write: bool) -> Self {
        self.config.write_size_fields = write;
        self
    }

    /// Use a caller-supplied driver instead of a registered one.
    pub fn driver(mut self, driver: Box<dyn FormatDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Open the destination and allocate the driver.
    pub fn build(self) -> Result<SonarWriter> {
        self.config.validate()?;
        let destination = self
            .destination
            .ok_or_else(|| CodecError::parse("WriterBuilder", "Path is not set"))?;

        let driver = match (self.driver, self.config.format) {
            (Some(driver), _) => driver,
            (None, Some(id)) => DriverRegistry::with_builtin().allocate_state(id)?,
            (None, None) => {
                return Err(CodecError::parse("WriterBuilder", "Format is not set"));
            }
        };

        let (stream, name): (Box<dyn Write + Send>, String) = match destination {
            Destination::Path(path) => {
                let file = File::create(&path)
                    .map_err(|e| CodecError::io(format!("create {}", path.display()), &e))?;
                let stream = BufWriter::with_capacity(self.config.io_buffer_size, file);
                (Box::new(stream), path.display().to_string())
            }
            Destination::Stream(stream) => (stream, "<stream>".to_string()),
        };

        let skip = if driver.framing().has_checksum() && !self.config.write_size_fields {
            SIZE_FIELD_LEN
        } else {
            0
        };
        debug!(
            destination = %name,
            format = driver.info().name,
            size_fields = skip == 0,
            "opening sonar writer"
        );
        Ok(SonarWriter {
            stream,
            driver: Some(driver),
            buffer: GrowableBuffer::with_capacity(self.config.read_buffer_capacity),
            skip,
            destination: name,
            records_written: 0,
            bytes_written: 0,
        })
    }
}
