// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for sonarcodec.
//!
//! Errors fall into three tiers:
//! - **Resyncable**: garbage between records, recovered by sliding the header window
//! - **Per-record**: a single record is rejected and the stream continues
//!   (malformed lengths, checksum mismatches, unintelligible data)
//! - **Fatal**: the read/write loop stops (end of stream, I/O failure, out of memory)

use std::fmt;
use std::io;

/// How the read loop should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Recovered automatically by resynchronization; reported as a count.
    Resyncable,
    /// The current record is discarded; reading continues with the next header.
    PerRecord,
    /// Terminates the read or write loop.
    Fatal,
}

/// Errors that can occur while reading or writing sonar record streams.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// Bytes between records did not form a valid header
    Resyncable {
        /// Number of bytes skipped
        skipped: usize,
        /// Stream offset where skipping started
        offset: u64,
    },

    /// Internally inconsistent lengths or counts
    MalformedRecord {
        /// Record or field being decoded
        context: String,
        /// Error message
        message: String,
    },

    /// Buffer too short for requested read
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Trailer checksum does not match the record bytes
    ChecksumMismatch {
        /// Record type tag
        record_type: u32,
        /// Checksum stored in the trailer
        expected: u16,
        /// Checksum computed over the record bytes
        computed: u16,
    },

    /// Structurally valid record with semantically impossible content
    UnintelligibleData {
        /// Record being validated
        context: String,
        /// Error message
        message: String,
    },

    /// Stream ended before a complete header or record was read
    UnexpectedEof {
        /// What was being read
        context: String,
        /// Stream offset at which the stream ended
        offset: u64,
        /// Bytes consumed since the last record boundary
        skipped: usize,
    },

    /// Underlying read or write failed
    IoFailure {
        /// Operation that failed
        context: String,
        /// I/O error kind
        kind: io::ErrorKind,
        /// Error message
        message: String,
    },

    /// Buffer allocation failed
    OutOfMemory {
        /// Requested capacity in bytes
        requested: usize,
    },

    /// Unsupported record kind, format or feature
    Unsupported {
        /// What is not supported
        feature: String,
    },

    /// Parse error in configuration or command input
    ParseError {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },
}

impl CodecError {
    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a malformed record error.
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::MalformedRecord {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an unintelligible data error.
    pub fn unintelligible(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::UnintelligibleData {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        CodecError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(record_type: u32, expected: u16, computed: u16) -> Self {
        CodecError::ChecksumMismatch {
            record_type,
            expected,
            computed,
        }
    }

    /// Create an unexpected end-of-stream error.
    pub fn unexpected_eof(context: impl Into<String>, offset: u64, skipped: usize) -> Self {
        CodecError::UnexpectedEof {
            context: context.into(),
            offset,
            skipped,
        }
    }

    /// Wrap an I/O error with the operation that produced it.
    pub fn io(context: impl Into<String>, err: &io::Error) -> Self {
        CodecError::IoFailure {
            context: context.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Create an out-of-memory error.
    pub fn out_of_memory(requested: usize) -> Self {
        CodecError::OutOfMemory { requested }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        CodecError::Unsupported {
            feature: feature.into(),
        }
    }

    /// Classify the error for the read loop.
    pub fn severity(&self) -> Severity {
        match self {
            CodecError::Resyncable { .. } => Severity::Resyncable,
            CodecError::MalformedRecord { .. }
            | CodecError::BufferTooShort { .. }
            | CodecError::ChecksumMismatch { .. }
            | CodecError::UnintelligibleData { .. } => Severity::PerRecord,
            CodecError::UnexpectedEof { .. }
            | CodecError::IoFailure { .. }
            | CodecError::OutOfMemory { .. }
            | CodecError::Unsupported { .. }
            | CodecError::ParseError { .. } => Severity::Fatal,
        }
    }

    /// True when the read or write loop must stop.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// True for end of stream exactly on a record boundary.
    pub fn is_clean_eof(&self) -> bool {
        matches!(self, CodecError::UnexpectedEof { skipped: 0, .. })
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::Resyncable { skipped, offset } => vec![
                ("skipped", skipped.to_string()),
                ("offset", offset.to_string()),
            ],
            CodecError::MalformedRecord { context, message }
            | CodecError::UnintelligibleData { context, message }
            | CodecError::ParseError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            CodecError::ChecksumMismatch {
                record_type,
                expected,
                computed,
            } => vec![
                ("record_type", format!("{record_type:#x}")),
                ("expected", format!("{expected:#06x}")),
                ("computed", format!("{computed:#06x}")),
            ],
            CodecError::UnexpectedEof {
                context,
                offset,
                skipped,
            } => vec![
                ("context", context.clone()),
                ("offset", offset.to_string()),
                ("skipped", skipped.to_string()),
            ],
            CodecError::IoFailure {
                context,
                kind,
                message,
            } => vec![
                ("context", context.clone()),
                ("kind", format!("{kind:?}")),
                ("message", message.clone()),
            ],
            CodecError::OutOfMemory { requested } => vec![("requested", requested.to_string())],
            CodecError::Unsupported { feature } => vec![("feature", feature.clone())],
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Resyncable { skipped, offset } => {
                write!(f, "Skipped {skipped} bytes at offset {offset} to resynchronize")
            }
            CodecError::MalformedRecord { context, message } => {
                write!(f, "Malformed record in {context}: {message}")
            }
            CodecError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => write!(
                f,
                "Buffer too short: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available"
            ),
            CodecError::ChecksumMismatch {
                record_type,
                expected,
                computed,
            } => write!(
                f,
                "Checksum mismatch in record {record_type:#x}: stored {expected:#06x}, computed {computed:#06x}"
            ),
            CodecError::UnintelligibleData { context, message } => {
                write!(f, "Unintelligible data in {context}: {message}")
            }
            CodecError::UnexpectedEof {
                context,
                offset,
                skipped,
            } => write!(
                f,
                "Unexpected end of stream in {context} at offset {offset} ({skipped} bytes skipped)"
            ),
            CodecError::IoFailure {
                context, message, ..
            } => write!(f, "I/O failure in {context}: {message}"),
            CodecError::OutOfMemory { requested } => {
                write!(f, "Out of memory: failed to allocate {requested} bytes")
            }
            CodecError::Unsupported { feature } => {
                write!(f, "Unsupported feature: '{feature}'")
            }
            CodecError::ParseError { context, message } => {
                write!(f, "Parse error in {context}: {message}")
            }
        }
    }
}

impl std::error::Error for CodecError {}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        CodecError::io("IO", &err)
    }
}

/// Result type for sonarcodec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_error() {
        let err = CodecError::malformed("SxpPing", "point count 9 exceeds payload");
        assert!(matches!(err, CodecError::MalformedRecord { .. }));
        assert_eq!(
            err.to_string(),
            "Malformed record in SxpPing: point count 9 exceeds payload"
        );
        assert_eq!(err.severity(), Severity::PerRecord);
    }

    #[test]
    fn test_checksum_mismatch_error() {
        let err = CodecError::checksum_mismatch(0x44, 0x1234, 0x1235);
        assert_eq!(
            err.to_string(),
            "Checksum mismatch in record 0x44: stored 0x1234, computed 0x1235"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unintelligible_error() {
        let err = CodecError::unintelligible("Bathymetry", "date 19900101 predates instrument");
        assert_eq!(
            err.to_string(),
            "Unintelligible data in Bathymetry: date 19900101 predates instrument"
        );
        assert_eq!(err.severity(), Severity::PerRecord);
    }

    #[test]
    fn test_buffer_too_short_error() {
        let err = CodecError::buffer_too_short(100, 50, 10);
        assert!(matches!(err, CodecError::BufferTooShort { .. }));
        assert_eq!(
            err.to_string(),
            "Buffer too short: requested 100 bytes at position 10, but only 50 bytes available"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unexpected_eof_error() {
        let err = CodecError::unexpected_eof("resync", 4096, 3);
        assert_eq!(
            err.to_string(),
            "Unexpected end of stream in resync at offset 4096 (3 bytes skipped)"
        );
        assert!(err.is_fatal());
        assert!(!err.is_clean_eof());
        assert!(CodecError::unexpected_eof("resync", 4096, 0).is_clean_eof());
    }

    #[test]
    fn test_out_of_memory_error() {
        let err = CodecError::out_of_memory(1 << 40);
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Out of memory: failed to allocate 1099511627776 bytes"
        );
    }

    #[test]
    fn test_resyncable_severity() {
        let err = CodecError::Resyncable {
            skipped: 7,
            offset: 128,
        };
        assert_eq!(err.severity(), Severity::Resyncable);
        assert_eq!(
            err.to_string(),
            "Skipped 7 bytes at offset 128 to resynchronize"
        );
    }

    #[test]
    fn test_unsupported_error() {
        let err = CodecError::unsupported("record kind 0x46 on write");
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Unsupported feature: 'record kind 0x46 on write'"
        );
    }

    #[test]
    fn test_log_fields_buffer_too_short() {
        let err = CodecError::buffer_too_short(100, 50, 10);
        let fields = err.log_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], ("requested", "100".to_string()));
        assert_eq!(fields[1], ("available", "50".to_string()));
        assert_eq!(fields[2], ("cursor", "10".to_string()));
    }

    #[test]
    fn test_log_fields_checksum() {
        let err = CodecError::checksum_mismatch(0x68, 0x00ff, 0x0100);
        let fields = err.log_fields();
        assert_eq!(fields[0], ("record_type", "0x68".to_string()));
        assert_eq!(fields[1], ("expected", "0x00ff".to_string()));
        assert_eq!(fields[2], ("computed", "0x0100".to_string()));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let codec_err: CodecError = io_err.into();
        assert!(matches!(
            codec_err,
            CodecError::IoFailure {
                kind: io::ErrorKind::BrokenPipe,
                ..
            }
        ));
        assert_eq!(codec_err.to_string(), "I/O failure in IO: pipe closed");
        assert!(codec_err.is_fatal());
    }

    #[test]
    fn test_error_clone() {
        let err1 = CodecError::parse("Context", "message");
        let err2 = err1.clone();
        assert_eq!(err1.to_string(), err2.to_string());
    }
}
