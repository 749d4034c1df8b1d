// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Reader and writer configuration.
//!
//! ```toml
//! format = "simrad"
//! read_buffer_capacity = 65536
//! stop_on_record_error = true
//! max_records = 1000
//! write_size_fields = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::registry::FormatId;
use crate::types::buffer::DEFAULT_BUFFER_CAPACITY;
use crate::CodecError;

/// Default `BufReader`/`BufWriter` size.
pub const DEFAULT_IO_BUFFER_SIZE: usize = 64 * 1024;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

impl From<ConfigError> for CodecError {
    fn from(err: ConfigError) -> Self {
        CodecError::parse("SonarConfig", err.to_string())
    }
}

/// Settings shared by [`SonarReader`](super::SonarReader) and
/// [`SonarWriter`](super::SonarWriter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SonarConfig {
    /// Explicit format; detected from the path or stream when unset
    pub format: Option<FormatId>,
    /// Initial capacity of the record staging buffer
    pub read_buffer_capacity: usize,
    /// Size of the buffered reader or writer around the stream
    pub io_buffer_size: usize,
    /// Treat a rejected record as a fatal error
    pub stop_on_record_error: bool,
    /// Stop after this many records
    pub max_records: Option<u64>,
    /// Emit the size field in front of checksummed records
    pub write_size_fields: bool,
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            format: None,
            read_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            io_buffer_size: DEFAULT_IO_BUFFER_SIZE,
            stop_on_record_error: false,
            max_records: None,
            write_size_fields: true,
        }
    }
}

impl SonarConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SonarConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "io_buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.max_records == Some(0) {
            return Err(ConfigError::Invalid(
                "max_records must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SonarConfig::from_toml_str("").unwrap();
        assert_eq!(config, SonarConfig::default());
        assert_eq!(config.read_buffer_capacity, 32768);
        assert!(!config.stop_on_record_error);
        assert!(config.write_size_fields);
    }

    #[test]
    fn test_parse_all_fields() {
        let config = SonarConfig::from_toml_str(
            r#"
            format = "em300raw"
            read_buffer_capacity = 1024
            io_buffer_size = 4096
            stop_on_record_error = true
            max_records = 10
            write_size_fields = false
            "#,
        )
        .unwrap();
        assert_eq!(config.format, Some(FormatId::SimradEm));
        assert_eq!(config.read_buffer_capacity, 1024);
        assert_eq!(config.io_buffer_size, 4096);
        assert!(config.stop_on_record_error);
        assert_eq!(config.max_records, Some(10));
        assert!(!config.write_size_fields);
    }

    #[test]
    fn test_rejects_unknown_and_invalid() {
        assert!(matches!(
            SonarConfig::from_toml_str("colour = \"red\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            SonarConfig::from_toml_str("io_buffer_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SonarConfig::from_toml_str("max_records = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SonarConfig::from_file("/nonexistent/sonar.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        let codec: CodecError = err.into();
        assert!(matches!(codec, CodecError::ParseError { .. }));
    }
}
