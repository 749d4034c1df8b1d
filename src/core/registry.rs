// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format driver registry.
//!
//! Maps a [`FormatId`] to the capability table of its driver and a
//! constructor that allocates a driver with fresh per-stream state. The
//! generic reader and writer only ever hold what [`DriverRegistry::allocate_state`]
//! returns.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use super::error::{CodecError, Result};
use crate::io::formats::simrad::SimradDriver;
use crate::io::formats::swathplus::SwathplusDriver;
use crate::io::metadata::FormatInfo;
use crate::io::traits::FormatDriver;

/// Registry key of a supported format.
///
/// Names are resolved through the registered [`FormatInfo`] tables, so a
/// new format only has to publish its names and aliases there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatId {
    /// SEA SWATHplus SXP/SXI
    Swathplus,
    /// Simrad EM raw datagrams
    SimradEm,
}

impl FormatId {
    /// Short lowercase key.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatId::Swathplus => "swathplus",
            FormatId::SimradEm => "simrad",
        }
    }
}

/// Error returned when parsing a `FormatId` from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFormatIdError {
    name: String,
    known: Vec<&'static str>,
}

impl fmt::Display for ParseFormatIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown format '{}', expected one of: {}",
            self.name,
            self.known.join(", ")
        )
    }
}

impl std::error::Error for ParseFormatIdError {}

impl FromStr for FormatId {
    type Err = ParseFormatIdError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let registry = DriverRegistry::with_builtin();
        registry.find(s).ok_or_else(|| ParseFormatIdError {
            name: s.to_string(),
            known: registry.list().iter().map(|info| info.id.as_str()).collect(),
        })
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FormatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FormatId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Registration record for one format.
#[derive(Clone)]
pub struct DriverEntry {
    /// Capability table
    pub info: FormatInfo,
    /// Constructs a driver with fresh per-stream state
    pub allocate_state: fn() -> Box<dyn FormatDriver>,
}

impl fmt::Debug for DriverEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverEntry")
            .field("info", &self.info.name)
            .finish_non_exhaustive()
    }
}

/// Thread-safe registry of format drivers.
///
/// Uses RwLock for concurrent lookups with exclusive registration.
pub struct DriverRegistry {
    entries: RwLock<HashMap<FormatId, DriverEntry>>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding every built-in driver.
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register(DriverEntry {
            info: crate::io::formats::swathplus::driver::format_info(),
            allocate_state: SwathplusDriver::allocate,
        });
        registry.register(DriverEntry {
            info: crate::io::formats::simrad::driver::format_info(),
            allocate_state: SimradDriver::allocate,
        });
        registry
    }

    /// Register or replace the driver for `entry.info.id`.
    pub fn register(&self, entry: DriverEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(entry.info.id, entry);
    }

    /// Look up a registration.
    pub fn get(&self, id: FormatId) -> Option<DriverEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&id).cloned()
    }

    /// Resolve a format by key, format name, alias or file extension,
    /// ignoring case.
    pub fn find(&self, name: &str) -> Option<FormatId> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .values()
            .map(|entry| &entry.info)
            .find(|info| {
                info.id.as_str().eq_ignore_ascii_case(name)
                    || info.name.eq_ignore_ascii_case(name)
                    || info
                        .aliases
                        .iter()
                        .chain(info.extensions)
                        .any(|alias| alias.eq_ignore_ascii_case(name))
            })
            .map(|info| info.id)
    }

    /// Construct a driver with fresh per-stream state.
    pub fn allocate_state(&self, id: FormatId) -> Result<Box<dyn FormatDriver>> {
        let entry = self
            .get(id)
            .ok_or_else(|| CodecError::unsupported(format!("format '{id}' is not registered")))?;
        debug!(format = %id, "allocating driver state");
        Ok((entry.allocate_state)())
    }

    /// Release a driver, logging its final counters.
    pub fn free_state(driver: Box<dyn FormatDriver>) {
        debug!(
            format = driver.info().name,
            summary = %driver.state_summary(),
            "releasing driver state"
        );
        drop(driver);
    }

    /// Capability tables of every registered driver, ordered by id.
    pub fn list(&self) -> Vec<FormatInfo> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut infos: Vec<FormatInfo> = entries.values().map(|e| e.info.clone()).collect();
        infos.sort_by_key(|info| info.id);
        infos
    }

    /// Number of registered drivers.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::formats::swathplus::driver::format_info;

    #[test]
    fn test_format_id_from_str() {
        assert_eq!("swathplus".parse::<FormatId>(), Ok(FormatId::Swathplus));
        assert_eq!("SXP".parse::<FormatId>(), Ok(FormatId::Swathplus));
        assert_eq!("EM300RAW".parse::<FormatId>(), Ok(FormatId::SimradEm));
        assert_eq!("simrad".parse::<FormatId>(), Ok(FormatId::SimradEm));
        assert_eq!("56".parse::<FormatId>(), Ok(FormatId::SimradEm));
        let err = "gsf".parse::<FormatId>().unwrap_err();
        assert!(err.to_string().contains("'gsf'"));
        assert!(err.to_string().contains("swathplus, simrad"), "{err}");
    }

    #[test]
    fn test_find_uses_registered_tables() {
        let registry = DriverRegistry::new();
        assert_eq!(registry.find("sxi"), None);

        registry.register(DriverEntry {
            info: format_info(),
            allocate_state: SwathplusDriver::allocate,
        });
        assert_eq!(registry.find("SXI"), Some(FormatId::Swathplus));
        assert_eq!(registry.find("swplssxp"), Some(FormatId::Swathplus));
        assert_eq!(registry.find("222"), Some(FormatId::Swathplus));
        assert_eq!(registry.find("em300raw"), None);
    }

    #[test]
    fn test_format_id_serde() {
        assert_eq!(
            serde_json::to_string(&FormatId::SimradEm).unwrap(),
            "\"simrad\""
        );
        let id: FormatId = serde_json::from_str("\"em300raw\"").unwrap();
        assert_eq!(id, FormatId::SimradEm);
        let id: FormatId = serde_json::from_str("\"swathplus\"").unwrap();
        assert_eq!(id, FormatId::Swathplus);
        assert!(serde_json::from_str::<FormatId>("\"xtf\"").is_err());
    }

    #[test]
    fn test_builtin_registry() {
        let registry = DriverRegistry::with_builtin();
        assert_eq!(registry.len(), 2);
        let infos = registry.list();
        assert_eq!(infos[0].name, "SWPLSSXP");
        assert_eq!(infos[1].name, "EM300RAW");

        let driver = registry.allocate_state(FormatId::SimradEm).unwrap();
        assert_eq!(driver.info().id, FormatId::SimradEm);
        DriverRegistry::free_state(driver);
    }

    #[test]
    fn test_unregistered_format() {
        let registry = DriverRegistry::new();
        assert!(registry.is_empty());
        let err = registry.allocate_state(FormatId::Swathplus).err().unwrap();
        assert!(matches!(err, CodecError::Unsupported { .. }));

        registry.register(DriverEntry {
            info: format_info(),
            allocate_state: SwathplusDriver::allocate,
        });
        assert!(registry.allocate_state(FormatId::Swathplus).is_ok());
    }
}
