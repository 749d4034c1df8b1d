// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format detection by file extension and header probing.
//!
//! Extensions are checked first since they are cheap and unambiguous for
//! the supported formats. Otherwise the first header window of the file is
//! offered to every registered driver, which accepts it only if both the
//! framing and the record type (and sonar id) are plausible and the declared
//! record fits the format's size limit. Checksummed formats also accept a
//! window that starts with a bare label, as written by recorders that omit
//! the size field.
//!
//! # Example
//!
//! ```rust,no_run
//! use sonarcodec::io::detection::detect_format;
//! use sonarcodec::FormatId;
//!
//! let format = detect_format("line_0001.sxp")?;
//! assert_eq!(format, FormatId::Swathplus);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::path::Path;

use crate::core::registry::{DriverRegistry, FormatId};
use crate::encoding::framing::HEADER_LEN;
use crate::io::resync::read_fully;
use crate::{CodecError, Result};

/// Detect the format of the file at `path` using the built-in drivers.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<FormatId> {
    detect_format_with(path.as_ref(), &DriverRegistry::with_builtin())
}

/// Detect the format of the file at `path` among the drivers in `registry`.
pub fn detect_format_with(path: &Path, registry: &DriverRegistry) -> Result<FormatId> {
    if let Some(id) = detect_from_extension(path, registry) {
        return Ok(id);
    }

    let mut file = File::open(path)
        .map_err(|e| CodecError::io(format!("open {}", path.display()), &e))?;
    let mut window = [0u8; HEADER_LEN];
    let n = read_fully(&mut file, &mut window, "detect_format")?;

    detect_from_header(&window[..n], registry).ok_or_else(|| {
        CodecError::unsupported(format!(
            "cannot determine the format of {}",
            path.display()
        ))
    })
}

/// Match the file extension against each driver's extension list.
pub fn detect_from_extension(path: &Path, registry: &DriverRegistry) -> Option<FormatId> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    registry
        .list()
        .into_iter()
        .find(|info| info.extensions.iter().any(|e| *e == ext))
        .map(|info| info.id)
}

/// Offer a header window to each registered driver in id order.
pub fn detect_from_header(window: &[u8], registry: &DriverRegistry) -> Option<FormatId> {
    for info in registry.list() {
        let sized = info
            .framing
            .parse_header(window)
            .filter(|h| info.framing.record_len(h) <= info.max_record_size);
        let Some(header) = sized.or_else(|| info.framing.parse_label(window)) else {
            continue;
        };
        // a fresh driver, so probing leaves no state behind
        let Ok(mut driver) = registry.allocate_state(info.id) else {
            continue;
        };
        if driver.accepts_header(&header) {
            return Some(info.id);
        }
    }
    None
}
