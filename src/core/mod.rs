// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout sonarcodec.
//!
//! - [`CodecError`] and [`Severity`]: error taxonomy shared by every layer
//! - [`DriverRegistry`] and [`FormatId`]: format driver dispatch table

pub mod error;
pub mod registry;

pub use error::{CodecError, Result, Severity};
pub use registry::{DriverEntry, DriverRegistry, FormatId, ParseFormatIdError};
