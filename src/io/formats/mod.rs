// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format drivers.
//!
//! - [`swathplus`]: SEA SWATHplus processed (SXP) and raw (SXI) files
//! - [`simrad`]: Simrad EM multibeam raw datagrams

pub mod simrad;
pub mod swathplus;
