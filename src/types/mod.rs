// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Buffer types shared by the reader and writer loops.

pub mod buffer;

pub use buffer::{GrowableBuffer, DEFAULT_BUFFER_CAPACITY};
