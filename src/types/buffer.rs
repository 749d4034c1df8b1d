// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Growable staging buffer shared by one read or write loop.
//!
//! A single [`GrowableBuffer`] is owned by each reader and each writer. It
//! grows to the largest record seen and never shrinks while the stream is
//! open, so steady-state reading performs no allocation. Growth is
//! copy-preserving and allocation failures surface as
//! [`CodecError::OutOfMemory`] instead of aborting the process.

use crate::{CodecError, Result};

/// Default initial capacity (32 KiB), enough for a typical ping.
pub const DEFAULT_BUFFER_CAPACITY: usize = 32 * 1024;

/// Owned, resizable byte buffer with a high-water mark.
pub struct GrowableBuffer {
    /// The buffer data
    data: Vec<u8>,
    /// Largest length this buffer has ever held
    high_water: usize,
}

impl GrowableBuffer {
    /// Create an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create an empty buffer with at least `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            high_water: 0,
        }
    }

    /// Make sure the buffer can hold `n` bytes without reallocating.
    ///
    /// Existing contents are preserved. Capacity never decreases.
    pub fn ensure_capacity(&mut self, n: usize) -> Result<()> {
        if n > self.data.capacity() {
            let additional = n - self.data.len();
            self.data
                .try_reserve_exact(additional)
                .map_err(|_| CodecError::out_of_memory(n))?;
        }
        Ok(())
    }

    /// Resize to exactly `n` bytes, zero-filling any new bytes.
    pub fn resize(&mut self, n: usize) -> Result<()> {
        self.ensure_capacity(n)?;
        self.data.resize(n, 0);
        self.bump_high_water();
        Ok(())
    }

    /// Append bytes to the end of the buffer.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        let needed = self
            .data
            .len()
            .checked_add(bytes.len())
            .ok_or_else(|| CodecError::out_of_memory(usize::MAX))?;
        self.ensure_capacity(needed)?;
        self.data.extend_from_slice(bytes);
        self.bump_high_water();
        Ok(())
    }

    /// Append `n` zero bytes.
    pub fn extend_zeros(&mut self, n: usize) -> Result<()> {
        let len = self.data.len();
        self.resize(len + n)
    }

    /// Overwrite bytes starting at `offset`.
    ///
    /// The range must already be inside the buffer.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let end = offset + bytes.len();
        if end > self.data.len() {
            return Err(CodecError::buffer_too_short(
                bytes.len(),
                self.data.len().saturating_sub(offset),
                offset as u64,
            ));
        }
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Drop the contents but keep the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the length of the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the capacity of the buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Largest length held since creation.
    #[inline]
    pub fn high_water_mark(&self) -> usize {
        self.high_water
    }

    /// Get a reference to the buffer data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the buffer data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return the inner Vec.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    fn bump_high_water(&mut self) {
        if self.data.len() > self.high_water {
            self.high_water = self.data.len();
        }
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for GrowableBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for GrowableBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .field("high_water", &self.high_water)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_preserves_contents() {
        let mut buf = GrowableBuffer::with_capacity(4);
        buf.extend_from_slice(&[1, 2, 3, 4]).unwrap();
        buf.ensure_capacity(1024).unwrap();
        assert!(buf.capacity() >= 1024);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_capacity_never_shrinks() {
        let mut buf = GrowableBuffer::with_capacity(0);
        buf.resize(5000).unwrap();
        let cap = buf.capacity();
        buf.clear();
        buf.resize(10).unwrap();
        assert_eq!(buf.capacity(), cap);
        assert_eq!(buf.high_water_mark(), 5000);
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn test_resize_zero_fills() {
        let mut buf = GrowableBuffer::new();
        buf.extend_from_slice(&[0xff; 3]).unwrap();
        buf.extend_zeros(5).unwrap();
        assert_eq!(buf.as_slice(), &[0xff, 0xff, 0xff, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_patch() {
        let mut buf = GrowableBuffer::new();
        buf.extend_zeros(8).unwrap();
        buf.patch(4, &[9, 9]).unwrap();
        assert_eq!(buf.as_slice(), &[0, 0, 0, 0, 9, 9, 0, 0]);
        assert!(matches!(
            buf.patch(7, &[1, 2]),
            Err(CodecError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_huge_request_is_out_of_memory() {
        let mut buf = GrowableBuffer::with_capacity(0);
        let err = buf.ensure_capacity(usize::MAX).unwrap_err();
        assert!(matches!(err, CodecError::OutOfMemory { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_debug_format() {
        let buf = GrowableBuffer::with_capacity(16);
        let debug = format!("{buf:?}");
        assert!(debug.contains("GrowableBuffer"));
        assert!(debug.contains("high_water"));
    }
}
