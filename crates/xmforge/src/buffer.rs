//! Growable little-endian byte buffer with position tracking and backpatching.
//!
//! The XM encoder writes every field through a [`ByteBuffer`]. Sizes that are
//! only known after a block has been emitted (pattern bodies) are reserved as
//! placeholders and filled in later with [`ByteBuffer::patch_u16`].

use byteorder::{ByteOrder, LittleEndian};

/// Capacity used by [`ByteBuffer::new`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// Sequential little-endian writer over a doubling, zero-filled backing store.
///
/// `len()` tracks the furthest byte ever written, which is what
/// [`ByteBuffer::into_bytes`] returns. The allocated capacity is never exposed
/// as output.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    position: usize,
    len: usize,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteBuffer {
    /// Create an empty buffer with [`DEFAULT_CAPACITY`] bytes reserved.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty buffer with the given initial capacity (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            position: 0,
            len: 0,
        }
    }

    /// Currently allocated capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes written so far (the high-water mark).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current write position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the write position. Moving past `len()` leaves a zero gap once
    /// something is written there.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Grow the backing store by doubling until `needed` bytes fit.
    fn ensure_capacity(&mut self, needed: usize) {
        let mut capacity = self.data.len().max(1);
        if capacity >= needed {
            return;
        }
        while capacity < needed {
            capacity = capacity.saturating_mul(2);
        }
        self.data.resize(capacity, 0);
    }

    /// Reserve `count` bytes at the current position, advance past them and
    /// return the slice to fill.
    fn advance(&mut self, count: usize) -> &mut [u8] {
        let start = self.position;
        let end = start + count;
        self.ensure_capacity(end);
        self.position = end;
        self.len = self.len.max(end);
        &mut self.data[start..end]
    }

    pub fn write_u8(&mut self, value: u8) {
        self.advance(1)[0] = value;
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        LittleEndian::write_u16(self.advance(2), value);
    }

    pub fn write_i16(&mut self, value: i16) {
        LittleEndian::write_i16(self.advance(2), value);
    }

    pub fn write_u32(&mut self, value: u32) {
        LittleEndian::write_u32(self.advance(4), value);
    }

    pub fn write_i32(&mut self, value: i32) {
        LittleEndian::write_i32(self.advance(4), value);
    }

    /// Write `value` as exactly `length` bytes: truncated when longer,
    /// zero-padded when shorter.
    pub fn write_string(&mut self, value: &str, length: usize) {
        let bytes = value.as_bytes();
        let copy_len = bytes.len().min(length);
        let slot = self.advance(length);
        slot[..copy_len].copy_from_slice(&bytes[..copy_len]);
        slot[copy_len..].fill(0);
    }

    /// Write a raw byte sequence.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.advance(bytes.len()).copy_from_slice(bytes);
    }

    /// Write `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) {
        self.advance(count).fill(0);
    }

    /// Overwrite a 16-bit value at `offset` without moving the write position.
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        let position = self.position;
        self.position = offset;
        self.write_u16(value);
        self.position = position;
    }

    /// Bytes `offset..offset + count`, if they have been written.
    fn written(&self, offset: usize, count: usize) -> Option<&[u8]> {
        let end = offset.checked_add(count)?;
        (end <= self.len).then(|| &self.data[offset..end])
    }

    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        self.written(offset, 1).map(|b| b[0])
    }

    pub fn read_i8(&self, offset: usize) -> Option<i8> {
        self.read_u8(offset).map(|b| b as i8)
    }

    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        self.written(offset, 2).map(LittleEndian::read_u16)
    }

    pub fn read_i16(&self, offset: usize) -> Option<i16> {
        self.written(offset, 2).map(LittleEndian::read_i16)
    }

    pub fn read_u32(&self, offset: usize) -> Option<u32> {
        self.written(offset, 4).map(LittleEndian::read_u32)
    }

    pub fn read_i32(&self, offset: usize) -> Option<i32> {
        self.written(offset, 4).map(LittleEndian::read_i32)
    }

    /// The written bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Finalize the buffer, returning exactly the written bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.data.truncate(self.len);
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut buf = ByteBuffer::new();
        buf.write_u16(0x0104);
        buf.write_u32(276);
        buf.write_i8(-1);
        assert_eq!(buf.as_slice(), &[0x04, 0x01, 0x14, 0x01, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn test_patch_keeps_position() {
        let mut buf = ByteBuffer::new();
        buf.write_u32(9);
        let slot = buf.position();
        buf.write_u16(0);
        buf.write_bytes(&[0x80, 0x80, 0x80]);
        buf.patch_u16(slot, 3);

        assert_eq!(buf.position(), 9);
        assert_eq!(buf.read_u16(slot), Some(3));
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn test_growth_doubles_capacity() {
        let mut buf = ByteBuffer::with_capacity(4);
        buf.write_u32(1);
        assert_eq!(buf.capacity(), 4);
        buf.write_u8(2);
        assert_eq!(buf.capacity(), 8);
        buf.write_zeros(20);
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf.len(), 25);
    }

    #[test]
    fn test_read_past_end_is_none() {
        let mut buf = ByteBuffer::new();
        buf.write_u8(7);
        assert_eq!(buf.read_u8(0), Some(7));
        assert_eq!(buf.read_u16(0), None);
        assert_eq!(buf.read_u32(usize::MAX), None);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut buf = ByteBuffer::with_capacity(0);
        assert_eq!(buf.capacity(), 1);
        buf.write_u16(0xBEEF);
        assert_eq!(buf.into_bytes(), vec![0xEF, 0xBE]);
    }
}
