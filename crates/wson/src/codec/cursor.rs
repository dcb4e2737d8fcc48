//! Byte cursors for the WSON wire format.
//!
//! [`Reader`] walks a borrowed byte slice with bounds checking; [`Writer`]
//! appends to a growable buffer. A cursor is either read-only or write-only
//! for the duration of one call.

use crate::codec::tag::Tag;
use crate::error::DecodeError;
use crate::limits::MAX_VARUINT_BYTES;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding WSON data.
///
/// Reads never move past the end of the data. A failed read returns
/// [`DecodeError::UnexpectedEof`] and leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true while unread bytes remain.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Moves the position to the end, so every later read fails.
    pub fn exhaust(&mut self) {
        self.pos = self.data.len();
    }

    /// Returns the next tag byte without consuming it.
    #[inline]
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Reads a tag byte.
    #[inline]
    pub fn next_tag(&mut self) -> Result<u8, DecodeError> {
        self.read_byte("tag")
    }

    /// Un-reads exactly one byte, normally a tag just inspected.
    pub fn back_one_tag(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    #[inline]
    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(DecodeError::UnexpectedEof { context })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly n bytes as a view into the underlying data.
    #[inline]
    pub fn next_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::UnexpectedEof { context })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    #[inline]
    fn next_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], DecodeError> {
        let bytes = self.next_bytes(N, context)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads an unsigned LEB128 varuint of at most 5 bytes.
    ///
    /// On failure the position is restored to where the varuint started.
    pub fn next_var_uint(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let start = self.pos;
        let mut result: u32 = 0;
        for i in 0..MAX_VARUINT_BYTES {
            let byte = match self.read_byte(context) {
                Ok(byte) => byte,
                Err(e) => {
                    self.pos = start;
                    return Err(e);
                }
            };
            result |= ((byte & 0x7F) as u32).wrapping_shl(7 * i as u32);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        self.pos = start;
        Err(DecodeError::VarUintTooLong { context })
    }

    /// Reads a 4-byte big-endian signed integer.
    #[inline]
    pub fn next_i32(&mut self, context: &'static str) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.next_array(context)?))
    }

    /// Reads an 8-byte big-endian signed integer.
    #[inline]
    pub fn next_i64(&mut self, context: &'static str) -> Result<i64, DecodeError> {
        Ok(i64::from_be_bytes(self.next_array(context)?))
    }

    /// Reads a 4-byte big-endian float.
    #[inline]
    pub fn next_f32(&mut self, context: &'static str) -> Result<f32, DecodeError> {
        Ok(f32::from_be_bytes(self.next_array(context)?))
    }

    /// Reads an 8-byte big-endian float. NaN is passed through.
    #[inline]
    pub fn next_f64(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        Ok(f64::from_be_bytes(self.next_array(context)?))
    }

    /// Reads a varuint byte length followed by that many bytes.
    ///
    /// Restores the position if the payload is truncated.
    pub fn next_len_prefixed(&mut self, context: &'static str) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        let len = self.next_var_uint(context)? as usize;
        self.next_bytes(len, context).inspect_err(|_| self.pos = start)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding WSON data. The write position is always the length.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a tag byte.
    #[inline]
    pub fn push_tag(&mut self, tag: Tag) {
        self.buf.push(tag.byte());
    }

    /// Writes raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes an unsigned LEB128 varuint.
    #[inline]
    pub fn push_var_uint(&mut self, mut value: u32) {
        let mut buf = [0u8; MAX_VARUINT_BYTES];
        let mut len = 0;
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            buf[len] = byte;
            len += 1;
            if value == 0 {
                break;
            }
        }
        self.buf.extend_from_slice(&buf[..len]);
    }

    /// Writes a 4-byte big-endian signed integer.
    pub fn push_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes an 8-byte big-endian float.
    pub fn push_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a byte length prefix and UTF-16LE code units.
    pub fn push_text(&mut self, units: &[u16]) {
        self.push_var_uint((units.len() * 2) as u32);
        self.buf.reserve(units.len() * 2);
        for unit in units {
            self.buf.extend_from_slice(&unit.to_le_bytes());
        }
    }
}
