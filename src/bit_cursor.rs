//! MSB-first bit reader over a borrowed payload.
//!
//! Every RFC 3267 field is addressed at bit granularity in the bandwidth-efficient
//! layout, so the TOC walk and the frame copy both pull single bits through a
//! [`BitCursor`].

use crate::error::AmrParsingError;

/// Read cursor yielding one bit at a time, most significant bit first.
///
/// Position is tracked as a byte index plus a one-hot mask selecting the next
/// bit inside that byte. A cursor belongs to one packet pass and is never
/// reused.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    buffer: &'a [u8],
    byte_index: usize,
    bit_mask: u8,
}

impl<'a> BitCursor<'a> {
    /// Creates a cursor positioned on the first bit of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            byte_index: 0,
            bit_mask: 0x80,
        }
    }

    /// Reads the next bit.
    ///
    /// # Errors
    /// - [`AmrParsingError::Truncated`] - Cursor already consumed the whole buffer;
    ///   the position is left unchanged.
    pub fn read_bit(&mut self) -> Result<bool, AmrParsingError> {
        let byte = self
            .buffer
            .get(self.byte_index)
            .copied()
            .ok_or(AmrParsingError::Truncated {
                bit_position: self.bit_position(),
            })?;
        let bit = byte & self.bit_mask != 0;
        self.advance();
        Ok(bit)
    }

    /// Reads `count` bits (at most 16) as an MSB-first unsigned value.
    ///
    /// # Errors
    /// - [`AmrParsingError::Truncated`] - Fewer than `count` bits remain; the
    ///   position is left unchanged.
    pub fn read_bits(&mut self, count: usize) -> Result<u16, AmrParsingError> {
        debug_assert!(count <= 16, "read_bits supports at most 16 bits, got {}", count);
        if self.bits_remaining() < count {
            return Err(AmrParsingError::Truncated {
                bit_position: self.bit_position() + self.bits_remaining(),
            });
        }
        let mut value = 0u16;
        for _ in 0..count {
            value = (value << 1) | u16::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Advances by up to `count` bits without reading them, stopping at the end.
    ///
    /// # Returns
    /// Number of bits actually skipped.
    pub fn skip_bits(&mut self, count: usize) -> usize {
        let skipped = count.min(self.bits_remaining());
        for _ in 0..skipped {
            self.advance();
        }
        skipped
    }

    /// True once every bit of the buffer has been consumed.
    #[inline]
    pub fn exhausted(&self) -> bool {
        self.byte_index >= self.buffer.len()
    }

    /// Bits left before the cursor is exhausted.
    #[inline]
    pub fn bits_remaining(&self) -> usize {
        (self.buffer.len() * 8).saturating_sub(self.bit_position())
    }

    /// Absolute bit offset of the next bit to read.
    #[inline]
    pub fn bit_position(&self) -> usize {
        self.byte_index * 8 + self.bit_mask.leading_zeros() as usize
    }

    /// True when the next bit is the most significant bit of a byte.
    #[inline]
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_mask == 0x80
    }

    #[inline]
    fn advance(&mut self) {
        self.bit_mask >>= 1;
        if self.bit_mask == 0 {
            self.bit_mask = 0x80;
            self.byte_index += 1;
        }
    }
}
