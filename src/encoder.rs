//! Wire encoder
//!
//! [`WireEncoder`] writes into a caller-provided buffer with bounds checks
//! on every write. [`Engine::encode_wire`] drives it to serialise a
//! [`MessageRecord`]: packed MTI, bitmap, then every present field in
//! ascending order with its BCD length prefix when the field is variable.

use crate::bcd;
use crate::bitmap::{Bitmap, SECONDARY_BITMAP_FIELD};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::record::{MessageRecord, MTI_LEN};
use crate::schema::{BitmapMode, DigitPolicy};

/// Packed size of the message type indicator
pub const MTI_WIRE_LEN: usize = MTI_LEN / 2;

/// Encoder that writes into a user-provided buffer
pub struct WireEncoder<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WireEncoder<'a> {
    /// Create new encoder with the given buffer
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn claim(&mut self, n: usize) -> Result<&mut [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(Error::OutputBufferTooSmall)?;
        let start = self.pos;
        self.pos = end;
        Ok(&mut self.buf[start..end])
    }

    /// Write raw bytes
    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.claim(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Pack an even number of ASCII digits as BCD
    #[inline]
    pub fn put_digits(&mut self, ascii: &[u8], policy: DigitPolicy) -> Result<()> {
        if ascii.len() % 2 != 0 {
            return Err(Error::OddDigitCount);
        }
        let out = self.claim(ascii.len() / 2)?;
        bcd::ascii_to_bcd(ascii, out, policy)?;
        Ok(())
    }

    /// Write a BCD length prefix of `width` bytes
    #[inline]
    pub fn put_length(&mut self, length: usize, width: usize) -> Result<()> {
        let out = self.claim(width)?;
        bcd::length_to_bcd(length as u64, out)?;
        Ok(())
    }

    /// Reserve `n` zeroed bytes to be filled later, returning their position
    #[inline]
    pub fn reserve(&mut self, n: usize) -> Result<usize> {
        let start = self.pos;
        self.claim(n)?.fill(0);
        Ok(start)
    }

    /// Mutable view of previously written bytes
    #[inline]
    pub fn written_mut(&mut self, start: usize, n: usize) -> Result<&mut [u8]> {
        let end = start
            .checked_add(n)
            .filter(|&end| end <= self.pos)
            .ok_or(Error::OutputBufferTooSmall)?;
        Ok(&mut self.buf[start..end])
    }

    /// Get current position in buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get remaining buffer capacity
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Reset encoder for reuse with the same buffer
    #[inline]
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Get a slice of the encoded data
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

impl Engine {
    /// Serialise a record into `out`, returning the number of bytes written
    ///
    /// The bitmap is 8 bytes in [`BitmapMode::Primary`] and 16 bytes, with
    /// the secondary indicator set, in [`BitmapMode::Extended`], whatever
    /// fields are present. Fails with `Error::OutputBufferTooSmall` when
    /// `out` runs out and `Error::SourceOffsetOutOfRange` when slot metadata
    /// points outside the record's buffer.
    pub fn encode_wire(&self, record: &MessageRecord, out: &mut [u8]) -> Result<usize> {
        let schema = self.schema()?;
        let mode = schema.mode();
        let mut encoder = WireEncoder::new(out);

        encoder.put_digits(record.mti(), schema.digit_policy())?;
        let bitmap_pos = encoder.reserve(mode.bytes())?;

        let mut bitmap = Bitmap::new(mode);
        for field_no in record.present_fields() {
            if field_no > mode.max_fields() {
                break;
            }
            let format = schema.data_format(field_no)?;
            let slot = record.slot(field_no).ok_or(Error::InvalidFieldNumber)?;
            let length = slot.length as usize;

            bitmap.set(field_no)?;

            let prefix = format.prefix_bytes();
            if prefix > 0 {
                encoder.put_length(length, prefix)?;
            }

            let bytes = record.stored(slot, format.span(length))?;
            encoder.put_bytes(bytes)?;

            crate::trace!(field_no, length, bytes = bytes.len(), "field encoded");
        }

        if mode == BitmapMode::Extended {
            bitmap.set(SECONDARY_BITMAP_FIELD)?;
        }
        bitmap.encode(encoder.written_mut(bitmap_pos, mode.bytes())?)?;

        crate::debug!(
            fields = bitmap.count_set(),
            size = encoder.position(),
            "message encoded"
        );

        Ok(encoder.position())
    }
}
