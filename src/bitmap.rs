//! Presence bitmap for ISO 8583 fields
//!
//! Bits are numbered from the most significant bit of the first byte:
//! field 1 is `0x80` of byte 0, field 8 is `0x01` of byte 0, field 9 is
//! `0x80` of byte 1, and so on. Field 1 set means a secondary bitmap
//! (fields 65..=128) follows the primary one.

use crate::error::{Error, Result};
use crate::schema::BitmapMode;

/// Field number of the secondary bitmap indicator
pub const SECONDARY_BITMAP_FIELD: usize = 1;

/// Presence bitmap helper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    bits: u128,
    mode: BitmapMode,
}

#[inline]
const fn mask(field_no: usize) -> u128 {
    1u128 << (128 - field_no)
}

impl Bitmap {
    /// Create new empty bitmap
    #[inline]
    pub const fn new(mode: BitmapMode) -> Self {
        Self { bits: 0, mode }
    }

    /// Bitmap width
    #[inline]
    pub const fn mode(&self) -> BitmapMode {
        self.mode
    }

    /// Set a field as present
    #[inline]
    pub fn set(&mut self, field_no: usize) -> Result<()> {
        if field_no == 0 || field_no > self.mode.max_fields() {
            return Err(Error::InvalidFieldNumber);
        }
        self.bits |= mask(field_no);
        Ok(())
    }

    /// Clear a field (mark as absent)
    #[inline]
    pub fn clear(&mut self, field_no: usize) -> Result<()> {
        if field_no == 0 || field_no > self.mode.max_fields() {
            return Err(Error::InvalidFieldNumber);
        }
        self.bits &= !mask(field_no);
        Ok(())
    }

    /// Check if a field is present
    #[inline]
    pub fn is_set(&self, field_no: usize) -> bool {
        if field_no == 0 || field_no > self.mode.max_fields() {
            return false;
        }
        self.bits & mask(field_no) != 0
    }

    /// Secondary bitmap indicator is set
    #[inline]
    pub fn has_secondary(&self) -> bool {
        self.is_set(SECONDARY_BITMAP_FIELD)
    }

    /// Count number of set bits
    #[inline]
    pub fn count_set(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Check if bitmap is empty (no fields set)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Encode bitmap to buffer, 8 or 16 bytes depending on mode
    #[inline]
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.mode.bytes();
        if buf.len() < size {
            return Err(Error::OutputBufferTooSmall);
        }
        buf[..size].copy_from_slice(&self.bits.to_be_bytes()[..size]);
        Ok(size)
    }

    /// Decode bitmap from buffer
    ///
    /// The secondary bitmap is read only when the indicator bit is set and
    /// `mode` allows 128 fields; otherwise the bitmap is 8 bytes and the
    /// indicator bit is kept as read. Returns the bitmap and bytes consumed.
    #[inline]
    pub fn decode(buf: &[u8], mode: BitmapMode) -> Result<(Self, usize)> {
        let first = *buf.first().ok_or(Error::UnexpectedEof)?;

        let width = if first & 0x80 != 0 && mode == BitmapMode::Extended {
            BitmapMode::Extended
        } else {
            BitmapMode::Primary
        };

        let size = width.bytes();
        if buf.len() < size {
            return Err(Error::UnexpectedEof);
        }

        let mut raw = [0u8; 16];
        raw[..size].copy_from_slice(&buf[..size]);
        let bitmap = Self {
            bits: u128::from_be_bytes(raw),
            mode: width,
        };

        Ok((bitmap, size))
    }

    /// Iterator over set field numbers, ascending
    #[inline]
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        (1..=self.mode.max_fields()).filter(move |&f| self.is_set(f))
    }

    /// Iterator over set data field numbers, skipping the secondary indicator
    #[inline]
    pub fn iter_fields(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter_set().filter(|&f| f != SECONDARY_BITMAP_FIELD)
    }
}
