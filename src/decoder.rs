//! Wire decoder
//!
//! [`WireCursor`] reads borrowed wire bytes with position tracking.
//! [`Engine::decode_wire`] walks the bitmap and copies each present field's
//! packed bytes into a [`MessageRecord`].

use crate::bcd;
use crate::bitmap::Bitmap;
use crate::encoder::MTI_WIRE_LEN;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::record::MessageRecord;

/// Cursor for reading wire content with position tracking
#[derive(Debug)]
pub struct WireCursor<'a> {
    /// Buffer containing the wire data
    pub buf: &'a [u8],
    /// Current read position
    pub pos: usize,
}

impl<'a> WireCursor<'a> {
    /// Create a cursor at the start of `buf`
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Get remaining bytes in cursor
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Check if cursor is at end
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Skip bytes in the cursor
    #[inline]
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.get_bytes(n).map(|_| ())
    }

    /// Read raw bytes
    #[inline]
    pub fn get_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// Peek at bytes without advancing cursor
    #[inline]
    pub fn peek_bytes(&self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(Error::UnexpectedEof)?;
        Ok(&self.buf[self.pos..end])
    }

    /// Read a BCD length prefix of `width` bytes
    #[inline]
    pub fn get_length(&mut self, width: usize) -> Result<u64> {
        bcd::bcd_to_length(self.get_bytes(width)?)
    }

    /// Unread remainder of the buffer
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}

impl Engine {
    /// Parse wire bytes into `record`, returning the number of bytes consumed
    ///
    /// The record is cleared first. The bitmap is 16 bytes only when its
    /// first bit is set and the schema is in extended mode. A failure leaves
    /// fields decoded before the failing one intact, but the record as a
    /// whole should be treated as incomplete.
    pub fn decode_wire(&self, wire: &[u8], record: &mut MessageRecord) -> Result<usize> {
        let schema = self.schema()?;
        record.clear();

        let mut cursor = WireCursor::new(wire);
        bcd::bcd_to_ascii(cursor.get_bytes(MTI_WIRE_LEN)?, record.mti_mut())?;

        let (bitmap, size) = Bitmap::decode(cursor.rest(), schema.mode())?;
        cursor.skip(size)?;

        for field_no in bitmap.iter_fields() {
            let format = schema.data_format(field_no)?;
            let max_length = format.max_length as usize;

            let length = match format.prefix_bytes() {
                0 => format.fixed_length(),
                width => {
                    let length = cursor.get_length(width)?;
                    if length > max_length as u64 {
                        crate::debug!(field_no, length, max_length, "variable length exceeds schema");
                        return Err(Error::VariableLengthExceedsSchema);
                    }
                    length as usize
                }
            };

            let bytes = cursor.get_bytes(format.span(length))?;
            record.append(field_no, length, bytes)?;

            crate::trace!(field_no, length, "field decoded");
        }

        crate::debug!(
            fields = bitmap.count_set(),
            consumed = cursor.pos,
            packed = record.offset(),
            "message decoded"
        );

        Ok(cursor.pos)
    }
}
