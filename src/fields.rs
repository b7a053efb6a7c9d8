//! Field access on a message record
//!
//! Values go in and come out as ASCII; the engine converts to and from the
//! packed form the schema prescribes. Field 0 addresses the message type
//! indicator. Field 1 is the secondary bitmap indicator and cannot be set.
//!
//! Truncation is silent: input longer than the field's maximum is cut to the
//! maximum, and `get_field` fills at most the caller's buffer.

use alloc::vec;
use alloc::vec::Vec;

use crate::bcd;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::record::{MessageRecord, MAX_FIELD_LENGTH, MTI_LEN};

// Room for the widest field plus PAN filler and even-length padding
const SCRATCH_LEN: usize = MAX_FIELD_LENGTH + 2;

impl Engine {
    /// Reset every field, the append cursor and the packed buffer
    pub fn clear_all_fields(&self, record: &mut MessageRecord) -> Result<()> {
        self.schema()?;
        record.clear();
        Ok(())
    }

    /// Mark one field absent
    ///
    /// The field's bytes stay allocated in the packed buffer until
    /// [`clear_all_fields`](Self::clear_all_fields); setting it again
    /// appends a new copy. Accepts `1..max_fields` (exclusive).
    pub fn clear_one_field(&self, record: &mut MessageRecord, field_no: usize) -> Result<()> {
        let schema = self.schema()?;
        if field_no < 1 || field_no >= schema.max_fields() {
            return Err(Error::InvalidFieldNumber);
        }
        record.clear_slot(field_no);
        Ok(())
    }

    /// Set a field from ASCII data
    ///
    /// Field 0 stores up to four message type digits, left-filled with `'0'`.
    /// Other fields must be in `2..=max_fields`. The value is clamped to the
    /// field's maximum, padded per its type (zeros ahead of `DIGIT` content,
    /// `0x00` after binary, `'0'` after packed, spaces after ASCII), the
    /// designated PAN field gets a trailing `'F'` when it fits, and packed
    /// types are converted to BCD before being appended to the record.
    pub fn set_field(&self, record: &mut MessageRecord, field_no: usize, value: &[u8]) -> Result<()> {
        let schema = self.schema()?;

        if value.is_empty() {
            return Err(Error::InvalidFieldLength);
        }

        if field_no == 0 {
            let n = value.len().min(MTI_LEN);
            let mti = record.mti_mut();
            mti.fill(b'0');
            mti[MTI_LEN - n..].copy_from_slice(&value[..n]);
            return Ok(());
        }

        let format = schema.data_format(field_no)?;
        let field_type = format.field_type;
        let max_length = format.max_length as usize;

        let (len, width) = if field_type.is_binary() {
            let bytes = format.fixed_length();
            (value.len().min(bytes), bytes)
        } else if !field_type.is_variable() {
            (value.len().min(max_length), max_length)
        } else {
            let len = value.len().min(max_length);
            (len, len)
        };

        if width > MAX_FIELD_LENGTH {
            return Err(Error::FieldTooLong);
        }

        let mut scratch = [0u8; SCRATCH_LEN];
        let mut pos = 0;

        if field_type.is_digit() {
            pos = width - len;
            scratch[..pos].fill(b'0');
        }
        scratch[pos..pos + len].copy_from_slice(&value[..len]);
        pos += len;

        let mut length = width;
        if !field_type.is_binary() && schema.is_pan(field_no) && length < max_length {
            scratch[pos] = b'F';
            pos += 1;
            length += 1;
        }

        let pad = if field_type.is_binary() {
            0x00
        } else if field_type.is_packed() {
            b'0'
        } else {
            b' '
        };
        if pos < length {
            scratch[pos..length].fill(pad);
        }

        if field_type.is_packed() {
            let digits = length.next_multiple_of(2);
            scratch[length..digits].fill(b'0');

            let mut packed = [0u8; SCRATCH_LEN / 2];
            let span = bcd::ascii_to_bcd(&scratch[..digits], &mut packed, schema.digit_policy())?;
            record.append(field_no, length, &packed[..span])
        } else {
            record.append(field_no, length, &scratch[..length])
        }
    }

    /// Copy a field's value as ASCII into `out`
    ///
    /// Returns the number of bytes written: 4 for field 0, 0 for an absent
    /// field, otherwise the stored length cut to `out.len()`. Packed types
    /// are unpacked to hex digits (`'0'..'9'`, `'A'..'F'`).
    pub fn get_field(&self, record: &MessageRecord, field_no: usize, out: &mut [u8]) -> Result<usize> {
        let schema = self.schema()?;

        if field_no == 0 {
            if out.len() < MTI_LEN {
                return Err(Error::BufferTooSmall);
            }
            out[..MTI_LEN].copy_from_slice(record.mti());
            return Ok(MTI_LEN);
        }

        let format = schema.data_format(field_no)?;
        let slot = match record.slot(field_no) {
            Some(slot) if slot.present => *slot,
            _ => return Ok(0),
        };

        let length = slot.length as usize;
        if length > MAX_FIELD_LENGTH {
            return Err(Error::FieldTooLong);
        }

        let stored = record.stored(&slot, format.span(length))?;
        let n = length.min(out.len());

        if format.field_type.is_packed() {
            bcd::bcd_to_ascii(stored, &mut out[..n])
        } else {
            out[..n].copy_from_slice(&stored[..n]);
            Ok(n)
        }
    }

    /// Read a field's full value as ASCII
    ///
    /// Same conversion as [`get_field`](Self::get_field) with a buffer sized
    /// to the stored length; absent fields yield an empty vector.
    pub fn read_field(&self, record: &MessageRecord, field_no: usize) -> Result<Vec<u8>> {
        let length = if field_no == 0 {
            MTI_LEN
        } else {
            record
                .slot(field_no)
                .filter(|slot| slot.present)
                .map_or(0, |slot| slot.length as usize)
        };

        let mut out = vec![0u8; length];
        let n = self.get_field(record, field_no, &mut out)?;
        out.truncate(n);
        Ok(out)
    }
}
