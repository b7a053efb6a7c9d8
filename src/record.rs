//! In-memory message record
//!
//! A [`MessageRecord`] holds one message: the message type indicator, a
//! fixed-capacity packed data buffer and per-field slot metadata. Field data
//! is appended to the buffer in the order fields are set or decoded and is
//! never compacted; clearing a single field only drops its presence flag.

use crate::error::{Error, Result};
use crate::schema::EXTENDED_FIELDS;

/// Capacity of the packed data buffer in bytes
pub const RECORD_CAPACITY: usize = 1024;

/// Maximum field length in logical units
pub const MAX_FIELD_LENGTH: usize = 999;

/// Length of the message type indicator in ASCII digits
pub const MTI_LEN: usize = 4;

/// Presence, length and buffer location of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSlot {
    /// Field is present
    pub present: bool,
    /// Length in logical units (digits, bytes)
    pub length: u16,
    /// Start of the field's bytes in the packed buffer
    pub offset: u16,
}

impl FieldSlot {
    /// Absent field
    pub const EMPTY: Self = Self {
        present: false,
        length: 0,
        offset: 0,
    };
}

/// One ISO 8583 message instance
#[derive(Clone, PartialEq, Eq)]
pub struct MessageRecord {
    mti: [u8; MTI_LEN],
    data: [u8; RECORD_CAPACITY],
    offset: usize,
    // Indexed by field number; slot 0 is unused
    fields: [FieldSlot; EXTENDED_FIELDS + 1],
}

impl Default for MessageRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for MessageRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageRecord")
            .field("mti", &self.mti)
            .field("offset", &self.offset)
            .field(
                "present",
                &self.fields.iter().filter(|slot| slot.present).count(),
            )
            .finish()
    }
}

impl MessageRecord {
    /// Create a zero-initialised record with no fields present
    #[inline]
    pub const fn new() -> Self {
        Self {
            mti: [0; MTI_LEN],
            data: [0; RECORD_CAPACITY],
            offset: 0,
            fields: [FieldSlot::EMPTY; EXTENDED_FIELDS + 1],
        }
    }

    /// Reset every field, the append cursor and the packed buffer
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Message type indicator as stored (ASCII)
    #[inline]
    pub fn mti(&self) -> &[u8; MTI_LEN] {
        &self.mti
    }

    #[inline]
    pub(crate) fn mti_mut(&mut self) -> &mut [u8; MTI_LEN] {
        &mut self.mti
    }

    /// Current append position in the packed buffer
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes still available in the packed buffer
    #[inline]
    pub fn remaining(&self) -> usize {
        RECORD_CAPACITY - self.offset
    }

    /// Packed bytes appended so far
    #[inline]
    pub fn packed(&self) -> &[u8] {
        &self.data[..self.offset]
    }

    /// Slot metadata of a field
    #[inline]
    pub fn slot(&self, field_no: usize) -> Option<&FieldSlot> {
        self.fields.get(field_no).filter(|_| field_no != 0)
    }

    /// Check if a field is present
    #[inline]
    pub fn is_present(&self, field_no: usize) -> bool {
        self.slot(field_no).is_some_and(|slot| slot.present)
    }

    /// Iterator over present field numbers, ascending
    #[inline]
    pub fn present_fields(&self) -> impl Iterator<Item = usize> + '_ {
        (1..self.fields.len()).filter(move |&f| self.fields[f].present)
    }

    /// Drop a field's presence flag without reclaiming its bytes
    #[inline]
    pub(crate) fn clear_slot(&mut self, field_no: usize) {
        if let Some(slot) = self.fields.get_mut(field_no) {
            slot.present = false;
        }
    }

    /// Append a field's packed bytes at the cursor and mark it present
    ///
    /// On `Error::BufferOverflow` the record is left unchanged.
    pub(crate) fn append(&mut self, field_no: usize, length: usize, bytes: &[u8]) -> Result<()> {
        if field_no == 0 || field_no >= self.fields.len() {
            return Err(Error::InvalidFieldNumber);
        }
        if length > MAX_FIELD_LENGTH {
            return Err(Error::FieldTooLong);
        }

        let start = self.offset;
        let end = start
            .checked_add(bytes.len())
            .filter(|&end| end <= RECORD_CAPACITY)
            .ok_or(Error::BufferOverflow)?;

        self.data[start..end].copy_from_slice(bytes);
        self.fields[field_no] = FieldSlot {
            present: true,
            length: length as u16,
            offset: start as u16,
        };
        self.offset = end;

        Ok(())
    }

    /// Stored bytes of a slot, `span` bytes from its offset
    #[inline]
    pub(crate) fn stored(&self, slot: &FieldSlot, span: usize) -> Result<&[u8]> {
        let start = slot.offset as usize;
        let end = start
            .checked_add(span)
            .filter(|&end| end <= RECORD_CAPACITY)
            .ok_or(Error::SourceOffsetOutOfRange)?;
        Ok(&self.data[start..end])
    }

    #[cfg(test)]
    pub(crate) fn slot_mut(&mut self, field_no: usize) -> &mut FieldSlot {
        &mut self.fields[field_no]
    }
}
