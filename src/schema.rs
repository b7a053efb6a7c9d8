//! Field format schema
//!
//! A [`Schema`] describes, per field number, how a field is framed on the
//! wire (fixed or variable length) and how its content is represented
//! (binary, ASCII or packed decimal). It is supplied once per deployment and
//! bound to an [`Engine`](crate::Engine).

use alloc::vec::Vec;
use core::ops::{BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Field slots addressable with the primary bitmap only
pub const PRIMARY_FIELDS: usize = 64;

/// Field slots addressable with primary and secondary bitmaps
pub const EXTENDED_FIELDS: usize = 128;

/// Default field carrying the primary account number
pub const DEFAULT_PAN_FIELD: usize = 2;

/// Field type bit flags
///
/// Framing flags (`FIXED`, `VARIABLE`) combine with one content flag. A type
/// without `VARIABLE` is framed as fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct FieldType(u8);

impl FieldType {
    /// Fixed length (bit 0)
    pub const FIXED: Self = Self(0x01);

    /// Variable length with a BCD length prefix (bit 1)
    pub const VARIABLE: Self = Self(0x02);

    /// Raw binary, length in bits (bit 2)
    pub const BINARY: Self = Self(0x04);

    /// ASCII text, length in bytes (bit 3)
    pub const ASCII: Self = Self(0x08);

    /// Packed decimal, length in digits (bit 4)
    pub const BCD: Self = Self(0x10);

    /// Packed decimal with leading zero fill (bit 5)
    pub const DIGIT: Self = Self(0x20);

    const KNOWN: u8 = 0x3F;

    /// Create from raw bits
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits value
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Combine two flag sets
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check that every flag of `other` is set
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check that any flag of `other` is set
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Length travels as a BCD prefix
    #[inline]
    pub const fn is_variable(self) -> bool {
        self.intersects(Self::VARIABLE)
    }

    /// Raw binary content
    #[inline]
    pub const fn is_binary(self) -> bool {
        self.intersects(Self::BINARY)
    }

    /// Two decimal digits per byte (`BCD` or `DIGIT`)
    #[inline]
    pub const fn is_packed(self) -> bool {
        self.intersects(Self::BCD.union(Self::DIGIT))
    }

    /// Caller content is left-padded with `'0'`
    #[inline]
    pub const fn is_digit(self) -> bool {
        self.intersects(Self::DIGIT)
    }

    /// Framing flags are exclusive and at most one content family is set
    pub const fn is_consistent(self) -> bool {
        if self.0 & !Self::KNOWN != 0 {
            return false;
        }
        if self.contains(Self::FIXED.union(Self::VARIABLE)) {
            return false;
        }
        let families = self.is_binary() as u8
            + self.intersects(Self::ASCII) as u8
            + self.is_packed() as u8;
        families <= 1
    }
}

impl BitOr for FieldType {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for FieldType {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Format of a single field: type flags and maximum length in logical units
///
/// Logical units are digits for packed types, bits for binary and bytes for
/// ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldFormat {
    /// Type flags
    pub field_type: FieldType,
    /// Maximum length in logical units
    pub max_length: u16,
}

impl FieldFormat {
    /// Create a field format
    #[inline]
    pub const fn new(field_type: FieldType, max_length: u16) -> Self {
        Self {
            field_type,
            max_length,
        }
    }

    /// Fixed-length packed decimal of `digits` digits
    pub const fn bcd(digits: u16) -> Self {
        Self::new(FieldType::BCD, digits)
    }

    /// Variable-length packed decimal of at most `digits` digits
    pub const fn var_bcd(digits: u16) -> Self {
        Self::new(FieldType::BCD.union(FieldType::VARIABLE), digits)
    }

    /// Fixed-length zero-filled numeric field
    pub const fn digits(digits: u16) -> Self {
        Self::new(FieldType::DIGIT, digits)
    }

    /// Fixed-length ASCII of `bytes` bytes
    pub const fn ascii(bytes: u16) -> Self {
        Self::new(FieldType::ASCII, bytes)
    }

    /// Variable-length ASCII of at most `bytes` bytes
    pub const fn var_ascii(bytes: u16) -> Self {
        Self::new(FieldType::ASCII.union(FieldType::VARIABLE), bytes)
    }

    /// Binary field of `bits` bits
    pub const fn binary(bits: u16) -> Self {
        Self::new(FieldType::BINARY, bits)
    }

    /// Width of the wire length prefix: 0, 1 (max ≤ 99) or 2 bytes
    #[inline]
    pub const fn prefix_bytes(&self) -> usize {
        if !self.field_type.is_variable() {
            0
        } else if self.max_length <= 99 {
            1
        } else {
            2
        }
    }

    /// Stored length of a fixed field in logical units (bytes for binary)
    #[inline]
    pub const fn fixed_length(&self) -> usize {
        if self.field_type.is_binary() {
            self.max_length as usize / 8
        } else {
            self.max_length as usize
        }
    }

    /// Bytes occupied by `length` logical units
    #[inline]
    pub const fn span(&self, length: usize) -> usize {
        if self.field_type.is_packed() {
            length.div_ceil(2)
        } else {
            length
        }
    }
}

/// Presence bitmap width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BitmapMode {
    /// Primary bitmap only, fields 1..=64
    #[default]
    Primary,
    /// Primary and secondary bitmaps, fields 1..=128
    Extended,
}

impl BitmapMode {
    /// Size of the full bitmap in bytes
    #[inline]
    pub const fn bytes(&self) -> usize {
        match self {
            BitmapMode::Primary => 8,
            BitmapMode::Extended => 16,
        }
    }

    /// Highest field number
    #[inline]
    pub const fn max_fields(&self) -> usize {
        match self {
            BitmapMode::Primary => PRIMARY_FIELDS,
            BitmapMode::Extended => EXTENDED_FIELDS,
        }
    }
}

/// Handling of non-hex characters when packing digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DigitPolicy {
    /// Non-hex characters pack as nibble 0
    #[default]
    Lenient,
    /// Non-hex characters fail with `Error::InvalidDigit`
    Strict,
}

#[cfg(feature = "serde")]
const fn default_pan_field() -> Option<usize> {
    Some(DEFAULT_PAN_FIELD)
}

/// Field format table for one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schema {
    mode: BitmapMode,
    formats: Vec<FieldFormat>,
    #[cfg_attr(feature = "serde", serde(default))]
    digit_policy: DigitPolicy,
    #[cfg_attr(feature = "serde", serde(default = "default_pan_field"))]
    pan_field: Option<usize>,
}

impl Schema {
    /// Build a schema from a table of exactly `mode.max_fields()` formats
    ///
    /// Entry `i` describes field `i + 1`. The entry for field 1 is kept for
    /// table alignment but never used, since field 1 is the secondary
    /// bitmap indicator.
    pub fn new(mode: BitmapMode, table: &[FieldFormat]) -> Result<Self> {
        let schema = Self {
            mode,
            formats: table.to_vec(),
            digit_policy: DigitPolicy::default(),
            pan_field: Some(DEFAULT_PAN_FIELD),
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Set the digit packing policy
    pub fn with_digit_policy(mut self, policy: DigitPolicy) -> Self {
        self.digit_policy = policy;
        self
    }

    /// Designate the field that receives the `'F'` PAN filler, or none
    ///
    /// Fails with `Error::InvalidSchema` outside `2..=max_fields`.
    pub fn with_pan_field(mut self, field_no: Option<usize>) -> Result<Self> {
        self.pan_field = field_no;
        self.validate()?;
        Ok(self)
    }

    /// Check table size, type flags and PAN designation
    pub fn validate(&self) -> Result<()> {
        if self.formats.len() != self.mode.max_fields() {
            return Err(Error::InvalidSchema);
        }

        if !self.formats.iter().all(|f| f.field_type.is_consistent()) {
            return Err(Error::InvalidSchema);
        }

        if let Some(pan) = self.pan_field {
            if pan < 2 || pan > self.mode.max_fields() {
                return Err(Error::InvalidSchema);
            }
        }

        Ok(())
    }

    /// Bitmap mode
    #[inline]
    pub fn mode(&self) -> BitmapMode {
        self.mode
    }

    /// Highest field number
    #[inline]
    pub fn max_fields(&self) -> usize {
        self.mode.max_fields()
    }

    /// Digit packing policy
    #[inline]
    pub fn digit_policy(&self) -> DigitPolicy {
        self.digit_policy
    }

    /// Field receiving the PAN filler
    #[inline]
    pub fn pan_field(&self) -> Option<usize> {
        self.pan_field
    }

    /// All formats, index 0 is field 1
    #[inline]
    pub fn formats(&self) -> &[FieldFormat] {
        &self.formats
    }

    /// Format of a field by 1-based number
    #[inline]
    pub fn format(&self, field_no: usize) -> Option<&FieldFormat> {
        field_no.checked_sub(1).and_then(|i| self.formats.get(i))
    }

    /// Format of a data field, `Error::InvalidFieldNumber` outside `2..=max_fields`
    #[inline]
    pub fn data_format(&self, field_no: usize) -> Result<&FieldFormat> {
        if field_no < 2 {
            return Err(Error::InvalidFieldNumber);
        }
        self.format(field_no).ok_or(Error::InvalidFieldNumber)
    }

    #[inline]
    pub(crate) fn is_pan(&self, field_no: usize) -> bool {
        self.pan_field == Some(field_no)
    }
}
