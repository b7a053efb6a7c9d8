//! Error types for the ISO 8583 engine

/// Errors that can occur while configuring, accessing, encoding or decoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Accessor or transcoder used before a schema was bound to the engine
    SchemaNotConfigured,
    /// Field format table is malformed (wrong size or conflicting type flags)
    InvalidSchema,
    /// Field number outside the range accepted by the operation
    InvalidFieldNumber,
    /// Field data is empty
    InvalidFieldLength,
    /// Encoded field length exceeds 999 logical units
    FieldTooLong,
    /// Packed record buffer capacity exceeded
    BufferOverflow,
    /// Caller-supplied wire output buffer too small
    OutputBufferTooSmall,
    /// Caller-supplied field output buffer too small
    BufferTooSmall,
    /// Variable-length prefix on the wire exceeds the schema maximum
    VariableLengthExceedsSchema,
    /// Field metadata points outside the packed record buffer
    SourceOffsetOutOfRange,
    /// Unexpected end of wire data
    UnexpectedEof,
    /// Non-hex character under strict digit policy
    InvalidDigit,
    /// Odd number of ASCII digits given to the BCD packer
    OddDigitCount,
    /// BCD length width outside 1..=10 bytes
    InvalidBcdLength,
    /// Integer does not fit in the requested BCD width
    Overflow,
}

impl Error {
    /// Returns a human-readable description of the error
    pub const fn description(&self) -> &'static str {
        match self {
            Error::SchemaNotConfigured => "field schema has not been configured",
            Error::InvalidSchema => "invalid field schema",
            Error::InvalidFieldNumber => "invalid field number",
            Error::InvalidFieldLength => "invalid field length",
            Error::FieldTooLong => "field length exceeds 999",
            Error::BufferOverflow => "packed record buffer capacity exceeded",
            Error::OutputBufferTooSmall => "output buffer too small for encoded message",
            Error::BufferTooSmall => "buffer too small for field data",
            Error::VariableLengthExceedsSchema => "variable field length exceeds schema maximum",
            Error::SourceOffsetOutOfRange => "field offset outside packed record buffer",
            Error::UnexpectedEof => "unexpected end of message data",
            Error::InvalidDigit => "invalid hex digit in field data",
            Error::OddDigitCount => "odd number of digits for BCD packing",
            Error::InvalidBcdLength => "BCD length width must be 1 to 10 bytes",
            Error::Overflow => "integer overflow in BCD conversion",
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias for engine operations
pub type Result<T> = core::result::Result<T, Error>;
