//! iso8583-engine: bitmap-driven ISO 8583 message codec
//!
//! This crate converts between ISO 8583 wire messages and an in-memory
//! [`MessageRecord`] with random access to fields by number. Field framing
//! and content encoding come from a per-deployment [`Schema`] bound to an
//! [`Engine`].
//!
//! # Wire Format
//!
//! ```text
//! +-------------+--------------------------+---------------------------------+
//! | MTI 2 bytes | Bitmap 8 or 16 bytes     | Fields, ascending field number  |
//! | (4 BCD dig.)| (MSB of byte 0 = field 1)| [BCD length prefix] + payload   |
//! +-------------+--------------------------+---------------------------------+
//! ```
//!
//! - Field 1 set in the bitmap means a secondary bitmap (fields 65-128) follows
//! - Variable fields carry a 1-byte (max ≤ 99) or 2-byte BCD length prefix
//! - Packed decimal payloads take `ceil(len / 2)` bytes, binary `max / 8`,
//!   ASCII `len`
//!
//! # Features
//!
//! - Allocation-free field access, encoding and decoding
//! - Fixed 1024-byte packed buffer per record with explicit capacity checks
//! - Lenient or strict handling of non-digit characters in packed fields
//! - Optional `serde` support for loading schemas, optional `tracing` events
//! - `no_std` support with `alloc`
//!
//! # Example
//!
//! ```rust
//! use iso8583_engine::*;
//!
//! let engine = Engine::with_schema(presets::pos_64_schema()?);
//! let mut record = MessageRecord::new();
//!
//! engine.set_field(&mut record, 0, b"0800")?;
//! engine.set_field(&mut record, 4, b"000000000293")?;
//! engine.set_field(&mut record, 41, b"12345678")?;
//!
//! let mut wire = [0u8; 256];
//! let size = engine.encode_wire(&record, &mut wire)?;
//!
//! let mut decoded = MessageRecord::new();
//! engine.decode_wire(&wire[..size], &mut decoded)?;
//! assert_eq!(engine.read_field(&decoded, 4)?, b"000000000293");
//! # Ok::<(), iso8583_engine::Error>(())
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

pub(crate) use debug;
pub(crate) use trace;

pub mod bcd;
pub mod bitmap;
pub mod decoder;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod fields;
pub mod presets;
pub mod record;
pub mod schema;

// Re-export main types
pub use bitmap::Bitmap;
pub use decoder::WireCursor;
pub use encoder::WireEncoder;
pub use engine::Engine;
pub use error::{Error, Result};
pub use record::{FieldSlot, MessageRecord, MAX_FIELD_LENGTH, MTI_LEN, RECORD_CAPACITY};
pub use schema::{BitmapMode, DigitPolicy, FieldFormat, FieldType, Schema};
