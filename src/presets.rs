//! Predefined field format tables
//!
//! Deployments normally define their own table; these match common
//! terminal-to-acquirer layouts and serve as a starting point.

use crate::error::Result;
use crate::schema::{BitmapMode, FieldFormat, Schema};

/// 64-field POS terminal layout
///
/// Entry `i` describes field `i + 1`.
pub const POS_64: [FieldFormat; 64] = [
    FieldFormat::binary(64),    //  1 secondary bitmap
    FieldFormat::var_bcd(19),   //  2 primary account number
    FieldFormat::bcd(6),        //  3 processing code
    FieldFormat::bcd(12),       //  4 transaction amount
    FieldFormat::bcd(12),       //  5
    FieldFormat::bcd(12),       //  6
    FieldFormat::bcd(10),       //  7
    FieldFormat::ascii(1),      //  8
    FieldFormat::bcd(8),        //  9
    FieldFormat::bcd(8),        // 10
    FieldFormat::bcd(6),        // 11 system trace audit number
    FieldFormat::bcd(6),        // 12 local time
    FieldFormat::bcd(4),        // 13 local date
    FieldFormat::bcd(4),        // 14 expiration date
    FieldFormat::bcd(4),        // 15 settlement date
    FieldFormat::ascii(1),      // 16
    FieldFormat::bcd(4),        // 17
    FieldFormat::bcd(5),        // 18
    FieldFormat::bcd(3),        // 19
    FieldFormat::bcd(3),        // 20
    FieldFormat::ascii(7),      // 21
    FieldFormat::bcd(3),        // 22 POS entry mode
    FieldFormat::bcd(3),        // 23 card sequence number
    FieldFormat::ascii(2),      // 24 NII
    FieldFormat::bcd(2),        // 25
    FieldFormat::bcd(2),        // 26
    FieldFormat::bcd(1),        // 27
    FieldFormat::bcd(8),        // 28
    FieldFormat::bcd(8),        // 29
    FieldFormat::bcd(8),        // 30
    FieldFormat::bcd(8),        // 31
    FieldFormat::var_bcd(11),   // 32 acquiring institution
    FieldFormat::var_bcd(11),   // 33
    FieldFormat::var_bcd(28),   // 34
    FieldFormat::var_bcd(37),   // 35 track 2
    FieldFormat::var_bcd(104),  // 36 track 3
    FieldFormat::ascii(12),     // 37 retrieval reference number
    FieldFormat::ascii(6),      // 38 authorization id
    FieldFormat::ascii(2),      // 39 response code
    FieldFormat::ascii(3),      // 40
    FieldFormat::ascii(8),      // 41 terminal id
    FieldFormat::ascii(15),     // 42 merchant id
    FieldFormat::ascii(40),     // 43 merchant name
    FieldFormat::var_ascii(25), // 44
    FieldFormat::var_ascii(76), // 45 track 1
    FieldFormat::var_ascii(999), // 46
    FieldFormat::var_ascii(999), // 47
    FieldFormat::var_bcd(999),  // 48
    FieldFormat::ascii(3),      // 49 transaction currency
    FieldFormat::ascii(3),      // 50
    FieldFormat::ascii(3),      // 51
    FieldFormat::binary(64),    // 52 PIN block
    FieldFormat::bcd(16),       // 53 security control
    FieldFormat::var_ascii(320), // 54
    FieldFormat::var_ascii(999), // 55 ICC data
    FieldFormat::var_ascii(999), // 56
    FieldFormat::var_ascii(999), // 57
    FieldFormat::var_ascii(999), // 58
    FieldFormat::var_ascii(999), // 59
    FieldFormat::var_bcd(999),  // 60 reserved private
    FieldFormat::var_bcd(999),  // 61 reserved private
    FieldFormat::var_ascii(999), // 62 reserved private
    FieldFormat::var_ascii(999), // 63 reserved private
    FieldFormat::binary(64),    // 64 MAC
];

/// [`POS_64`] as a primary-bitmap schema with default policy
pub fn pos_64_schema() -> Result<Schema> {
    Schema::new(BitmapMode::Primary, &POS_64)
}
