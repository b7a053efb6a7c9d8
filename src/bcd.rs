//! Packed binary-coded decimal (BCD) conversions
//!
//! Two digits per byte, high nibble first. Nibbles 10..=15 are carried as the
//! extended hex digits `A`..`F`, which is how track data separators and the
//! PAN filler travel on the wire. Length prefixes use the same packing with
//! decimal digits only.

use crate::error::{Error, Result};
use crate::schema::DigitPolicy;

/// Maximum width in bytes of a BCD-encoded length
pub const MAX_BCD_LENGTH_BYTES: usize = 10;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Unpack BCD bytes into ASCII hex digits
///
/// Writes exactly `ascii.len()` characters, two per input byte. An odd count
/// consumes only the high nibble of the last byte. Returns the number of
/// characters written, or `Error::UnexpectedEof` if `bcd` holds fewer than
/// `ceil(ascii.len() / 2)` bytes.
#[inline]
pub fn bcd_to_ascii(bcd: &[u8], ascii: &mut [u8]) -> Result<usize> {
    let count = ascii.len();
    if bcd.len() < count.div_ceil(2) {
        return Err(Error::UnexpectedEof);
    }

    for (i, out) in ascii.iter_mut().enumerate() {
        let byte = bcd[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        *out = HEX_DIGITS[nibble as usize];
    }

    Ok(count)
}

/// Pack ASCII hex digits into BCD bytes
///
/// `ascii` must hold an even number of characters; `0-9`, `a-f` and `A-F`
/// are accepted. Under [`DigitPolicy::Lenient`] any other character packs as
/// nibble 0, under [`DigitPolicy::Strict`] it fails with
/// `Error::InvalidDigit`. Nothing is written on failure.
#[inline]
pub fn ascii_to_bcd(ascii: &[u8], bcd: &mut [u8], policy: DigitPolicy) -> Result<usize> {
    if ascii.len() % 2 != 0 {
        return Err(Error::OddDigitCount);
    }

    let count = ascii.len() / 2;
    if bcd.len() < count {
        return Err(Error::BufferTooSmall);
    }

    if policy == DigitPolicy::Strict && ascii.iter().any(|&c| hex_value(c).is_none()) {
        return Err(Error::InvalidDigit);
    }

    for (out, pair) in bcd.iter_mut().zip(ascii.chunks_exact(2)) {
        let high = hex_value(pair[0]).unwrap_or(0);
        let low = hex_value(pair[1]).unwrap_or(0);
        *out = (high << 4) | low;
    }

    Ok(count)
}

/// Decode a BCD length prefix of `bcd.len()` bytes (two decimal digits each)
#[inline]
pub fn bcd_to_length(bcd: &[u8]) -> Result<u64> {
    if bcd.is_empty() || bcd.len() > MAX_BCD_LENGTH_BYTES {
        return Err(Error::InvalidBcdLength);
    }

    let mut length = 0u64;
    for &byte in bcd {
        let pair = u64::from(byte >> 4) * 10 + u64::from(byte & 0x0F);
        length = length
            .checked_mul(100)
            .and_then(|l| l.checked_add(pair))
            .ok_or(Error::Overflow)?;
    }

    Ok(length)
}

/// Encode `length` as a left zero-padded BCD prefix filling all of `bcd`
///
/// Returns the number of bytes written, or `Error::Overflow` if the value
/// needs more than `2 * bcd.len()` decimal digits.
#[inline]
pub fn length_to_bcd(length: u64, bcd: &mut [u8]) -> Result<usize> {
    if bcd.is_empty() || bcd.len() > MAX_BCD_LENGTH_BYTES {
        return Err(Error::InvalidBcdLength);
    }

    let mut value = length;
    for out in bcd.iter_mut().rev() {
        let pair = (value % 100) as u8;
        *out = ((pair / 10) << 4) | (pair % 10);
        value /= 100;
    }

    if value != 0 {
        return Err(Error::Overflow);
    }

    Ok(bcd.len())
}

#[inline]
const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_bcd_roundtrip() {
        let mut packed = [0u8; 4];
        assert_eq!(
            ascii_to_bcd(b"12ab9F0d", &mut packed, DigitPolicy::Lenient),
            Ok(4)
        );
        assert_eq!(packed, [0x12, 0xAB, 0x9F, 0x0D]);

        let mut ascii = [0u8; 8];
        assert_eq!(bcd_to_ascii(&packed, &mut ascii), Ok(8));
        assert_eq!(&ascii, b"12AB9F0D");
    }

    #[test]
    fn test_bcd_to_ascii_odd_count() {
        let mut ascii = [0u8; 3];
        bcd_to_ascii(&[0x02, 0x10], &mut ascii).unwrap();
        assert_eq!(&ascii, b"021");
    }

    #[test]
    fn test_bcd_to_ascii_short_input() {
        let mut ascii = [0u8; 5];
        assert_eq!(bcd_to_ascii(&[0x12, 0x34], &mut ascii), Err(Error::UnexpectedEof));
    }

    #[test]
    fn test_lenient_invalid_digit_packs_zero() {
        let mut packed = [0xFFu8; 2];
        ascii_to_bcd(b"1 Z9", &mut packed, DigitPolicy::Lenient).unwrap();
        assert_eq!(packed, [0x10, 0x09]);
    }

    #[test]
    fn test_strict_invalid_digit() {
        let mut packed = [0xEEu8; 2];
        assert_eq!(
            ascii_to_bcd(b"12G4", &mut packed, DigitPolicy::Strict),
            Err(Error::InvalidDigit)
        );
        // Untouched on failure
        assert_eq!(packed, [0xEE, 0xEE]);
    }

    #[test]
    fn test_ascii_to_bcd_errors() {
        let mut packed = [0u8; 1];
        assert_eq!(
            ascii_to_bcd(b"123", &mut packed, DigitPolicy::Lenient),
            Err(Error::OddDigitCount)
        );
        assert_eq!(
            ascii_to_bcd(b"1234", &mut packed, DigitPolicy::Lenient),
            Err(Error::BufferTooSmall)
        );
    }

    #[test]
    fn test_length_roundtrip() {
        let cases: [(u64, usize); 6] = [(0, 1), (7, 1), (99, 1), (100, 2), (999, 2), (9999, 2)];

        for (value, width) in cases {
            let mut buf = [0u8; MAX_BCD_LENGTH_BYTES];
            let written = length_to_bcd(value, &mut buf[..width]).unwrap();
            assert_eq!(written, width);
            assert_eq!(bcd_to_length(&buf[..width]), Ok(value));
        }
    }

    #[test]
    fn test_length_encoding_layout() {
        let mut one = [0u8; 1];
        length_to_bcd(19, &mut one).unwrap();
        assert_eq!(one, [0x19]);

        let mut two = [0u8; 2];
        length_to_bcd(320, &mut two).unwrap();
        assert_eq!(two, [0x03, 0x20]);
    }

    #[test]
    fn test_length_overflow() {
        let mut one = [0u8; 1];
        assert_eq!(length_to_bcd(100, &mut one), Err(Error::Overflow));
    }

    #[test]
    fn test_length_width_bounds() {
        assert_eq!(bcd_to_length(&[]), Err(Error::InvalidBcdLength));
        assert_eq!(bcd_to_length(&[0u8; 11]), Err(Error::InvalidBcdLength));

        let mut wide = [0u8; 11];
        assert_eq!(length_to_bcd(1, &mut wide), Err(Error::InvalidBcdLength));

        assert_eq!(bcd_to_length(&[0x99; 9]), Ok(999_999_999_999_999_999));
        // Twenty nines do not fit in a u64
        assert_eq!(bcd_to_length(&[0x99; 10]), Err(Error::Overflow));
    }
}
