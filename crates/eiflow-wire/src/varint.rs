use crate::error::WireError;

/// Maximum number of bytes a u64 varint can occupy.
/// ceil(64 / 7) = 10 bytes.
pub const MAX_VARINT_BYTES: usize = 10;

/// Encode a `u64` value as an unsigned LEB128 varint into the provided buffer.
///
/// Returns the number of bytes written (1–10).
///
/// # Panics
///
/// Panics if `buf` is shorter than the required encoding length.
/// A [`MAX_VARINT_BYTES`] buffer is always sufficient.
///
/// | Value   | Encoded bytes        |
/// |---------|----------------------|
/// | 0       | `[0x00]`             |
/// | 127     | `[0x7F]`             |
/// | 128     | `[0x80, 0x01]`       |
/// | 113     | `[0x71]` (MAP tag)   |
/// | 335     | `[0xCF, 0x02]` (PAYLOAD tag) |
pub fn encode_varint(mut value: u64, buf: &mut [u8]) -> usize {
    let mut i = 0;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf[i] = byte;
        i += 1;
        if value == 0 {
            return i;
        }
    }
}

/// Append `value` as a varint to the end of `out`.
pub fn push_varint(out: &mut Vec<u8>, value: u64) {
    let mut scratch = [0u8; MAX_VARINT_BYTES];
    let n = encode_varint(value, &mut scratch);
    out.extend_from_slice(&scratch[..n]);
}

/// Decode an unsigned LEB128 varint from the front of `buf`.
///
/// Returns `(decoded_value, bytes_consumed)`. Offsets in errors are
/// relative to the start of `buf`.
///
/// # Errors
///
/// - [`WireError::VarintTooLong`] if ten bytes are consumed without a
///   terminating byte, or the tenth byte carries bits above bit 63.
/// - [`WireError::UnexpectedEof`] if the slice ends mid-varint.
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize), WireError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_VARINT_BYTES || (i == MAX_VARINT_BYTES - 1 && byte > 0x01) {
            return Err(WireError::VarintTooLong { offset: 0 });
        }

        result |= u64::from(byte & 0x7F) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(WireError::UnexpectedEof { offset: buf.len() })
}

/// Map a signed 64-bit integer onto an unsigned one so small magnitudes
/// stay short on the wire: 0 → 0, -1 → 1, 1 → 2, -2 → 3 …
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn zigzag_encode_i64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode_i64`].
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn zigzag_decode_i64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// 32-bit zigzag, widened to `u64` so it shares the varint writer.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn zigzag_encode_i32(value: i32) -> u64 {
    u64::from(((value << 1) ^ (value >> 31)) as u32)
}

/// Inverse of [`zigzag_encode_i32`]. Returns `None` when `value` does not
/// fit 32 bits.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn zigzag_decode_i32(value: u64) -> Option<i32> {
    let narrow = u32::try_from(value).ok()?;
    Some(((narrow >> 1) as i32) ^ -((narrow & 1) as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        push_varint(&mut out, value);
        out
    }

    #[test]
    fn single_byte_values() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(127), vec![0x7F]);
    }

    #[test]
    fn registration_tags_encode_as_expected() {
        // MAP (111) and LIST (222) are written as id + 2.
        assert_eq!(hex::encode(encode(113)), "71");
        assert_eq!(hex::encode(encode(224)), "e001");
        assert_eq!(hex::encode(encode(335)), "cf02");
    }

    #[test]
    fn u64_max_uses_ten_bytes() {
        let bytes = encode(u64::MAX);
        assert_eq!(bytes.len(), MAX_VARINT_BYTES);
        let (decoded, n) = decode_varint(&bytes).unwrap();
        assert_eq!(decoded, u64::MAX);
        assert_eq!(n, MAX_VARINT_BYTES);
    }

    #[test]
    fn decode_leaves_trailing_bytes_alone() {
        let (value, consumed) = decode_varint(&[0xAC, 0x02, 0xFF, 0xFF]).unwrap();
        assert_eq!(value, 300);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn decode_empty_input() {
        assert!(matches!(
            decode_varint(&[]),
            Err(WireError::UnexpectedEof { offset: 0 })
        ));
    }

    #[test]
    fn decode_truncated_varint() {
        assert!(matches!(
            decode_varint(&[0x80, 0x80]),
            Err(WireError::UnexpectedEof { offset: 2 })
        ));
    }

    #[test]
    fn decode_too_long() {
        assert!(matches!(
            decode_varint(&[0x80; 11]),
            Err(WireError::VarintTooLong { .. })
        ));
    }

    #[test]
    fn decode_rejects_bits_past_u64() {
        let mut buf = [0xFF; 10];
        buf[9] = 0x02;
        assert!(matches!(
            decode_varint(&buf),
            Err(WireError::VarintTooLong { .. })
        ));
    }

    #[test]
    fn zigzag_small_magnitudes_stay_small() {
        assert_eq!(zigzag_encode_i64(0), 0);
        assert_eq!(zigzag_encode_i64(-1), 1);
        assert_eq!(zigzag_encode_i64(1), 2);
        assert_eq!(zigzag_encode_i64(-2), 3);
        assert_eq!(zigzag_encode_i32(-1), 1);
        assert_eq!(zigzag_encode_i32(7), 14);
    }

    #[test]
    fn zigzag_extremes() {
        for v in [i64::MIN, -1, 0, 1, i64::MAX] {
            assert_eq!(zigzag_decode_i64(zigzag_encode_i64(v)), v);
        }
        for v in [i32::MIN, -1, 0, 1, i32::MAX] {
            assert_eq!(zigzag_decode_i32(zigzag_encode_i32(v)), Some(v));
        }
    }

    #[test]
    fn zigzag_i32_rejects_wide_values() {
        assert_eq!(zigzag_decode_i32(u64::from(u32::MAX) + 1), None);
    }
}
