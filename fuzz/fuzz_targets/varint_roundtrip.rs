#![no_main]

use libfuzzer_sys::fuzz_target;
use eiflow_wire::varint::{decode_varint, encode_varint, zigzag_decode_i64, zigzag_encode_i64};

// Fuzz target: varint and zigzag encode->decode roundtrip.
//
// Takes 8 bytes of fuzz input as an i64, zigzag-encodes it, writes it
// as a LEB128 varint, then reads it back and asserts the value matches.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let value = i64::from_le_bytes(data[..8].try_into().unwrap());

    let mut buf = [0u8; 10];
    let encoded_len = encode_varint(zigzag_encode_i64(value), &mut buf);

    let (decoded, decoded_len) = decode_varint(&buf[..encoded_len]).unwrap();
    assert_eq!(zigzag_decode_i64(decoded), value);
    assert_eq!(decoded_len, encoded_len);
});
