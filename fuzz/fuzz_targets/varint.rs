#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: decode_varint LEB128 codec.
//
// Catches bugs in:
// - VarintTooLong (>10 continuation bytes)
// - Zero-length input
// - Maximum value edge cases (u64::MAX)
// - Zigzag decoding of values wider than 32 bits
fuzz_target!(|data: &[u8]| {
    if let Ok((value, _)) = eiflow_wire::varint::decode_varint(data) {
        let _ = eiflow_wire::varint::zigzag_decode_i32(value);
        let _ = eiflow_wire::varint::zigzag_decode_i64(value);
    }
});
