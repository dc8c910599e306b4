#![no_main]

use libfuzzer_sys::fuzz_target;
use eiflow_decoder::FlowDecoder;

// Fuzz target: flowData text through base64, decompression and decode.
//
// Input format:
//   byte 0:   compressed flag (low bit)
//   bytes 1..: flowData text (lossy UTF-8)
//
// The limit is kept small so inflating streams hit the bomb check.
fuzz_target!(|data: &[u8]| {
    let Some((&flag, rest)) = data.split_first() else {
        return;
    };
    let text = String::from_utf8_lossy(rest);
    let mut decoder = FlowDecoder::with_limit(1 << 20);
    let _ = decoder.decode_flow_data(&text, flag & 1 == 1);
});
