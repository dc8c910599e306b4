#![no_main]

use libfuzzer_sys::fuzz_target;
use eiflow_decoder::FlowDecoder;

// Fuzz target: structure bytes straight into the value reader.
//
// Catches bugs in:
// - Unknown or reserved type tags
// - Collection counts far larger than the input
// - Deep nesting (stack exhaustion)
// - Invalid UTF-8 in strings and keys
// - Flow shape checks on arbitrary trees
fuzz_target!(|data: &[u8]| {
    let mut decoder = FlowDecoder::new();
    let _ = decoder.decode(data);
});
