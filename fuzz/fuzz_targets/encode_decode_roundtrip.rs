#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use eiflow_decoder::FlowDecoder;
use eiflow_encoder::{Compression, FlowEncoder};
use eiflow_types::{PayloadRecord, Value};

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Text(String),
    Strings(Vec<String>),
}

impl FuzzValue {
    fn into_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(v) => Value::Bool(v),
            Self::Int(v) => Value::Int(v),
            Self::Long(v) => Value::Long(v),
            Self::Text(v) => Value::String(v),
            Self::Strings(v) => Value::List(v.into_iter().map(Value::String).collect()),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzComponent {
    event: Vec<FuzzValue>,
    payload: Vec<(String, FuzzValue)>,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    host: String,
    components: Vec<FuzzComponent>,
    compression_id: u8,
}

// Fuzz target: FlowEncoder -> FlowDecoder roundtrip.
//
// Builds a flow from structured input, encodes it with one of the three
// compressions, decodes it and asserts the decoded flow equals what was
// encoded. Floats are left out so NaN does not break equality.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(input) = FuzzInput::arbitrary(&mut u) else {
        return;
    };

    let mut encoder = FlowEncoder::new(&input.host);
    for component in input.components.into_iter().take(32) {
        let mut payload = PayloadRecord::new();
        for (name, value) in component.payload {
            payload.insert(name, value.into_value());
        }
        encoder
            .add_event(component.event.into_iter().map(FuzzValue::into_value).collect())
            .with_payload(payload);
    }

    let compression = match input.compression_id % 3 {
        0 => Compression::None,
        1 => Compression::Gzip,
        _ => Compression::Zstd,
    };
    let expected = FlowDecoder::new().decode(&encoder.encode().unwrap()).unwrap();
    let flow_data = encoder.encode_flow_data(compression).unwrap();
    let decoded = FlowDecoder::new()
        .decode_flow_data(&flow_data, compression.is_compressed())
        .unwrap();
    assert_eq!(decoded, expected);
    assert_eq!(decoded.len(), encoder.len());
});
