//! Shared fixtures for the integration tests and benches.
//!
//! The flows built here follow the bundled output definition: every event
//! record carries one value per bundled field, in definition order, and
//! the payload records carry the large per-component fields.

use eiflow_driver::{
    AttributeType, AttributeValue, DecompressProcessor, DefinitionSource, ProcessorConfig,
    StreamDefinition, StreamEvent,
};
use eiflow_encoder::{Compression, FlowEncoder};
use eiflow_types::{PayloadRecord, Value};

/// Processor arguments, in input stream order.
pub const ARGUMENTS: [&str; 4] = ["meta_compressed", "meta_tenantId", "messageId", "flowData"];

/// The input stream an analytics receiver declares for flow envelopes.
#[must_use]
pub fn input_stream() -> StreamDefinition {
    StreamDefinition::new("esbFlowStream")
        .attribute("meta_compressed", AttributeType::Bool)
        .attribute("meta_tenantId", AttributeType::Int)
        .attribute("messageId", AttributeType::String)
        .attribute("flowData", AttributeType::String)
}

/// A processor over [`input_stream`] using `definition`.
///
/// # Panics
///
/// If `definition` does not parse.
#[must_use]
pub fn processor(definition: DefinitionSource) -> DecompressProcessor {
    let config = ProcessorConfig {
        context: "it".to_string(),
        definition,
        ..ProcessorConfig::default()
    };
    DecompressProcessor::initialize(&config, &input_stream(), &ARGUMENTS)
        .unwrap_or_else(|e| panic!("processor init failed: {e}"))
}

/// Positional event record for component `index` of flow `flow_id`,
/// laid out like the bundled definition.
#[must_use]
pub fn esb_event(flow_id: &str, index: i32) -> Vec<Value> {
    let start = 1_700_000_000_000 + i64::from(index) * 10;
    vec![
        flow_id.into(),
        "esb-node-1".into(),
        format!("hash-{index}").into(),
        format!("Component{index}").into(),
        Value::from(if index == 0 { "Proxy" } else { "Mediator" }),
        index.into(),
        format!("{flow_id}@{index}").into(),
        start.into(),
        (start + 7).into(),
        7_i64.into(),
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
        "StockQuoteProxy".into(),
        "hash-0".into(),
        Value::Int(0),
        Value::Int(-1),
        0_i64.into(),
    ]
}

/// Payload record carrying the bulky fields of one component.
#[must_use]
pub fn esb_payload(index: i32) -> PayloadRecord {
    PayloadRecord::new()
        .with("beforePayload", format!("<soapenv:Body><getQuote id=\"{index}\"/></soapenv:Body>"))
        .with("afterPayload", format!("<soapenv:Body><quote id=\"{index}\"/></soapenv:Body>"))
        .with(
            "transportPropertyMap",
            Value::List(vec!["Content-Type".into(), "text/xml".into()]),
        )
        .with("children", format!("[{}]", index + 1))
}

/// A flow of `components` components shaped like real ESB traffic.
#[must_use]
pub fn esb_flow(flow_id: &str, components: i32) -> FlowEncoder {
    let mut encoder = FlowEncoder::new("esb-node-1");
    for index in 0..components {
        encoder
            .add_event(esb_event(flow_id, index))
            .with_payload(esb_payload(index));
    }
    encoder
}

/// An input event carrying `encoder`'s flow.
///
/// # Panics
///
/// If the flow does not encode.
#[must_use]
pub fn envelope(
    encoder: &FlowEncoder,
    compression: Compression,
    tenant_id: i32,
    timestamp: i64,
) -> StreamEvent {
    let flow_data = encoder
        .encode_flow_data(compression)
        .unwrap_or_else(|e| panic!("encode failed: {e}"));
    envelope_text(compression.is_compressed(), tenant_id, &flow_data, timestamp)
}

/// An input event carrying `flow_data` verbatim.
#[must_use]
pub fn envelope_text(
    compressed: bool,
    tenant_id: i32,
    flow_data: &str,
    timestamp: i64,
) -> StreamEvent {
    StreamEvent::new(
        timestamp,
        vec![
            compressed.into(),
            tenant_id.into(),
            "urn:uuid:m1".into(),
            AttributeValue::from(flow_data),
        ],
    )
}

/// Lowercase hex of `bytes`, for byte-level assertions.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
