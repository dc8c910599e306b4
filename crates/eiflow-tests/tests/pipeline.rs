//! End-to-end tests of the decompress processor and the tokenizer.
//!
//! Every test drives a processor the way a host pipeline does: input
//! events in, one batch of output events out through an `EventSink`.

use eiflow_driver::{
    AttributeType, AttributeValue, BatchCollector, DecompressProcessor, DefinitionSource,
    EntityTokenizer, EventError, OutputSchema, ProcessorConfig, StreamDefinition, StreamEvent,
};
use eiflow_encoder::{Compression, FlowEncoder};
use eiflow_tests::{ARGUMENTS, envelope, esb_flow, input_stream, processor};
use eiflow_types::{PayloadRecord, Value};

fn inline(definition: &str) -> DefinitionSource {
    DefinitionSource::Inline(definition.to_string())
}

fn outputs(sink: &BatchCollector) -> Vec<Vec<AttributeValue>> {
    sink.events().map(|e| e.output.clone()).collect()
}

// ── Decompress processor ─────────────────────────────────────────────────────

#[test]
fn single_component_scenario() {
    let mut encoder = FlowEncoder::new("h1");
    encoder.add_event(vec!["a".into()]);
    let event = envelope(&encoder, Compression::None, 7, 1234);

    let mut processor = processor(inline(
        "component:string\nmetaTenantId:int\nhost:string\ntimestamp:long",
    ));
    let mut sink = BatchCollector::new();
    assert_eq!(processor.process(&[event], &mut sink).unwrap(), 1);
    assert_eq!(
        outputs(&sink),
        [vec![
            AttributeValue::from("a"),
            AttributeValue::Int(7),
            AttributeValue::from("h1"),
            AttributeValue::Long(1234),
        ]]
    );
}

#[test]
fn single_field_definition_still_carries_injected_fields() {
    let mut encoder = FlowEncoder::new("h1");
    encoder.add_event(vec!["a".into()]);
    let event = envelope(&encoder, Compression::None, 7, 1234);

    let mut processor = processor(inline("component:string"));
    let mut sink = BatchCollector::new();
    assert_eq!(processor.process(&[event], &mut sink).unwrap(), 1);

    let names: Vec<_> = processor.output_attributes().map(|(n, _)| n).collect();
    assert_eq!(names, ["component", "metaTenantId", "host", "timestamp"]);
    assert_eq!(
        outputs(&sink),
        [vec![
            AttributeValue::from("a"),
            AttributeValue::Int(7),
            AttributeValue::from("h1"),
            AttributeValue::Long(1234),
        ]]
    );
}

#[test]
fn three_components_share_host_and_tenant() {
    let mut processor = processor(DefinitionSource::Bundled);
    let mut sink = BatchCollector::new();
    let event = envelope(&esb_flow("flow-1", 3), Compression::Gzip, -1234, 99);

    assert_eq!(processor.process(&[event.clone()], &mut sink).unwrap(), 3);
    assert_eq!(sink.batches.len(), 1);

    let names: Vec<_> = processor.output_attributes().map(|(n, _)| n).collect();
    let field = |row: &[AttributeValue], name: &str| {
        let idx = names.iter().position(|n| *n == name).unwrap();
        row[idx].clone()
    };
    for (index, row) in outputs(&sink).iter().enumerate() {
        assert_eq!(field(row, "host"), "esb-node-1".into());
        assert_eq!(field(row, "metaTenantId"), AttributeValue::Int(-1234));
        assert_eq!(field(row, "timestamp"), AttributeValue::Long(99));
        assert_eq!(
            field(row, "componentIndex"),
            AttributeValue::Int(i32::try_from(index).unwrap())
        );
        assert_eq!(field(row, "children"), format!("[{}]", index + 1).into());
    }
    // Output events keep the input event's attributes.
    assert!(sink.events().all(|e| e.data == event.data));
}

#[test]
fn bundled_schema_coerces_composite_payload_fields_to_text() {
    let mut processor = processor(DefinitionSource::Bundled);
    let mut sink = BatchCollector::new();
    let event = envelope(&esb_flow("flow-1", 1), Compression::Zstd, 1, 1);
    processor.process(&[event], &mut sink).unwrap();

    let names: Vec<_> = processor.output_attributes().map(|(n, _)| n).collect();
    let idx = names.iter().position(|n| *n == "transportPropertyMap").unwrap();
    assert_eq!(
        outputs(&sink)[0][idx],
        AttributeValue::from(r#"["Content-Type","text/xml"]"#)
    );
}

#[test]
fn gzip_and_zstd_envelopes_expand_identically() {
    let encoder = esb_flow("flow-9", 4);
    let mut rows = Vec::new();
    for compression in [Compression::None, Compression::Gzip, Compression::Zstd] {
        let mut processor = processor(DefinitionSource::Bundled);
        let mut sink = BatchCollector::new();
        processor
            .process(&[envelope(&encoder, compression, 5, 5)], &mut sink)
            .unwrap();
        rows.push(outputs(&sink));
    }
    assert_eq!(rows[0], rows[1]);
    assert_eq!(rows[1], rows[2]);
}

#[test]
fn chunk_of_envelopes_is_one_batch_in_order() {
    // messageFlowId is the first bundled field.
    let mut processor = processor(DefinitionSource::Bundled);
    let chunk: Vec<StreamEvent> = ["f1", "f2", "f3"]
        .iter()
        .zip(1..)
        .map(|(id, n)| envelope(&esb_flow(id, n), Compression::Gzip, 1, 0))
        .collect();

    let mut sink = BatchCollector::new();
    assert_eq!(processor.process(&chunk, &mut sink).unwrap(), 6);
    assert_eq!(sink.batches.len(), 1);
    let ids: Vec<String> = sink.events().map(|e| e.output[0].to_string()).collect();
    assert_eq!(ids, ["f1", "f2", "f2", "f3", "f3", "f3"]);
}

#[test]
fn failing_event_means_sink_receives_nothing() {
    let mut processor = processor(DefinitionSource::Bundled);
    let good = envelope(&esb_flow("ok", 2), Compression::Gzip, 1, 0);
    let mut bad = good.clone();
    bad.data[3] = AttributeValue::from("not base64 !!");
    bad.data[0] = AttributeValue::Bool(false);

    let mut sink = BatchCollector::new();
    let err = processor
        .process(&[good.clone(), good, bad], &mut sink)
        .unwrap_err();
    assert_eq!(err.event_index, 2);
    assert_eq!(err.context, "it");
    assert!(matches!(err.source, EventError::Decompress(_)));
    assert!(sink.batches.is_empty());
}

#[test]
fn explicit_layout_survives_definition_reorder() {
    let mut encoder = FlowEncoder::new("h");
    encoder
        .add_event(vec!["id-1".into(), "Proxy".into(), Value::Int(4)])
        .with_payload(PayloadRecord::new().with("faultCount", 1));

    let mut rows = Vec::new();
    for definition in [
        "id:string\nkind:string\nindex:int\nfaultCount:int",
        "faultCount:int\nindex:int\nid:string\nkind:string",
    ] {
        let config = ProcessorConfig {
            definition: inline(definition),
            event_layout: Some(vec!["id".into(), "kind".into(), "index".into()]),
            ..ProcessorConfig::default()
        };
        let mut processor =
            DecompressProcessor::initialize(&config, &input_stream(), &ARGUMENTS).unwrap();
        let mut sink = BatchCollector::new();
        processor
            .process(&[envelope(&encoder, Compression::None, 1, 0)], &mut sink)
            .unwrap();

        let mut by_name: Vec<(String, AttributeValue)> = processor
            .output_attributes()
            .map(|(n, _)| n.to_string())
            .zip(outputs(&sink).remove(0))
            .collect();
        by_name.sort_by(|a, b| a.0.cmp(&b.0));
        rows.push(by_name);
    }
    assert_eq!(rows[0], rows[1]);
    assert_eq!(rows[0][0], ("faultCount".to_string(), AttributeValue::Int(1)));
}

#[test]
fn reversed_bundled_definition_maps_values_by_name() {
    let schema = OutputSchema::bundled().unwrap();
    let forward: String = schema
        .attributes()
        .map(|(name, ty)| format!("{name}:{ty}\n"))
        .collect();
    let reversed: String = forward.lines().rev().map(|line| format!("{line}\n")).collect();
    let event = envelope(&esb_flow("flow-r", 2), Compression::Gzip, 3, 30);

    let mut rows = Vec::new();
    for definition in [forward, reversed] {
        let mut processor = processor(inline(&definition));
        let mut sink = BatchCollector::new();
        processor.process(&[event.clone()], &mut sink).unwrap();

        let mut by_name: Vec<(String, AttributeValue)> = processor
            .output_attributes()
            .map(|(n, _)| n.to_string())
            .zip(outputs(&sink).remove(1))
            .collect();
        by_name.sort_by(|a, b| a.0.cmp(&b.0));
        rows.push(by_name);
    }
    assert_eq!(rows[0], rows[1]);
    assert!(rows[0].contains(&("hashCode".to_string(), "hash-1".into())));
    assert!(rows[0].contains(&("componentIndex".to_string(), AttributeValue::Int(1))));
}

#[test]
fn forked_workers_produce_identical_rows() {
    let primary = processor(DefinitionSource::Bundled);
    let chunk = [envelope(&esb_flow("flow-f", 3), Compression::Gzip, 2, 2)];

    let mut results = Vec::new();
    for mut worker in [primary.fork(), primary.fork()] {
        let mut sink = BatchCollector::new();
        worker.process(&chunk, &mut sink).unwrap();
        results.push(outputs(&sink));
        worker.shutdown();
    }
    assert_eq!(results[0], results[1]);
    primary.shutdown();
}

// ── Tokenizer ────────────────────────────────────────────────────────────────

fn tokenize(values: &[AttributeValue]) -> Vec<String> {
    let input = StreamDefinition::new("tweets").attribute("entities", AttributeType::String);
    let mut tokenizer = EntityTokenizer::initialize("tok", &input, &["entities"]).unwrap();
    let chunk: Vec<_> = values
        .iter()
        .map(|v| StreamEvent::new(0, vec![v.clone()]))
        .collect();
    let mut sink = BatchCollector::new();
    tokenizer.process(&chunk, &mut sink).unwrap();
    sink.events().map(|e| e.output[0].to_string()).collect()
}

#[test]
fn tokenizer_splits_entities() {
    assert_eq!(tokenize(&["a,b,c".into()]), ["a", "b", "c"]);
}

#[test]
fn tokenizer_skips_null_literal() {
    assert!(tokenize(&["null".into()]).is_empty());
    assert!(tokenize(&[AttributeValue::Null]).is_empty());
}

#[test]
fn tokenizer_keeps_inner_empty_tokens() {
    assert_eq!(tokenize(&["#rust,,#wso2,".into()]), ["#rust", "", "#wso2"]);
}
