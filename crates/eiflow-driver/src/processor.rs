use std::sync::Arc;

use eiflow_decoder::FlowDecoder;
use tracing::{debug, info, warn};

use crate::config::ProcessorConfig;
use crate::emit::{EventSink, FanOut, ProcessingMode};
use crate::error::{ConfigError, EventError, ProcessError};
use crate::event::{InputBindings, StreamDefinition, StreamEvent};
use crate::expand::RowExpander;
use crate::layout::EventLayout;
use crate::schema::{AttributeType, OutputSchema};

/// Stream processor that unpacks aggregated ESB flows.
///
/// Each input event carries one compressed flow; each component event
/// inside it becomes one output event. The whole input chunk succeeds or
/// fails together.
///
/// ```text
/// StreamEvent ─▶ envelope ─▶ decode_flow_data ─▶ FlowStructure
///                                                     │
///        sink ◀── FanOut ◀── Vec<OutputRow> ◀── RowExpander
/// ```
///
/// The schema and layout are shared with forks; the decoder and the
/// pending batch are per worker.
#[derive(Debug)]
pub struct DecompressProcessor {
    context: String,
    bindings: InputBindings,
    expander: RowExpander,
    decoder: FlowDecoder,
    fan_out: FanOut,
}

impl DecompressProcessor {
    /// Resolve inputs, load the output schema and build the codec context.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]: unbound or mistyped input attributes, an
    /// unreadable or invalid definition, or a duplicate layout name.
    pub fn initialize(
        config: &ProcessorConfig,
        input: &StreamDefinition,
        arguments: &[&str],
    ) -> Result<Self, ConfigError> {
        let bindings = InputBindings::resolve(input, arguments)?;
        let schema = OutputSchema::load(&config.definition)?;
        let layout = match &config.event_layout {
            Some(names) => EventLayout::explicit(names.iter().cloned())?,
            None => EventLayout::default_for(&schema),
        };

        info!(
            context = %config.context,
            stream = %input.id,
            fields = schema.len(),
            layout = layout.len(),
            "decompress processor initialised"
        );

        Ok(Self {
            context: config.context.clone(),
            bindings,
            expander: RowExpander::new(Arc::new(schema), Arc::new(layout)),
            decoder: FlowDecoder::with_limit(config.max_decompressed),
            fan_out: FanOut::new(),
        })
    }

    /// Expand every event of `chunk` and hand the rows to `sink` in one
    /// batch. Returns the number of rows delivered.
    ///
    /// # Errors
    ///
    /// [`ProcessError`] for the first event that fails; nothing from the
    /// chunk reaches `sink` in that case.
    pub fn process(
        &mut self,
        chunk: &[StreamEvent],
        sink: &mut dyn EventSink,
    ) -> Result<usize, ProcessError> {
        for (event_index, event) in chunk.iter().enumerate() {
            if let Err(source) = self.process_event(event) {
                warn!(
                    context = %self.context,
                    event_index,
                    error = %source,
                    "dropping batch"
                );
                self.fan_out.discard();
                return Err(ProcessError {
                    context: self.context.clone(),
                    event_index,
                    source,
                });
            }
        }
        Ok(self.fan_out.flush(sink))
    }

    fn process_event(&mut self, event: &StreamEvent) -> Result<(), EventError> {
        let envelope = self.bindings.envelope(event)?;
        let flow = self
            .decoder
            .decode_flow_data(&envelope.flow_data, envelope.compressed)?;
        let rows = self
            .expander
            .expand(&flow, envelope.tenant_id, event.timestamp)?;

        debug!(
            context = %self.context,
            message_id = envelope.message_id.as_deref().unwrap_or("-"),
            host = %flow.host,
            rows = rows.len(),
            "expanded flow"
        );
        self.fan_out.emit(rows, event);
        Ok(())
    }

    /// Output attributes, in order: the definition's fields, then
    /// whichever of `metaTenantId`, `host` and `timestamp` it leaves out.
    pub fn output_attributes(&self) -> impl Iterator<Item = (&str, AttributeType)> {
        self.expander.output_attributes()
    }

    #[must_use]
    pub fn processing_mode(&self) -> ProcessingMode {
        ProcessingMode::Slide
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// A worker sharing this processor's schema and layout, with its own
    /// decoder.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            context: self.context.clone(),
            bindings: self.bindings.clone(),
            expander: self.expander.clone(),
            decoder: self.decoder.fork(),
            fan_out: FanOut::new(),
        }
    }

    /// Release the codec context. There is nothing to flush: a batch is
    /// either delivered or discarded before `process` returns.
    pub fn shutdown(self) {
        info!(context = %self.context, "decompress processor shut down");
    }
}

#[cfg(test)]
mod tests {
    use eiflow_encoder::{Compression, FlowEncoder};
    use eiflow_types::{PayloadRecord, Value};

    use super::*;
    use crate::config::DefinitionSource;
    use crate::emit::BatchCollector;
    use crate::value::AttributeValue;

    const ARGS: [&str; 4] = ["meta_compressed", "meta_tenantId", "messageId", "flowData"];

    fn input() -> StreamDefinition {
        StreamDefinition::new("inputStream")
            .attribute("meta_compressed", AttributeType::Bool)
            .attribute("meta_tenantId", AttributeType::Int)
            .attribute("messageId", AttributeType::String)
            .attribute("flowData", AttributeType::String)
    }

    fn processor(definition: &str) -> DecompressProcessor {
        let config = ProcessorConfig {
            context: "test-app".to_string(),
            definition: DefinitionSource::Inline(definition.to_string()),
            ..ProcessorConfig::default()
        };
        DecompressProcessor::initialize(&config, &input(), &ARGS).unwrap()
    }

    fn envelope(timestamp: i64, compression: Compression, encoder: &FlowEncoder) -> StreamEvent {
        let flow_data = encoder.encode_flow_data(compression).unwrap();
        StreamEvent::new(
            timestamp,
            vec![
                compression.is_compressed().into(),
                7.into(),
                "m1".into(),
                flow_data.into(),
            ],
        )
    }

    fn three_components() -> FlowEncoder {
        let mut encoder = FlowEncoder::new("esb-1");
        for name in ["a", "b", "c"] {
            encoder
                .add_event(vec![Value::from(name)])
                .with_payload(PayloadRecord::new().with("faultCount", 0));
        }
        encoder
    }

    #[test]
    fn expands_each_component() {
        let mut processor = processor("component:string\nfaultCount:int");
        let mut sink = BatchCollector::new();
        let event = envelope(100, Compression::Gzip, &three_components());

        assert_eq!(processor.process(&[event], &mut sink).unwrap(), 3);
        let outputs: Vec<_> = sink.events().map(|e| e.output.clone()).collect();
        assert_eq!(
            outputs[2],
            vec![
                AttributeValue::from("c"),
                AttributeValue::Int(0),
                AttributeValue::Int(7),
                AttributeValue::from("esb-1"),
                AttributeValue::Long(100),
            ]
        );
    }

    #[test]
    fn failing_event_discards_whole_chunk() {
        let mut processor = processor("component:string");
        let good = envelope(1, Compression::None, &three_components());
        let mut bad = good.clone();
        bad.data[3] = AttributeValue::from("");

        let mut sink = BatchCollector::new();
        let err = processor.process(&[good.clone(), bad], &mut sink).unwrap_err();
        assert_eq!(err.event_index, 1);
        assert_eq!(err.context, "test-app");
        assert!(sink.batches.is_empty());

        // The discarded rows do not leak into the next chunk.
        assert_eq!(processor.process(&[good], &mut sink).unwrap(), 3);
    }

    #[test]
    fn fork_shares_schema() {
        let processor = processor("component:string");
        let forked = processor.fork();
        assert!(Arc::ptr_eq(
            processor.expander.schema(),
            forked.expander.schema()
        ));
        assert_eq!(forked.context(), "test-app");
        assert_eq!(forked.processing_mode(), ProcessingMode::Slide);
        processor.shutdown();
    }

    #[test]
    fn output_attributes_follow_definition() {
        let processor = processor("b:long\na:string\nhost:string");
        let attrs: Vec<_> = processor.output_attributes().collect();
        assert_eq!(
            attrs,
            [
                ("b", AttributeType::Long),
                ("a", AttributeType::String),
                ("host", AttributeType::String),
                ("metaTenantId", AttributeType::Int),
                ("timestamp", AttributeType::Long),
            ]
        );
    }

    #[test]
    fn reordered_esb_definition_keeps_values_in_their_fields() {
        let mut encoder = FlowEncoder::new("esb-1");
        encoder.add_event(vec!["flow-1".into(), "esb-1".into(), "hash-9".into()]);
        let event = envelope(5, Compression::None, &encoder);

        let mut rows = Vec::new();
        for definition in [
            "messageFlowId:string\nhashCode:string",
            "hashCode:string\nmessageFlowId:string",
        ] {
            let mut processor = processor(definition);
            let mut sink = BatchCollector::new();
            processor.process(&[event.clone()], &mut sink).unwrap();
            let output = sink.events().next().unwrap().output.clone();
            let mut row: Vec<(String, AttributeValue)> = processor
                .output_attributes()
                .map(|(name, _)| name.to_string())
                .zip(output)
                .collect();
            row.sort_by(|a, b| a.0.cmp(&b.0));
            rows.push(row);
        }
        assert_eq!(rows[0], rows[1]);
        assert_eq!(rows[0][0], ("hashCode".to_string(), "hash-9".into()));
        assert!(rows[0].contains(&("messageFlowId".to_string(), "flow-1".into())));
    }

    #[test]
    fn missing_required_argument_fails_init() {
        let result = DecompressProcessor::initialize(
            &ProcessorConfig::default(),
            &input(),
            &["meta_compressed", "flowData"],
        );
        assert!(matches!(result, Err(ConfigError::MissingAttribute { .. })));
    }
}
