/// Implementation of `eiflow decode`.
///
/// Builds a decompress processor over a four-attribute input stream,
/// feeds it every envelope of the input file as one chunk, and prints one
/// JSON object per output row, keyed by output attribute name.
///
/// ```text
/// envelopes.json ─▶ StreamEvent[] ─▶ DecompressProcessor ─▶ rows ─▶ stdout
/// ```
///
/// An envelope without `timestamp` is stamped with the current time.
use std::fs;
use std::io::{self, Write as _};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use eiflow_driver::{
    AttributeType, AttributeValue, DecompressProcessor, DefinitionSource, ProcessorConfig,
    StreamDefinition, StreamEvent,
};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::DecodeArgs;

const INPUT_ATTRIBUTES: [(&str, AttributeType); 4] = [
    ("meta_compressed", AttributeType::Bool),
    ("meta_tenantId", AttributeType::Int),
    ("messageId", AttributeType::String),
    ("flowData", AttributeType::String),
];

/// One element of the input array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeJson {
    compressed: bool,
    tenant_id: i32,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    flow_data: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
}

impl EnvelopeJson {
    fn into_event(self, now: i64) -> StreamEvent {
        StreamEvent::new(
            self.timestamp.unwrap_or(now),
            vec![
                self.compressed.into(),
                self.tenant_id.into(),
                self.message_id.map_or(AttributeValue::Null, AttributeValue::from),
                self.flow_data.map_or(AttributeValue::Null, AttributeValue::from),
            ],
        )
    }
}

/// Run the `eiflow decode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, the processor
/// cannot be configured, or any envelope fails to decode.
pub fn run(args: &DecodeArgs, mut config: ProcessorConfig) -> Result<()> {
    if let Some(path) = &args.definition {
        config.definition = DefinitionSource::File(path.clone());
    }
    if let Some(layout) = &args.layout {
        config.event_layout = Some(parse_layout(layout));
    }

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let envelopes: Vec<EnvelopeJson> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON envelope array", args.input.display()))?;

    let input = INPUT_ATTRIBUTES
        .iter()
        .fold(StreamDefinition::new("envelopes"), |def, (name, ty)| {
            def.attribute(name, *ty)
        });
    let arguments = INPUT_ATTRIBUTES.map(|(name, _)| name);
    let mut processor = DecompressProcessor::initialize(&config, &input, &arguments)
        .context("cannot configure decompress processor")?;

    let now = now_millis();
    let chunk: Vec<StreamEvent> = envelopes
        .into_iter()
        .map(|envelope| envelope.into_event(now))
        .collect();
    debug!(input = %args.input.display(), envelopes = chunk.len(), "decoding envelope chunk");

    let mut output = Vec::new();
    processor
        .process(&chunk, &mut |batch: Vec<StreamEvent>| output.extend(batch))
        .with_context(|| format!("failed to decode {}", args.input.display()))?;

    let names: Vec<&str> = processor.output_attributes().map(|(name, _)| name).collect();
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for event in &output {
        let row: IndexMap<&str, &AttributeValue> =
            names.iter().copied().zip(&event.output).collect();
        let line = if args.pretty {
            serde_json::to_string_pretty(&row)?
        } else {
            serde_json::to_string(&row)?
        };
        writeln!(handle, "{line}").context("cannot write to stdout")?;
    }

    info!(rows = output.len(), "decode finished");
    processor.shutdown();
    Ok(())
}

fn parse_layout(s: &str) -> Vec<String> {
    s.split(',').map(|name| name.trim().to_string()).collect()
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or_default()
}
