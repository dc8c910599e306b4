/// Implementation of `eiflow inspect`.
///
/// Decodes one flow-data payload and prints its shape without applying a
/// schema.
///
/// # Output format
///
/// ```text
/// Flow: host="esb-node-1", 2 components
/// Component 0: 20 values, payload [beforePayload, faultCount]
/// Component 1: 20 values, payload []
/// ```
use std::fs;

use anyhow::{Context, Result};
use eiflow_decoder::FlowDecoder;
use eiflow_driver::ProcessorConfig;
use eiflow_types::FlowStructure;

use crate::InspectArgs;

/// Run the `eiflow inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the payload does not
/// decode to a flow.
pub fn run(args: &InspectArgs, config: &ProcessorConfig) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    let flow = FlowDecoder::with_limit(config.max_decompressed)
        .decode_flow_data(&text, args.compressed)
        .with_context(|| format!("failed to decode {}", args.file.display()))?;

    for line in summary(&flow) {
        println!("{line}");
    }
    Ok(())
}

fn summary(flow: &FlowStructure) -> Vec<String> {
    let mut lines = Vec::with_capacity(flow.len() + 1);
    lines.push(format!(
        "Flow: host={:?}, {} component{}",
        flow.host,
        flow.len(),
        if flow.len() == 1 { "" } else { "s" }
    ));
    for (idx, (event, payload)) in flow.components().enumerate() {
        let fields: Vec<&str> = payload.fields.keys().map(String::as_str).collect();
        lines.push(format!(
            "Component {idx}: {} values, payload [{}]",
            event.len(),
            fields.join(", ")
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use eiflow_types::{PayloadRecord, Value};

    use super::*;

    #[test]
    fn summary_lists_components() {
        let flow = FlowStructure {
            host: "h1".to_string(),
            events: vec![vec![Value::from("a"), Value::Int(1)]],
            payloads: vec![PayloadRecord::new().with("faultCount", 0)],
        };
        assert_eq!(
            summary(&flow),
            [
                r#"Flow: host="h1", 1 component"#,
                "Component 0: 2 values, payload [faultCount]",
            ]
        );
    }
}
