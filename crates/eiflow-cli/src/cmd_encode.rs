/// Implementation of `eiflow encode`.
///
/// Reads a JSON manifest, converts every JSON value to a flow [`Value`],
/// and writes the base64 flow-data text.
///
/// # JSON to value mapping
///
/// ```text
/// ┌────────────────────┬──────────────────────────────────┐
/// │ JSON               │ Value                            │
/// ├────────────────────┼──────────────────────────────────┤
/// │ null               │ Null                             │
/// │ true / false       │ Bool                             │
/// │ integer in i32     │ Int                              │
/// │ other integer      │ Long                             │
/// │ fraction           │ Double                           │
/// │ string             │ String                           │
/// │ array              │ List                             │
/// │ object             │ Map (payload records: Payload)   │
/// └────────────────────┴──────────────────────────────────┘
/// ```
use std::fs;
use std::io::{self, Write as _};

use anyhow::{Context, Result, anyhow, bail};
use eiflow_encoder::{Compression, FlowEncoder};
use eiflow_types::{PayloadRecord, Value};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::EncodeArgs;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    host: String,
    #[serde(default)]
    events: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    payloads: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Run the `eiflow encode` command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or parsed, holds more
/// payload records than events, uses an unknown `--compress` value, or
/// the output cannot be written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let compression = parse_compression(&args.compress)?;
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let manifest: Manifest = serde_json::from_str(&text)
        .with_context(|| format!("invalid manifest {}", args.input.display()))?;

    let encoder = build_encoder(manifest)?;
    let flow_data = encoder
        .encode_flow_data(compression)
        .context("failed to encode flow")?;
    debug!(
        components = encoder.len(),
        ?compression,
        chars = flow_data.len(),
        "encoded flow"
    );

    if let Some(path) = &args.output {
        fs::write(path, flow_data.as_bytes())
            .with_context(|| format!("cannot write {}", path.display()))?;
        eprintln!(
            "wrote {} ({} components, {} chars)",
            path.display(),
            encoder.len(),
            flow_data.len()
        );
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{flow_data}").context("cannot write to stdout")?;
    }
    Ok(())
}

fn build_encoder(manifest: Manifest) -> Result<FlowEncoder> {
    if manifest.payloads.len() > manifest.events.len() {
        bail!(
            "manifest has {} payloads for {} events",
            manifest.payloads.len(),
            manifest.events.len()
        );
    }

    let mut encoder = FlowEncoder::new(&manifest.host);
    let mut payloads = manifest.payloads.into_iter();
    for event in manifest.events {
        encoder.add_event(event.into_iter().map(json_to_value).collect());
        if let Some(fields) = payloads.next() {
            let record: IndexMap<String, Value> = fields
                .into_iter()
                .map(|(name, value)| (name, json_to_value(value)))
                .collect();
            encoder.with_payload(PayloadRecord::from(record));
        }
    }
    Ok(encoder)
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).map_or(Value::Long(i), Value::Int),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(fields) => Value::Map(
            fields
                .into_iter()
                .map(|(name, value)| (name, json_to_value(value)))
                .collect(),
        ),
    }
}

/// Parses the `--compress` string to a [`Compression`].
///
/// # Errors
///
/// Returns an error for unrecognised names.
fn parse_compression(s: &str) -> Result<Compression> {
    match s.to_lowercase().as_str() {
        "gzip" | "gz" => Ok(Compression::Gzip),
        "zstd" | "zst" => Ok(Compression::Zstd),
        "none" => Ok(Compression::None),
        _ => Err(anyhow!("unknown compression {s:?}, expected gzip|zstd|none")),
    }
}

#[cfg(test)]
mod tests {
    use eiflow_decoder::FlowDecoder;

    use super::*;

    #[test]
    fn numbers_pick_narrowest_type() {
        let v = json_to_value(serde_json::json!([1, 3_000_000_000_i64, 1.5]));
        assert_eq!(
            v,
            Value::List(vec![Value::Int(1), Value::Long(3_000_000_000), Value::Double(1.5)])
        );
    }

    #[test]
    fn manifest_round_trips_through_decoder() {
        let manifest: Manifest = serde_json::from_value(serde_json::json!({
            "host": "h1",
            "events": [["a"], ["b"]],
            "payloads": [{ "faultCount": 2 }]
        }))
        .unwrap();
        let flow_data = build_encoder(manifest)
            .unwrap()
            .encode_flow_data(Compression::Zstd)
            .unwrap();

        let flow = FlowDecoder::new().decode_flow_data(&flow_data, true).unwrap();
        assert_eq!(flow.host, "h1");
        assert_eq!(flow.len(), 2);
        assert_eq!(flow.payloads[0].get("faultCount"), Some(&Value::Int(2)));
        assert!(flow.payloads[1].is_empty());
    }

    #[test]
    fn extra_payloads_rejected() {
        let manifest: Manifest = serde_json::from_value(serde_json::json!({
            "host": "h1",
            "payloads": [{}]
        }))
        .unwrap();
        assert!(build_encoder(manifest).is_err());
    }

    #[test]
    fn compression_names() {
        assert_eq!(parse_compression("ZSTD").unwrap(), Compression::Zstd);
        assert!(parse_compression("lz4").is_err());
    }
}
