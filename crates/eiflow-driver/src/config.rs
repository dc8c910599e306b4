use std::path::PathBuf;

use eiflow_decoder::MAX_DECOMPRESSED_SIZE;
use serde::Deserialize;

/// Configuration for a decompress processor.
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────────┐
/// │ Field            │ Purpose                                          │
/// ├──────────────────┼──────────────────────────────────────────────────┤
/// │ context          │ Name used in logs and in every `ProcessError`    │
/// │ definition       │ Where the output schema is read from             │
/// │ event_layout     │ Names of the positional event record, in order   │
/// │ max_decompressed │ Upper bound on one unpacked flow, in bytes       │
/// └──────────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// When `event_layout` is `None`, position *i* of an event record names
/// schema field *i*. Setting it pins the name of every position, so the
/// definition can be reordered without moving values between fields.
///
/// Deserializes from JSON with every field optional:
///
/// ```json
/// { "context": "esb-analytics", "definition": { "file": "flow.def" } }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorConfig {
    pub context: String,
    pub definition: DefinitionSource,
    pub event_layout: Option<Vec<String>>,
    pub max_decompressed: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            context: "eiflow".to_string(),
            definition: DefinitionSource::Bundled,
            event_layout: None,
            max_decompressed: MAX_DECOMPRESSED_SIZE,
        }
    }
}

/// Where an output schema definition comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionSource {
    /// The definition compiled into the crate.
    #[default]
    Bundled,
    File(PathBuf),
    Inline(String),
}
