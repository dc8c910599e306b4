use std::path::PathBuf;

use eiflow_decoder::{DecodeError, DecompressError};

use crate::schema::AttributeType;

/// Errors raised while setting a processor up.
///
/// All of these are fatal at initialization: the processor never
/// starts with a partial schema or unresolved inputs.
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────────┐
/// │ Variant              │ Cause                                        │
/// ├──────────────────────┼──────────────────────────────────────────────┤
/// │ ReadDefinition       │ definition file could not be read            │
/// │ MalformedLine        │ line is not exactly `name:type`              │
/// │ UnknownType          │ type tag outside bool/int/long/float/...     │
/// │ DuplicateField       │ same output name declared twice              │
/// │ EmptySchema          │ definition declares no fields                │
/// │ DuplicateLayoutName  │ explicit event layout repeats a name         │
/// │ MissingAttribute     │ required input attribute not bound           │
/// │ UnknownAttribute     │ argument not in the input stream definition  │
/// │ AttributeType        │ bound attribute has the wrong declared type  │
/// │ ArgumentCount        │ wrong number of processor arguments          │
/// └──────────────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read event definition {}: {source}", path.display())]
    ReadDefinition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("definition line {line}: expected `name:type`, found `{text}`")]
    MalformedLine { line: usize, text: String },

    #[error("definition line {line}: unknown attribute type `{tag}`")]
    UnknownType { line: usize, tag: String },

    #[error("definition line {line}: field `{name}` declared twice")]
    DuplicateField { line: usize, name: String },

    #[error("event definition declares no fields")]
    EmptySchema,

    #[error("event layout names `{name}` more than once")]
    DuplicateLayoutName { name: String },

    #[error("cannot find required attribute `{name}` in the processor arguments")]
    MissingAttribute { name: &'static str },

    #[error("argument `{name}` is not an attribute of input stream `{stream}`")]
    UnknownAttribute { name: String, stream: String },

    #[error("attribute `{name}` should be {expected}, declared as {found}")]
    AttributeType {
        name: String,
        expected: AttributeType,
        found: AttributeType,
    },

    #[error("expected {expected} argument(s), found {found}")]
    ArgumentCount { expected: usize, found: usize },
}

/// Errors raised while expanding one decoded flow into rows.
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    /// An event record carries more positions than the layout names.
    #[error("event {row} has {width} values but the event layout has {layout}")]
    EventTooWide {
        row: usize,
        width: usize,
        layout: usize,
    },

    #[error("event {row}: field `{field}` should be {expected}, found {found}")]
    Coercion {
        row: usize,
        field: String,
        expected: AttributeType,
        found: &'static str,
    },
}

/// Why a single input event could not be processed.
///
/// ```text
///   EventError
///   ├── AttributeValue     ← input attribute holds an unexpected runtime value
///   ├── Decompress(..)     ← flowData text could not be unpacked
///   ├── Decode(..)         ← structure bytes are corrupt or mis-shaped
///   └── Expand(..)         ← rows could not be built from the structure
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("input attribute `{name}` should be {expected}, found {found}")]
    AttributeValue {
        name: &'static str,
        expected: AttributeType,
        found: &'static str,
    },

    #[error(transparent)]
    Decompress(#[from] DecompressError),

    #[error(transparent)]
    Decode(DecodeError),

    #[error(transparent)]
    Expand(#[from] ExpandError),
}

impl From<DecodeError> for EventError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Decompress(inner) => Self::Decompress(inner),
            other => Self::Decode(other),
        }
    }
}

/// A failed batch: which processor, which input event, and why.
#[derive(Debug, thiserror::Error)]
#[error("{context}: input event {event_index} failed: {source}")]
pub struct ProcessError {
    pub context: String,
    pub event_index: usize,
    #[source]
    pub source: EventError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_wrapped_decompression_is_lifted() {
        let err = EventError::from(DecodeError::Decompress(DecompressError::EmptyPayload));
        assert!(matches!(err, EventError::Decompress(DecompressError::EmptyPayload)));
    }

    #[test]
    fn process_error_names_context_and_index() {
        let err = ProcessError {
            context: "esb-app".to_string(),
            event_index: 2,
            source: EventError::Decompress(DecompressError::EmptyPayload),
        };
        assert_eq!(
            err.to_string(),
            "esb-app: input event 2 failed: flow data is empty"
        );
    }
}
