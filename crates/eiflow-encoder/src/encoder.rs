use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use eiflow_types::{FlowStructure, PayloadRecord, Value};

use crate::compression::Compression;
use crate::error::EncodeError;
use crate::value_writer::ValueWriter;

/// Flow encoder: builds the binary form of an aggregated flow.
///
/// This is the producer side of the format, used by tests, the CLI and
/// anything that has to hand a flow to a consumer. Events are appended
/// with [`add_event`](Self::add_event); the chainable
/// [`with_payload`](Self::with_payload) attaches a payload record to the
/// most recently added event.
///
/// # Usage
///
/// ```rust
/// use eiflow_encoder::{Compression, FlowEncoder};
/// use eiflow_types::{PayloadRecord, Value};
///
/// let flow_data = FlowEncoder::new("esb-node-1")
///     .add_event(vec![Value::from("flow-1"), Value::from("esb-node-1")])
///     .with_payload(PayloadRecord::new().with("faultCount", 0))
///     .add_event(vec![Value::from("flow-1")])
///     .encode_flow_data(Compression::Gzip)
///     .unwrap();
/// assert!(!flow_data.is_empty());
/// ```
///
/// # Output layout
///
/// ```text
/// MAP(3)
/// ├── "host"     → STRING
/// ├── "events"   → LIST of LIST (one positional row per component)
/// └── "payloads" → LIST of PAYLOAD (one record per component)
/// ```
///
/// Every event has a payload slot; events added without one get an
/// empty record, so the two lists always line up.
pub struct FlowEncoder {
    host: String,
    events: Vec<Vec<Value>>,
    payloads: Vec<PayloadRecord>,
    /// Set when `with_payload` ran with no event to attach to.
    orphan_payload: bool,
}

impl FlowEncoder {
    #[must_use]
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            events: Vec::new(),
            payloads: Vec::new(),
            orphan_payload: false,
        }
    }

    /// Seed an encoder from an already assembled flow.
    #[must_use]
    pub fn from_structure(flow: &FlowStructure) -> Self {
        Self {
            host: flow.host.clone(),
            events: flow.events.clone(),
            payloads: flow.payloads.clone(),
            orphan_payload: false,
        }
    }

    /// Append a component event with an empty payload record.
    pub fn add_event(&mut self, values: Vec<Value>) -> &mut Self {
        self.events.push(values);
        self.payloads.push(PayloadRecord::new());
        self
    }

    /// Replace the payload record of the most recently added event.
    ///
    /// Calling this before any event is recorded surfaces as
    /// [`EncodeError::InvalidPayloadTarget`] from `encode`.
    pub fn with_payload(&mut self, payload: PayloadRecord) -> &mut Self {
        match self.payloads.last_mut() {
            Some(slot) => *slot = payload,
            None => self.orphan_payload = true,
        }
        self
    }

    /// Number of events added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Serialize the flow to its uncompressed wire bytes.
    ///
    /// # Errors
    ///
    /// [`EncodeError::InvalidPayloadTarget`] if `with_payload` was
    /// called with no event to attach to.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.orphan_payload {
            return Err(EncodeError::InvalidPayloadTarget);
        }
        let flow = FlowStructure {
            host: self.host.clone(),
            events: self.events.clone(),
            payloads: self.payloads.clone(),
        };
        Ok(encode_value(&flow.to_value()))
    }

    /// Serialize, compress and base64-encode the flow: the string a
    /// producer places in the `flowData` attribute.
    ///
    /// # Errors
    ///
    /// Builder misuse as for [`encode`](Self::encode), or an I/O error
    /// from the compressor.
    pub fn encode_flow_data(&self, compression: Compression) -> Result<String, EncodeError> {
        let bytes = self.encode()?;
        let packed = compression.apply(&bytes)?;
        Ok(STANDARD.encode(packed))
    }
}

/// Serialize any value tree. Used for flows built by hand, including
/// deliberately malformed ones.
#[must_use]
pub fn encode_value(value: &Value) -> Vec<u8> {
    let mut writer = ValueWriter::with_capacity(256);
    writer.write_value(value);
    writer.finish()
}
