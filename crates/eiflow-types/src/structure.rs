use indexmap::IndexMap;

use crate::error::TypeError;
use crate::payload::PayloadRecord;
use crate::value::Value;

pub const HOST_KEY: &str = "host";
pub const EVENTS_KEY: &str = "events";
pub const PAYLOADS_KEY: &str = "payloads";

/// An aggregated flow: one host, and a positional event record plus a
/// payload record for every component the message passed through.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────┐
/// │ FlowStructure                                           │
/// │   host:     "esb-node-1"                                │
/// │   events:   [ [flowId, host, hash, name, ...], ... ]    │
/// │   payloads: [ {beforePayload, afterPayload, ...}, ... ] │
/// └─────────────────────────────────────────────────────────┘
/// ```
///
/// `events.len() == payloads.len()` always holds for a value built by
/// [`from_value`](Self::from_value).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowStructure {
    pub host: String,
    pub events: Vec<Vec<Value>>,
    pub payloads: Vec<PayloadRecord>,
}

impl FlowStructure {
    /// Interpret a decoded root value as a flow.
    ///
    /// Lenient about the inside of each component: a null event row
    /// becomes an empty row, a null payload becomes an empty record, and
    /// payloads may be plain maps as well as payload records. Strict
    /// about the three top-level keys and about alignment.
    ///
    /// # Errors
    ///
    /// - [`TypeError::UnexpectedShape`] if the root is not a map, or a
    ///   known key holds the wrong kind of value.
    /// - [`TypeError::MissingKey`] if `host`, `events` or `payloads` is
    ///   absent.
    /// - [`TypeError::MisalignedPayloads`] if the two sequences differ in
    ///   length.
    pub fn from_value(root: Value) -> Result<Self, TypeError> {
        let mut map = match root {
            Value::Map(map) => map,
            other => {
                return Err(TypeError::UnexpectedShape {
                    path: "$".to_string(),
                    expected: "map",
                    found: other.kind(),
                });
            }
        };

        let host = match take(&mut map, HOST_KEY)? {
            Value::String(host) => host,
            other => return Err(shape(HOST_KEY, "string", &other)),
        };

        let events = match take(&mut map, EVENTS_KEY)? {
            Value::List(rows) => rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| match row {
                    Value::List(values) => Ok(values),
                    Value::Null => Ok(Vec::new()),
                    other => Err(shape(&format!("{EVENTS_KEY}[{i}]"), "list", &other)),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => return Err(shape(EVENTS_KEY, "list", &other)),
        };

        let payloads = match take(&mut map, PAYLOADS_KEY)? {
            Value::List(records) => records
                .into_iter()
                .enumerate()
                .map(|(i, record)| match record {
                    Value::Payload(record) => Ok(record),
                    Value::Map(fields) => Ok(PayloadRecord::from(fields)),
                    Value::Null => Ok(PayloadRecord::new()),
                    other => Err(shape(
                        &format!("{PAYLOADS_KEY}[{i}]"),
                        "payload or map",
                        &other,
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => return Err(shape(PAYLOADS_KEY, "list", &other)),
        };

        if events.len() != payloads.len() {
            return Err(TypeError::MisalignedPayloads {
                events: events.len(),
                payloads: payloads.len(),
            });
        }

        Ok(Self {
            host,
            events,
            payloads,
        })
    }

    /// Build the root value a producer would encode for this flow.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = IndexMap::with_capacity(3);
        map.insert(HOST_KEY.to_string(), Value::String(self.host.clone()));
        map.insert(
            EVENTS_KEY.to_string(),
            Value::List(self.events.iter().cloned().map(Value::List).collect()),
        );
        map.insert(
            PAYLOADS_KEY.to_string(),
            Value::List(self.payloads.iter().cloned().map(Value::Payload).collect()),
        );
        Value::Map(map)
    }

    /// Number of component events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate `(event row, payload record)` pairs in wire order.
    pub fn components(&self) -> impl Iterator<Item = (&[Value], &PayloadRecord)> {
        self.events
            .iter()
            .map(Vec::as_slice)
            .zip(self.payloads.iter())
    }
}

fn take(map: &mut IndexMap<String, Value>, key: &'static str) -> Result<Value, TypeError> {
    map.shift_remove(key).ok_or(TypeError::MissingKey { key })
}

fn shape(path: &str, expected: &'static str, found: &Value) -> TypeError {
    TypeError::UnexpectedShape {
        path: path.to_string(),
        expected,
        found: found.kind(),
    }
}
