use eiflow_types::{PayloadRecord, TypeId, Value, WireTag};
use eiflow_wire::varint::{push_varint, zigzag_encode_i32, zigzag_encode_i64};
use indexmap::IndexMap;

/// Tagged value serializer.
///
/// `ValueWriter` accumulates the byte form of one or more [`Value`]s
/// into an internal buffer. Every value starts with its wire tag, so a
/// decoder can walk the tree without a schema.
///
/// Layout per value:
///
/// ```text
/// ┌──────────────┬─────────────────────────────────────────────┐
/// │ tag (varint) │ body                                        │
/// ├──────────────┼─────────────────────────────────────────────┤
/// │ 0            │ (none, null)                                │
/// │ INT / LONG   │ zigzag varint                               │
/// │ FLOAT/DOUBLE │ 4 / 8 bytes big-endian                      │
/// │ BOOL         │ 1 byte                                      │
/// │ STRING       │ length (varint) + UTF-8                     │
/// │ LIST         │ count (varint) + tagged values              │
/// │ MAP          │ count (varint) + (tagged key, tagged value) │
/// │ PAYLOAD      │ count (varint) + (len, name, tagged value)  │
/// └──────────────┴─────────────────────────────────────────────┘
/// ```
pub struct ValueWriter {
    buf: Vec<u8>,
}

impl ValueWriter {
    #[must_use]
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append one tagged value, recursing into collections.
    pub fn write_value(&mut self, value: &Value) {
        match value {
            Value::Null => push_varint(&mut self.buf, WireTag::Null.raw()),
            Value::Bool(v) => {
                self.write_tag(TypeId::Bool);
                self.buf.push(u8::from(*v));
            }
            Value::Int(v) => {
                self.write_tag(TypeId::Int);
                push_varint(&mut self.buf, zigzag_encode_i32(*v));
            }
            Value::Long(v) => {
                self.write_tag(TypeId::Long);
                push_varint(&mut self.buf, zigzag_encode_i64(*v));
            }
            Value::Float(v) => {
                self.write_tag(TypeId::Float);
                self.buf.extend_from_slice(&v.to_be_bytes());
            }
            Value::Double(v) => {
                self.write_tag(TypeId::Double);
                self.buf.extend_from_slice(&v.to_be_bytes());
            }
            Value::String(v) => self.write_string(v),
            Value::List(items) => self.write_list(items),
            Value::Map(entries) => self.write_map(entries),
            Value::Payload(record) => self.write_payload(record),
        }
    }

    /// Append a tagged string.
    pub fn write_string(&mut self, value: &str) {
        self.write_tag(TypeId::String);
        self.write_raw_str(value);
    }

    pub fn write_list(&mut self, items: &[Value]) {
        self.write_tag(TypeId::List);
        self.write_len(items.len());
        for item in items {
            self.write_value(item);
        }
    }

    /// Keys are written as tagged strings, in insertion order.
    pub fn write_map(&mut self, entries: &IndexMap<String, Value>) {
        self.write_tag(TypeId::Map);
        self.write_len(entries.len());
        for (key, value) in entries {
            self.write_string(key);
            self.write_value(value);
        }
    }

    /// Field names are untagged: the payload registration already says
    /// they are strings.
    pub fn write_payload(&mut self, record: &PayloadRecord) {
        self.write_tag(TypeId::Payload);
        self.write_len(record.fields.len());
        for (name, value) in &record.fields {
            self.write_raw_str(name);
            self.write_value(value);
        }
    }

    /// Consume the writer and return the accumulated bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn write_tag(&mut self, type_id: TypeId) {
        push_varint(&mut self.buf, WireTag::Value(type_id).raw());
    }

    fn write_len(&mut self, len: usize) {
        push_varint(&mut self.buf, len as u64);
    }

    fn write_raw_str(&mut self, value: &str) {
        self.write_len(value.len());
        self.buf.extend_from_slice(value.as_bytes());
    }
}

impl Default for ValueWriter {
    fn default() -> Self {
        Self::new()
    }
}
