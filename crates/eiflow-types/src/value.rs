use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::payload::PayloadRecord;
use crate::type_id::TypeId;

/// A node of the generic tree recovered from a flow payload.
///
/// Maps keep the order in which their entries appeared on the wire.
/// `Payload` is the per-component record type; it is structurally a
/// map but carries its own registration so producers can tell the two
/// apart.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Payload(PayloadRecord),
}

impl Value {
    /// Registration of this value, or `None` for null.
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(TypeId::Bool),
            Self::Int(_) => Some(TypeId::Int),
            Self::Long(_) => Some(TypeId::Long),
            Self::Float(_) => Some(TypeId::Float),
            Self::Double(_) => Some(TypeId::Double),
            Self::String(_) => Some(TypeId::String),
            Self::List(_) => Some(TypeId::List),
            Self::Map(_) => Some(TypeId::Map),
            Self::Payload(_) => Some(TypeId::Payload),
        }
    }

    /// Short type name for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.type_id().map_or("null", TypeId::name)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Self::Map(v)
    }
}

impl From<PayloadRecord> for Value {
    fn from(v: PayloadRecord) -> Self {
        Self::Payload(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// Serializes as plain JSON-shaped data: maps and payload records become
// objects, lists become arrays. Used when a composite value has to be
// rendered into a string output field.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::Long(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => serialize_entries(serializer, entries),
            Self::Payload(record) => serialize_entries(serializer, &record.fields),
        }
    }
}

fn serialize_entries<S: Serializer>(
    serializer: S,
    entries: &IndexMap<String, Value>,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from(3).kind(), "int");
        assert_eq!(Value::from(3i64).kind(), "long");
        assert_eq!(Value::from("x").kind(), "string");
        assert_eq!(Value::Payload(PayloadRecord::new()).kind(), "payload");
    }

    #[test]
    fn option_conversion_maps_none_to_null() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some(5)), Value::Int(5));
    }

    #[test]
    fn serializes_as_json_in_wire_order() {
        let mut map = IndexMap::new();
        map.insert("z".to_string(), Value::from(1));
        map.insert("a".to_string(), Value::List(vec![Value::Null, Value::from(true)]));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(json, r#"{"z":1,"a":[null,true]}"#);
    }
}
