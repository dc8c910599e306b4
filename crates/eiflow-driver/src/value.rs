use std::fmt;

use eiflow_types::Value;
use serde::Serialize;

use crate::schema::AttributeType;

/// A typed attribute value as seen by the host pipeline.
///
/// Serializes untagged, so a row renders as plain JSON.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl AttributeValue {
    /// Declared type this value satisfies, or `None` for null.
    #[must_use]
    pub fn attribute_type(&self) -> Option<AttributeType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(AttributeType::Bool),
            Self::Int(_) => Some(AttributeType::Int),
            Self::Long(_) => Some(AttributeType::Long),
            Self::Float(_) => Some(AttributeType::Float),
            Self::Double(_) => Some(AttributeType::Double),
            Self::String(_) => Some(AttributeType::String),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.attribute_type().map_or("null", AttributeType::name)
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

    /// Convert a decoded value to the declared type of its field.
    ///
    /// Returns `None` when the pairing is not allowed:
    ///
    /// ```text
    /// ┌────────┬──────────────────────────────────────────────────────┐
    /// │ target │ accepted sources                                     │
    /// ├────────┼──────────────────────────────────────────────────────┤
    /// │ bool   │ bool; "true"/"false" in any case                     │
    /// │ int    │ int; long within i32 range; numeric string           │
    /// │ long   │ int; long; numeric string                            │
    /// │ float  │ float; double; int; long; numeric string             │
    /// │ double │ float; double; int; long; numeric string             │
    /// │ string │ anything; collections as compact JSON, whole floats  │
    /// │        │ with a trailing `.0`                                 │
    /// └────────┴──────────────────────────────────────────────────────┘
    /// ```
    ///
    /// Null maps to null for every target.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn coerce(value: &Value, target: AttributeType) -> Option<Self> {
        if value.is_null() {
            return Some(Self::Null);
        }
        let coerced = match (target, value) {
            (AttributeType::Bool, Value::Bool(v)) => Self::Bool(*v),
            (AttributeType::Bool, Value::String(s)) => {
                if s.eq_ignore_ascii_case("true") {
                    Self::Bool(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Self::Bool(false)
                } else {
                    return None;
                }
            }

            (AttributeType::Int, Value::Int(v)) => Self::Int(*v),
            (AttributeType::Int, Value::Long(v)) => Self::Int(i32::try_from(*v).ok()?),
            (AttributeType::Int, Value::String(s)) => Self::Int(s.trim().parse().ok()?),

            (AttributeType::Long, Value::Int(v)) => Self::Long(i64::from(*v)),
            (AttributeType::Long, Value::Long(v)) => Self::Long(*v),
            (AttributeType::Long, Value::String(s)) => Self::Long(s.trim().parse().ok()?),

            (AttributeType::Float, Value::Float(v)) => Self::Float(*v),
            (AttributeType::Float, Value::Double(v)) => Self::Float(*v as f32),
            (AttributeType::Float, Value::Int(v)) => Self::Float(*v as f32),
            (AttributeType::Float, Value::Long(v)) => Self::Float(*v as f32),
            (AttributeType::Float, Value::String(s)) => Self::Float(s.trim().parse().ok()?),

            (AttributeType::Double, Value::Float(v)) => Self::Double(f64::from(*v)),
            (AttributeType::Double, Value::Double(v)) => Self::Double(*v),
            (AttributeType::Double, Value::Int(v)) => Self::Double(f64::from(*v)),
            (AttributeType::Double, Value::Long(v)) => Self::Double(*v as f64),
            (AttributeType::Double, Value::String(s)) => Self::Double(s.trim().parse().ok()?),

            (AttributeType::String, Value::String(s)) => Self::String(s.clone()),
            (AttributeType::String, Value::Bool(v)) => Self::String(v.to_string()),
            (AttributeType::String, Value::Int(v)) => Self::String(v.to_string()),
            (AttributeType::String, Value::Long(v)) => Self::String(v.to_string()),
            (AttributeType::String, Value::Float(v)) => Self::String(format!("{v:?}")),
            (AttributeType::String, Value::Double(v)) => Self::String(format!("{v:?}")),
            (AttributeType::String, composite) => {
                Self::String(serde_json::to_string(composite).ok()?)
            }

            _ => return None,
        };
        Some(coerced)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eiflow_types::PayloadRecord;

    fn coerce(value: impl Into<Value>, target: AttributeType) -> Option<AttributeValue> {
        AttributeValue::coerce(&value.into(), target)
    }

    #[test]
    fn null_is_null_for_every_target() {
        assert_eq!(coerce(Value::Null, AttributeType::Int), Some(AttributeValue::Null));
        assert_eq!(coerce(Value::Null, AttributeType::String), Some(AttributeValue::Null));
    }

    #[test]
    fn numeric_widening() {
        assert_eq!(coerce(7, AttributeType::Long), Some(AttributeValue::Long(7)));
        assert_eq!(coerce(7, AttributeType::Double), Some(AttributeValue::Double(7.0)));
        assert_eq!(coerce(1.5f32, AttributeType::Double), Some(AttributeValue::Double(1.5)));
    }

    #[test]
    fn long_narrows_to_int_only_in_range() {
        assert_eq!(coerce(42i64, AttributeType::Int), Some(AttributeValue::Int(42)));
        assert_eq!(coerce(i64::MAX, AttributeType::Int), None);
    }

    #[test]
    fn strings_parse_into_numbers_and_bools() {
        assert_eq!(coerce("12", AttributeType::Int), Some(AttributeValue::Int(12)));
        assert_eq!(coerce("-9", AttributeType::Long), Some(AttributeValue::Long(-9)));
        assert_eq!(coerce("TRUE", AttributeType::Bool), Some(AttributeValue::Bool(true)));
        assert_eq!(coerce("yes", AttributeType::Bool), None);
        assert_eq!(coerce("x1", AttributeType::Int), None);
    }

    #[test]
    fn scalars_render_as_strings() {
        assert_eq!(coerce(3, AttributeType::String), Some("3".into()));
        assert_eq!(coerce(false, AttributeType::String), Some("false".into()));
    }

    #[test]
    fn whole_floats_keep_their_fraction_as_strings() {
        assert_eq!(coerce(1.0f32, AttributeType::String), Some("1.0".into()));
        assert_eq!(coerce(2.0, AttributeType::String), Some("2.0".into()));
        assert_eq!(coerce(0.25, AttributeType::String), Some("0.25".into()));
    }

    #[test]
    fn composites_render_as_json() {
        let list = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(coerce(list, AttributeType::String), Some(r#"[1,"a"]"#.into()));

        let record = PayloadRecord::new().with("k", Value::Null);
        assert_eq!(
            coerce(Value::Payload(record), AttributeType::String),
            Some(r#"{"k":null}"#.into())
        );
    }

    #[test]
    fn disallowed_pairings() {
        assert_eq!(coerce(true, AttributeType::Int), None);
        assert_eq!(coerce(1.5, AttributeType::Long), None);
        assert_eq!(coerce(Value::List(vec![]), AttributeType::Double), None);
    }

    #[test]
    fn serializes_untagged() {
        let values = vec![AttributeValue::Null, 5.into(), "x".into()];
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[null,5,"x"]"#);
    }
}
