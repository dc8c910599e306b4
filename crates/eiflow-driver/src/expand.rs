use std::sync::Arc;

use eiflow_types::{FlowStructure, PayloadRecord, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ExpandError;
use crate::layout::EventLayout;
use crate::schema::{AttributeType, OutputSchema};
use crate::value::AttributeValue;

/// Output fields every row carries regardless of the event record.
pub mod injected {
    use crate::schema::AttributeType;

    pub const META_TENANT_ID: &str = "metaTenantId";
    pub const HOST: &str = "host";
    pub const TIMESTAMP: &str = "timestamp";

    pub const ALL: [(&str, AttributeType); 3] = [
        (META_TENANT_ID, AttributeType::Int),
        (HOST, AttributeType::String),
        (TIMESTAMP, AttributeType::Long),
    ];
}

/// Turns a decoded flow into one output row per component event.
///
/// Every schema field is resolved by name, later sources winning:
///
/// ```text
///   1. events[i] at layout.position(name)   (null positions skipped)
///   2. payloads[i].get(name)                (null fields skipped)
///   3. metaTenantId / host / timestamp      (always present)
/// ```
///
/// then coerced to the field's declared type. Fields no source provides
/// are null.
#[derive(Clone, Debug)]
pub struct RowExpander {
    schema: Arc<OutputSchema>,
    layout: Arc<EventLayout>,
}

impl RowExpander {
    #[must_use]
    pub fn new(schema: Arc<OutputSchema>, layout: Arc<EventLayout>) -> Self {
        Self { schema, layout }
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<OutputSchema> {
        &self.schema
    }

    #[must_use]
    pub fn layout(&self) -> &Arc<EventLayout> {
        &self.layout
    }

    /// Attributes of an emitted row: the schema fields in order, then
    /// every injected field the schema does not declare.
    pub fn output_attributes(&self) -> impl Iterator<Item = (&str, AttributeType)> {
        let undeclared = injected::ALL
            .into_iter()
            .filter(|(name, _)| self.schema.index_of(name).is_none());
        self.schema.attributes().chain(undeclared)
    }

    /// Build the rows for `structure`, in event order.
    ///
    /// # Errors
    ///
    /// - [`ExpandError::EventTooWide`] if an event record is longer than
    ///   the layout.
    /// - [`ExpandError::Coercion`] if a resolved value cannot take its
    ///   field's declared type.
    pub fn expand(
        &self,
        structure: &FlowStructure,
        tenant_id: i32,
        timestamp: i64,
    ) -> Result<Vec<OutputRow>, ExpandError> {
        let injected = Injected {
            tenant_id,
            host: structure.host.clone(),
            timestamp,
        };

        structure
            .components()
            .enumerate()
            .map(|(row, (event, payload))| self.build_row(row, event, payload, &injected))
            .collect()
    }

    fn build_row(
        &self,
        row: usize,
        event: &[Value],
        payload: &PayloadRecord,
        injected: &Injected,
    ) -> Result<OutputRow, ExpandError> {
        if event.len() > self.layout.len() {
            return Err(ExpandError::EventTooWide {
                row,
                width: event.len(),
                layout: self.layout.len(),
            });
        }

        let mut values = Vec::with_capacity(self.schema.len());
        for (name, ty) in self.schema.attributes() {
            let resolved = match injected.value(name) {
                Some(value) => value,
                None => payload
                    .get(name)
                    .filter(|v| !v.is_null())
                    .or_else(|| {
                        self.layout
                            .position(name)
                            .and_then(|p| event.get(p))
                            .filter(|v| !v.is_null())
                    })
                    .cloned()
                    .unwrap_or(Value::Null),
            };

            let value = AttributeValue::coerce(&resolved, ty).ok_or_else(|| {
                ExpandError::Coercion {
                    row,
                    field: name.to_string(),
                    expected: ty,
                    found: resolved.kind(),
                }
            })?;
            values.push(value);
        }

        Ok(OutputRow {
            schema: Arc::clone(&self.schema),
            values,
            injected: injected.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Injected {
    tenant_id: i32,
    host: String,
    timestamp: i64,
}

impl Injected {
    fn value(&self, name: &str) -> Option<Value> {
        match name {
            injected::META_TENANT_ID => Some(Value::Int(self.tenant_id)),
            injected::HOST => Some(Value::String(self.host.clone())),
            injected::TIMESTAMP => Some(Value::Long(self.timestamp)),
            _ => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        match name {
            injected::META_TENANT_ID => Some(AttributeValue::Int(self.tenant_id)),
            injected::HOST => Some(AttributeValue::String(self.host.clone())),
            injected::TIMESTAMP => Some(AttributeValue::Long(self.timestamp)),
            _ => None,
        }
    }
}

/// One expanded component event.
///
/// `values` are positioned in schema order. The injected fields are
/// readable through [`get`](Self::get) even when the schema does not
/// declare them, and [`into_output`](Self::into_output) appends them.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputRow {
    schema: Arc<OutputSchema>,
    values: Vec<AttributeValue>,
    injected: Injected,
}

impl OutputRow {
    /// Look a field up by name: schema fields first, then the injected
    /// `metaTenantId`, `host` and `timestamp`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        match self.schema.index_of(name) {
            Some(index) => self.values.get(index).cloned(),
            None => self.injected.attribute(name),
        }
    }

    /// Values in schema order.
    #[must_use]
    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    /// The values of an emitted event, laid out like
    /// [`RowExpander::output_attributes`]: schema fields, then the
    /// undeclared injected fields.
    #[must_use]
    pub fn into_output(self) -> Vec<AttributeValue> {
        let mut output = self.values;
        for (name, _) in injected::ALL {
            if self.schema.index_of(name).is_none() {
                output.extend(self.injected.attribute(name));
            }
        }
        output
    }

    #[must_use]
    pub fn schema(&self) -> &OutputSchema {
        &self.schema
    }
}

// A row serializes as one JSON object: schema fields in order, then any
// injected field the schema does not declare.
impl Serialize for OutputRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for ((name, _), value) in self.schema.attributes().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        for (name, _) in injected::ALL {
            if self.schema.index_of(name).is_none() {
                map.serialize_entry(name, &self.injected.attribute(name))?;
            }
        }
        map.end()
    }
}
