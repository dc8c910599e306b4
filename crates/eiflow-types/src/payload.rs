use indexmap::IndexMap;

use crate::value::Value;

/// Field names producers use inside a payload record.
///
/// These are not enforced; a record may carry any name. They exist so
/// producers and tests spell them the same way.
pub mod field {
    pub const BEFORE_PAYLOAD: &str = "beforePayload";
    pub const AFTER_PAYLOAD: &str = "afterPayload";
    pub const CONTEXT_PROPERTY_MAP: &str = "contextPropertyMap";
    pub const TRANSPORT_PROPERTY_MAP: &str = "transportPropertyMap";
    pub const CHILDREN: &str = "children";
    pub const FAULT_COUNT: &str = "faultCount";
    pub const ENTRY_POINT: &str = "entryPoint";
    pub const ENTRY_POINT_HASHCODE: &str = "entryPointHashcode";
}

/// Named auxiliary fields for one component invocation.
///
/// `payloads[i]` of a flow pairs with `events[i]`. Absent fields are
/// simply missing from `fields`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PayloadRecord {
    pub fields: IndexMap<String, Value>,
}

impl PayloadRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<IndexMap<String, Value>> for PayloadRecord {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }
}
