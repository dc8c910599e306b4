use crate::error::{ConfigError, EventError};
use crate::schema::AttributeType;
use crate::value::AttributeValue;

/// Whether an event is arriving or leaving a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventKind {
    #[default]
    Current,
    Expired,
}

/// Minimal stand-in for a host pipeline event.
///
/// `data` holds the input attributes, positioned by the input stream
/// definition. `output` holds attributes a processor appended; it is
/// empty on events that have not passed through one.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamEvent {
    pub timestamp: i64,
    pub kind: EventKind,
    pub data: Vec<AttributeValue>,
    pub output: Vec<AttributeValue>,
}

impl StreamEvent {
    #[must_use]
    pub fn new(timestamp: i64, data: Vec<AttributeValue>) -> Self {
        Self {
            timestamp,
            kind: EventKind::Current,
            data,
            output: Vec::new(),
        }
    }

    /// Copy of this event's shell carrying `output` as its appended
    /// attributes.
    #[must_use]
    pub fn with_output(&self, output: Vec<AttributeValue>) -> Self {
        Self {
            timestamp: self.timestamp,
            kind: self.kind,
            data: self.data.clone(),
            output,
        }
    }
}

/// Ordered attribute names and types of an input stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamDefinition {
    pub id: String,
    attributes: Vec<(String, AttributeType)>,
}

impl StreamDefinition {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute declaration.
    #[must_use]
    pub fn attribute(mut self, name: &str, ty: AttributeType) -> Self {
        self.attributes.push((name.to_string(), ty));
        self
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|(n, _)| n == name)
    }

    #[must_use]
    pub fn attribute_type(&self, index: usize) -> Option<AttributeType> {
        self.attributes.get(index).map(|(_, ty)| *ty)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, AttributeType)> {
        self.attributes.iter().map(|(n, ty)| (n.as_str(), *ty))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Role an input attribute plays for the decompress processor.
///
/// ```text
/// ┌────────────┬──────────────────┬────────┬──────────┐
/// │ Role       │ Attribute        │ Type   │ Required │
/// ├────────────┼──────────────────┼────────┼──────────┤
/// │ Compressed │ meta_compressed  │ bool   │ yes      │
/// │ TenantId   │ meta_tenantId    │ int    │ yes      │
/// │ MessageId  │ messageId        │ string │ no       │
/// │ FlowData   │ flowData         │ string │ yes      │
/// └────────────┴──────────────────┴────────┴──────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputRole {
    Compressed,
    TenantId,
    MessageId,
    FlowData,
}

impl InputRole {
    pub const ALL: [Self; 4] = [
        Self::Compressed,
        Self::TenantId,
        Self::MessageId,
        Self::FlowData,
    ];

    #[must_use]
    pub fn attribute_name(self) -> &'static str {
        match self {
            Self::Compressed => "meta_compressed",
            Self::TenantId => "meta_tenantId",
            Self::MessageId => "messageId",
            Self::FlowData => "flowData",
        }
    }

    #[must_use]
    pub fn expected_type(self) -> AttributeType {
        match self {
            Self::Compressed => AttributeType::Bool,
            Self::TenantId => AttributeType::Int,
            Self::MessageId | Self::FlowData => AttributeType::String,
        }
    }

    #[must_use]
    pub fn is_required(self) -> bool {
        !matches!(self, Self::MessageId)
    }

    #[must_use]
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.attribute_name() == name)
    }
}

/// One input event's envelope, read through [`InputBindings`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub compressed: bool,
    pub tenant_id: i32,
    pub message_id: Option<String>,
    pub flow_data: String,
}

/// Input attribute positions, resolved once at initialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputBindings {
    compressed: usize,
    tenant_id: usize,
    message_id: Option<usize>,
    flow_data: usize,
}

impl InputBindings {
    /// Bind processor arguments to input attributes by name.
    ///
    /// Arguments that name no known role are ignored.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownAttribute`] if an argument is not declared
    ///   by `definition`.
    /// - [`ConfigError::AttributeType`] if a role's attribute has the
    ///   wrong declared type.
    /// - [`ConfigError::MissingAttribute`] if a required role is unbound.
    pub fn resolve(
        definition: &StreamDefinition,
        arguments: &[&str],
    ) -> Result<Self, ConfigError> {
        let mut slots: [Option<usize>; 4] = [None; 4];

        for &name in arguments {
            let index =
                definition
                    .index_of(name)
                    .ok_or_else(|| ConfigError::UnknownAttribute {
                        name: name.to_string(),
                        stream: definition.id.clone(),
                    })?;
            let Some(role) = InputRole::from_attribute_name(name) else {
                continue;
            };
            let declared = definition
                .attribute_type(index)
                .unwrap_or(AttributeType::String);
            if declared != role.expected_type() {
                return Err(ConfigError::AttributeType {
                    name: name.to_string(),
                    expected: role.expected_type(),
                    found: declared,
                });
            }
            slots[role as usize] = Some(index);
        }

        let required = |role: InputRole| {
            slots[role as usize].ok_or(ConfigError::MissingAttribute {
                name: role.attribute_name(),
            })
        };
        Ok(Self {
            compressed: required(InputRole::Compressed)?,
            tenant_id: required(InputRole::TenantId)?,
            message_id: slots[InputRole::MessageId as usize],
            flow_data: required(InputRole::FlowData)?,
        })
    }

    /// Read the envelope attributes of one event.
    ///
    /// A null `flowData` reads as empty text and a null `messageId` as
    /// absent.
    ///
    /// # Errors
    ///
    /// [`EventError::AttributeValue`] if a bound attribute holds a value
    /// of another type.
    pub fn envelope(&self, event: &StreamEvent) -> Result<Envelope, EventError> {
        let compressed = match value_at(event, self.compressed) {
            AttributeValue::Bool(v) => *v,
            other => return Err(mismatch(InputRole::Compressed, other)),
        };
        let tenant_id = match value_at(event, self.tenant_id) {
            AttributeValue::Int(v) => *v,
            other => return Err(mismatch(InputRole::TenantId, other)),
        };
        let flow_data = match value_at(event, self.flow_data) {
            AttributeValue::String(v) => v.clone(),
            AttributeValue::Null => String::new(),
            other => return Err(mismatch(InputRole::FlowData, other)),
        };
        let message_id = match self.message_id.map(|index| value_at(event, index)) {
            None | Some(AttributeValue::Null) => None,
            Some(AttributeValue::String(v)) => Some(v.clone()),
            Some(other) => return Err(mismatch(InputRole::MessageId, other)),
        };

        Ok(Envelope {
            compressed,
            tenant_id,
            message_id,
            flow_data,
        })
    }
}

fn value_at(event: &StreamEvent, index: usize) -> &AttributeValue {
    event.data.get(index).unwrap_or(&AttributeValue::Null)
}

fn mismatch(role: InputRole, found: &AttributeValue) -> EventError {
    EventError::AttributeValue {
        name: role.attribute_name(),
        expected: role.expected_type(),
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARGS: [&str; 4] = ["meta_compressed", "meta_tenantId", "messageId", "flowData"];

    fn definition() -> StreamDefinition {
        StreamDefinition::new("inputStream")
            .attribute("meta_compressed", AttributeType::Bool)
            .attribute("meta_tenantId", AttributeType::Int)
            .attribute("messageId", AttributeType::String)
            .attribute("flowData", AttributeType::String)
    }

    #[test]
    fn resolves_all_roles() {
        let bindings = InputBindings::resolve(&definition(), &ARGS).unwrap();
        let event = StreamEvent::new(
            10,
            vec![false.into(), 7.into(), "m1".into(), "AAAA".into()],
        );
        let envelope = bindings.envelope(&event).unwrap();
        assert_eq!(
            envelope,
            Envelope {
                compressed: false,
                tenant_id: 7,
                message_id: Some("m1".to_string()),
                flow_data: "AAAA".to_string(),
            }
        );
    }

    #[test]
    fn message_id_is_optional() {
        let bindings =
            InputBindings::resolve(&definition(), &["meta_compressed", "meta_tenantId", "flowData"])
                .unwrap();
        let event = StreamEvent::new(0, vec![true.into(), 1.into(), "x".into(), "AAAA".into()]);
        assert_eq!(bindings.envelope(&event).unwrap().message_id, None);
    }

    #[test]
    fn missing_required_role() {
        let err = InputBindings::resolve(&definition(), &["meta_compressed", "flowData"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingAttribute { name: "meta_tenantId" }
        ));
    }

    #[test]
    fn wrong_declared_type() {
        let definition = StreamDefinition::new("s")
            .attribute("meta_compressed", AttributeType::String)
            .attribute("meta_tenantId", AttributeType::Int)
            .attribute("flowData", AttributeType::String);
        let err =
            InputBindings::resolve(&definition, &["meta_compressed", "meta_tenantId", "flowData"])
                .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::AttributeType {
                expected: AttributeType::Bool,
                found: AttributeType::String,
                ..
            }
        ));
    }

    #[test]
    fn argument_not_in_stream() {
        let err = InputBindings::resolve(&definition(), &["payload"]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAttribute { .. }));
    }

    #[test]
    fn runtime_type_mismatch() {
        let bindings = InputBindings::resolve(&definition(), &ARGS).unwrap();
        let event = StreamEvent::new(0, vec!["no".into(), 1.into(), AttributeValue::Null, "x".into()]);
        assert!(matches!(
            bindings.envelope(&event),
            Err(EventError::AttributeValue {
                name: "meta_compressed",
                found: "string",
                ..
            })
        ));
    }

    #[test]
    fn null_flow_data_reads_as_empty() {
        let bindings = InputBindings::resolve(&definition(), &ARGS).unwrap();
        let event = StreamEvent::new(
            0,
            vec![false.into(), 1.into(), AttributeValue::Null, AttributeValue::Null],
        );
        assert_eq!(bindings.envelope(&event).unwrap().flow_data, "");
    }

    #[test]
    fn with_output_clones_shell() {
        let mut event = StreamEvent::new(5, vec!["in".into()]);
        event.kind = EventKind::Expired;
        let out = event.with_output(vec![1.into()]);
        assert_eq!(out.timestamp, 5);
        assert_eq!(out.kind, EventKind::Expired);
        assert_eq!(out.data, event.data);
        assert_eq!(out.output, vec![AttributeValue::Int(1)]);
    }
}
