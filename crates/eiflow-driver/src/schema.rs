use std::fmt;

use indexmap::IndexMap;

use crate::config::DefinitionSource;
use crate::error::ConfigError;

/// The definition shipped with the crate: the upstream ESB analytics
/// field list.
pub const BUNDLED_DEFINITION: &str = include_str!("../resources/flow_event.def");

/// Declared type of an output or input attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl AttributeType {
    /// Parse a definition type tag, case-insensitively.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Some(Self::Bool),
            "int" | "int32" => Some(Self::Int),
            "long" | "int64" => Some(Self::Long),
            "float" | "float32" => Some(Self::Float),
            "double" | "float64" => Some(Self::Double),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered output field names and their declared types.
///
/// Loaded once at initialization and shared read-only between workers.
/// Field order is the declaration order of the definition.
///
/// Definition format:
///
/// ```text
/// # comment
/// messageFlowId : string
/// componentIndex: INT
/// ```
///
/// All whitespace is removed before a line is read, so `a : b` and
/// `a:b` are the same line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSchema {
    fields: IndexMap<String, AttributeType>,
}

impl OutputSchema {
    /// Load a schema from any definition source.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ReadDefinition`] if a file source cannot be read,
    /// otherwise as [`parse`](Self::parse).
    pub fn load(source: &DefinitionSource) -> Result<Self, ConfigError> {
        match source {
            DefinitionSource::Bundled => Self::parse(BUNDLED_DEFINITION),
            DefinitionSource::Inline(text) => Self::parse(text),
            DefinitionSource::File(path) => {
                let text =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::ReadDefinition {
                        path: path.clone(),
                        source,
                    })?;
                Self::parse(&text)
            }
        }
    }

    /// Parse definition text.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MalformedLine`] for a line that is not exactly a
    ///   non-empty name and a tag separated by one `:`.
    /// - [`ConfigError::UnknownType`] for an unrecognised tag.
    /// - [`ConfigError::DuplicateField`] for a repeated name.
    /// - [`ConfigError::EmptySchema`] if no field is declared.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut fields = IndexMap::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            if compact.is_empty() || compact.starts_with('#') {
                continue;
            }

            let mut parts = compact.split(':');
            let (Some(name), Some(tag), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(ConfigError::MalformedLine {
                    line,
                    text: raw.trim().to_string(),
                });
            };
            if name.is_empty() || tag.is_empty() {
                return Err(ConfigError::MalformedLine {
                    line,
                    text: raw.trim().to_string(),
                });
            }

            let ty = AttributeType::from_tag(tag).ok_or_else(|| ConfigError::UnknownType {
                line,
                tag: tag.to_string(),
            })?;
            if fields.insert(name.to_string(), ty).is_some() {
                return Err(ConfigError::DuplicateField {
                    line,
                    name: name.to_string(),
                });
            }
        }

        if fields.is_empty() {
            return Err(ConfigError::EmptySchema);
        }
        Ok(Self { fields })
    }

    /// Schema from the bundled definition.
    ///
    /// # Errors
    ///
    /// Only if the bundled resource itself is invalid.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::parse(BUNDLED_DEFINITION)
    }

    /// Declared output attributes, in order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, AttributeType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<AttributeType> {
        self.fields.get(name).copied()
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_definition_parses() {
        let schema = OutputSchema::bundled().unwrap();
        assert_eq!(schema.len(), 20);
        assert_eq!(schema.names().next(), Some("messageFlowId"));
        assert_eq!(schema.get("componentIndex"), Some(AttributeType::Int));
        assert_eq!(schema.get("timestamp"), Some(AttributeType::Long));
    }

    #[test]
    fn comments_blank_lines_and_whitespace() {
        let schema = OutputSchema::parse("# header\n\n  a : STRING \n\tb:Long\n").unwrap();
        let attrs: Vec<_> = schema.attributes().collect();
        assert_eq!(
            attrs,
            [("a", AttributeType::String), ("b", AttributeType::Long)]
        );
    }

    #[test]
    fn aliases_accepted() {
        let schema = OutputSchema::parse("a:int32\nb:int64\nc:float32\nd:float64\ne:boolean").unwrap();
        let types: Vec<_> = schema.attributes().map(|(_, ty)| ty).collect();
        assert_eq!(
            types,
            [
                AttributeType::Int,
                AttributeType::Long,
                AttributeType::Float,
                AttributeType::Double,
                AttributeType::Bool
            ]
        );
    }

    #[test]
    fn unknown_type_reports_line() {
        let err = OutputSchema::parse("a:string\nb:object").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownType { line: 2, ref tag } if tag == "object"));
    }

    #[test]
    fn malformed_lines_rejected() {
        for text in ["a", "a:b:c", ":string", "a:"] {
            assert!(
                matches!(OutputSchema::parse(text), Err(ConfigError::MalformedLine { line: 1, .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn duplicate_field_rejected() {
        assert!(matches!(
            OutputSchema::parse("a:int\na:long"),
            Err(ConfigError::DuplicateField { line: 2, .. })
        ));
    }

    #[test]
    fn empty_definition_rejected() {
        assert!(matches!(
            OutputSchema::parse("# nothing here\n\n"),
            Err(ConfigError::EmptySchema)
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let source = DefinitionSource::File("/nonexistent/eiflow.def".into());
        assert!(matches!(
            OutputSchema::load(&source),
            Err(ConfigError::ReadDefinition { .. })
        ));
    }

    #[test]
    fn inline_source() {
        let source = DefinitionSource::Inline("component:string".to_string());
        let schema = OutputSchema::load(&source).unwrap();
        assert_eq!(schema.index_of("component"), Some(0));
    }
}
