use indexmap::IndexSet;

use crate::error::ConfigError;
use crate::schema::{BUNDLED_DEFINITION, OutputSchema};

/// Names of the positions of an event record.
///
/// Event records on the wire carry no field names; a value's identity is
/// its position. The layout turns an output field name back into that
/// position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventLayout {
    names: IndexSet<String>,
}

impl EventLayout {
    /// Position *i* names schema field *i*.
    #[must_use]
    pub fn from_schema(schema: &OutputSchema) -> Self {
        Self {
            names: schema.names().map(str::to_string).collect(),
        }
    }

    /// The record ESB producers write: the field order of the bundled
    /// definition.
    #[must_use]
    pub fn bundled() -> Self {
        Self {
            names: definition_names(BUNDLED_DEFINITION)
                .map(str::to_string)
                .collect(),
        }
    }

    /// Layout used when none is configured.
    ///
    /// A schema whose fields all belong to the bundled record reads
    /// events in the bundled order, whatever order it declares them in.
    /// Any other schema reads position *i* as schema field *i*.
    #[must_use]
    pub fn default_for(schema: &OutputSchema) -> Self {
        let bundled = Self::bundled();
        if schema.names().all(|name| bundled.position(name).is_some()) {
            bundled
        } else {
            Self::from_schema(schema)
        }
    }

    /// An explicit, ordered list of position names.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateLayoutName`] if a name appears twice.
    pub fn explicit<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for name in names {
            let name = name.into();
            if set.contains(&name) {
                return Err(ConfigError::DuplicateLayoutName { name });
            }
            set.insert(name);
        }
        Ok(Self { names: set })
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn definition_names(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split(':').next())
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_order_by_default() {
        let schema = OutputSchema::parse("b:int\na:string").unwrap();
        let layout = EventLayout::from_schema(&schema);
        assert_eq!(layout.position("b"), Some(0));
        assert_eq!(layout.position("a"), Some(1));
        assert_eq!(layout.position("c"), None);
    }

    #[test]
    fn bundled_layout_follows_bundled_definition() {
        let layout = EventLayout::bundled();
        let schema = OutputSchema::bundled().unwrap();
        assert!(layout.names().eq(schema.names()));
        assert_eq!(layout.position("hashCode"), Some(2));
    }

    #[test]
    fn esb_subset_uses_bundled_positions_in_any_order() {
        for definition in [
            "messageFlowId:string\nhashCode:string",
            "hashCode:string\nmessageFlowId:string",
        ] {
            let layout = EventLayout::default_for(&OutputSchema::parse(definition).unwrap());
            assert_eq!(layout.position("messageFlowId"), Some(0), "{definition}");
            assert_eq!(layout.position("hashCode"), Some(2), "{definition}");
        }
    }

    #[test]
    fn foreign_schema_falls_back_to_schema_order() {
        let schema = OutputSchema::parse("component:string\nhost:string").unwrap();
        let layout = EventLayout::default_for(&schema);
        assert_eq!(layout, EventLayout::from_schema(&schema));
    }

    #[test]
    fn explicit_layout_keeps_given_order() {
        let layout = EventLayout::explicit(["x", "y", "z"]).unwrap();
        assert_eq!(layout.names().collect::<Vec<_>>(), ["x", "y", "z"]);
        assert_eq!(layout.position("z"), Some(2));
    }

    #[test]
    fn duplicate_names_rejected() {
        assert!(matches!(
            EventLayout::explicit(["x", "y", "x"]),
            Err(ConfigError::DuplicateLayoutName { ref name }) if name == "x"
        ));
    }
}
