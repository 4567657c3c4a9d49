use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Widget-side typing of a configured field's values
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldValueType {
    /// Single choice from a closed list
    #[default]
    Select,
    /// Multiple choices from a closed list
    MultiSelect,
    /// Free-form text (wildcard matching)
    Text,
    /// Boolean flag
    Boolean,
}

/// Metadata for one configured query-builder field
///
/// The engine never validates that a field exists in the search index; this
/// is a mirror of whatever configuration the caller hands to the widget.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Display label shown by the widget
    pub label: String,
    /// Value typing used when rendering the field's rules
    #[serde(default)]
    pub value_type: FieldValueType,
}

impl FieldConfig {
    /// Create a field configuration with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value_type: FieldValueType::default(),
        }
    }

    /// Set the value typing
    pub fn with_value_type(mut self, value_type: FieldValueType) -> Self {
        self.value_type = value_type;
        self
    }
}

/// The set of fields known to the query-builder configuration
///
/// Iteration order is configuration (insertion) order; the nested-field
/// resolver depends on this when several configured keys share a prefix.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: IndexMap<String, FieldConfig>,
}

impl FieldSet {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configured field
    pub fn with_field(mut self, name: impl Into<String>, config: FieldConfig) -> Self {
        self.fields.insert(name.into(), config);
        self
    }

    /// Insert a configured field in place
    pub fn insert(&mut self, name: impl Into<String>, config: FieldConfig) {
        self.fields.insert(name.into(), config);
    }

    /// Check whether a field name is configured
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Look up a field's configuration
    pub fn get(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.get(name)
    }

    /// Iterate field names in configuration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of configured fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether no fields are configured
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
