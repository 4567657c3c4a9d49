//! Nested-field resolution
//!
//! Fields addressed as `parent.child` live under an array-of-objects mapping
//! in the search index. Given a bare parent name, the resolver finds the
//! configured compound key it expands to, if any.

use crate::config::FieldSet;

/// Resolve a bare field name to the first configured field under it
///
/// Returns the first known field starting with `"<field>."`, scanning in
/// configuration order, or `None` when the field is flat or unknown.
pub fn resolve_nested<'a>(field: &str, fields: &'a FieldSet) -> Option<&'a str> {
    let prefix = format!("{}.", field);
    fields.names().find(|name| name.starts_with(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;

    #[test]
    fn test_resolves_first_configured_key() {
        let fields = FieldSet::new()
            .with_field("tags.tagFQN", FieldConfig::new("Tags"))
            .with_field("tags.source", FieldConfig::new("Tag source"));

        assert_eq!(resolve_nested("tags", &fields), Some("tags.tagFQN"));
    }

    #[test]
    fn test_flat_or_unknown_field() {
        let fields = FieldSet::new().with_field("name", FieldConfig::new("Name"));

        assert_eq!(resolve_nested("name", &fields), None);
        assert_eq!(resolve_nested("tags", &fields), None);
    }

    #[test]
    fn test_prefix_must_end_at_dot() {
        let fields = FieldSet::new().with_field("tagsExtra.id", FieldConfig::new("Extra"));

        assert_eq!(resolve_nested("tags", &fields), None);
    }
}
