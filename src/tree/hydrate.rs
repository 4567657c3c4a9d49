//! Rule-tree hydration and dehydration
//!
//! Hydration reconstructs an editable rule tree from a persisted
//! `queryFilter` so a user can resume editing a saved search, alert, or
//! policy. Dehydration serializes the tree back to the same envelope for
//! persistence and for the search backend.

use crate::error::QueryBridgeError;
use crate::query::dsl::{BoolClauses, BoolQuery, Scalar, TermValue};
use crate::query::parser::QueryFilter;
use crate::tree::classify::{classify, ClassifiedCondition, ValueKind};
use crate::tree::id::{child_path, IdSource, RuleId};
use crate::tree::node::{
    GroupProperties, ListValue, Operator, RuleNode, RuleProperties, RuleTree, RuleValue,
};
use crate::Result;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Hydrate a persisted `queryFilter` JSON object into a rule tree
///
/// A filter that does not match the two-level envelope yields an empty tree
/// rather than an error; a missing or malformed saved filter is a normal
/// state and the editor opens blank.
pub fn hydrate(filter: &Value, ids: &dyn IdSource) -> RuleTree {
    match QueryFilter::parse(filter) {
        Ok(parsed) => hydrate_filter(&parsed, ids),
        Err(err) => {
            debug!(error = %err, "treating persisted filter as absent");
            RuleTree::empty(ids)
        }
    }
}

/// Hydrate an already-parsed envelope into a rule tree
///
/// Produces the two-level scaffold the widget expects: a root group holding
/// a single inner group, with one rule per classifiable fragment.
/// Unclassifiable fragments are dropped, never fabricated or merged.
pub fn hydrate_filter(filter: &QueryFilter, ids: &dyn IdSource) -> RuleTree {
    let root_id = ids.next_id();
    let inner_id = ids.next_id();
    let root_path = vec![root_id.clone()];
    let inner_path = child_path(&root_path, &inner_id);

    let mut rules = IndexMap::new();
    for fragment in &filter.fragments {
        match classify(fragment) {
            Some(condition) => {
                let id = ids.next_id();
                let node = rule_node(&inner_path, id.clone(), condition);
                rules.insert(id, node);
            }
            None => {
                debug!("dropping filter fragment the rule tree cannot represent");
            }
        }
    }

    let mut inner_children = IndexMap::new();
    inner_children.insert(
        inner_id.clone(),
        RuleNode::Group {
            id: inner_id,
            path: inner_path,
            properties: GroupProperties::default(),
            children1: rules,
        },
    );

    RuleTree {
        root: RuleNode::Group {
            id: root_id,
            path: root_path,
            properties: GroupProperties::default(),
            children1: inner_children,
        },
    }
}

/// Serialize a rule tree back to the `queryFilter` envelope
///
/// The inverse of the classification table: each rule becomes the DSL shape
/// its operator hydrates from. Fails with
/// [`QueryBridgeError::InvalidRequest`] when a rule is missing the value its
/// operator requires.
pub fn dehydrate(tree: &RuleTree) -> Result<QueryFilter> {
    let mut fragments = Vec::new();
    collect_fragments(&tree.root, &mut fragments)?;
    Ok(QueryFilter::from_fragments(fragments))
}

fn collect_fragments(node: &RuleNode, out: &mut Vec<BoolQuery>) -> Result<()> {
    match node {
        RuleNode::Group { children1, .. } => {
            for child in children1.values() {
                collect_fragments(child, out)?;
            }
            Ok(())
        }
        RuleNode::Rule { properties, .. } => {
            out.push(rule_to_fragment(properties)?);
            Ok(())
        }
    }
}

fn rule_node(parent_path: &[RuleId], id: RuleId, condition: ClassifiedCondition) -> RuleNode {
    let path = child_path(parent_path, &id);
    RuleNode::Rule {
        id,
        path,
        properties: rule_properties(condition),
    }
}

fn rule_properties(condition: ClassifiedCondition) -> RuleProperties {
    let ClassifiedCondition {
        field,
        operator,
        values,
        kind,
    } = condition;

    let (value, value_src, value_type, async_list_values) = match kind {
        ValueKind::Boolean => (
            values.iter().cloned().map(RuleValue::Scalar).collect(),
            vec!["value".to_string()],
            vec![crate::config::FieldValueType::Boolean],
            None,
        ),
        ValueKind::Select => (
            values.iter().cloned().map(RuleValue::Scalar).collect(),
            vec!["value".to_string()],
            vec![crate::config::FieldValueType::Select],
            Some(values.iter().map(ListValue::of).collect()),
        ),
        ValueKind::MultiSelect => (
            vec![RuleValue::List(values.clone())],
            vec!["value".to_string()],
            vec![crate::config::FieldValueType::MultiSelect],
            Some(values.iter().map(ListValue::of).collect()),
        ),
        ValueKind::Text => (
            values.iter().cloned().map(RuleValue::Scalar).collect(),
            vec!["value".to_string()],
            vec![crate::config::FieldValueType::Text],
            None,
        ),
        ValueKind::Empty => (Vec::new(), Vec::new(), Vec::new(), None),
    };

    RuleProperties {
        field,
        operator,
        value,
        value_src,
        operator_options: None,
        value_type,
        async_list_values,
    }
}

fn rule_to_fragment(properties: &RuleProperties) -> Result<BoolQuery> {
    let field = properties.field.clone();

    match properties.operator {
        Operator::Equal | Operator::SelectEquals => Ok(BoolQuery::Term {
            value: term_value(properties)?,
            field,
        }),
        Operator::SelectNotEquals => Ok(BoolQuery::Bool(
            BoolClauses::new().must_not(BoolQuery::Term {
                value: term_value(properties)?,
                field,
            }),
        )),
        Operator::SelectAnyIn => {
            let clauses = scalar_values(properties)?
                .into_iter()
                .fold(BoolClauses::new(), |clauses, scalar| {
                    clauses.should(BoolQuery::term(field.clone(), scalar))
                });
            Ok(BoolQuery::Bool(clauses))
        }
        Operator::SelectNotAnyIn => {
            let clauses = scalar_values(properties)?
                .into_iter()
                .fold(BoolClauses::new(), |clauses, scalar| {
                    clauses.should(BoolQuery::Bool(
                        BoolClauses::new().must_not(BoolQuery::term(field.clone(), scalar)),
                    ))
                });
            Ok(BoolQuery::Bool(clauses))
        }
        Operator::IsNull => Ok(BoolQuery::Bool(
            BoolClauses::new().must_not(BoolQuery::exists(field)),
        )),
        Operator::IsNotNull => Ok(BoolQuery::exists(field)),
        Operator::Like => Ok(BoolQuery::wildcard(field, wrap_glob(text_value(properties)?))),
        Operator::NotLike => Ok(BoolQuery::Bool(BoolClauses::new().must_not(
            BoolQuery::wildcard(field, wrap_glob(text_value(properties)?)),
        ))),
    }
}

fn term_value(properties: &RuleProperties) -> Result<TermValue> {
    match properties.value.first() {
        Some(RuleValue::Scalar(scalar)) => Ok(TermValue::One(scalar.clone())),
        Some(RuleValue::List(scalars)) => Ok(TermValue::Many(scalars.clone())),
        None => Err(missing_value(properties)),
    }
}

fn scalar_values(properties: &RuleProperties) -> Result<Vec<Scalar>> {
    let mut scalars = Vec::new();
    for value in &properties.value {
        match value {
            RuleValue::Scalar(scalar) => scalars.push(scalar.clone()),
            RuleValue::List(items) => scalars.extend(items.iter().cloned()),
        }
    }
    if scalars.is_empty() {
        return Err(missing_value(properties));
    }
    Ok(scalars)
}

fn text_value(properties: &RuleProperties) -> Result<&str> {
    match properties.value.first() {
        Some(RuleValue::Scalar(Scalar::String(text))) => Ok(text),
        _ => Err(missing_value(properties)),
    }
}

/// Re-wrap the glob stars stripped at classification time
fn wrap_glob(text: &str) -> String {
    format!("*{}*", text)
}

fn missing_value(properties: &RuleProperties) -> QueryBridgeError {
    QueryBridgeError::InvalidRequest(format!(
        "rule on '{}' has no usable value for operator '{}'",
        properties.field,
        properties.operator.as_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SequentialIdSource;
    use serde_json::json;

    fn sample_filter() -> Value {
        QueryFilter::from_fragments(vec![
            BoolQuery::term("deleted", Scalar::Bool(false)),
            BoolQuery::term("owner.id", Scalar::from("u1")),
        ])
        .to_value()
    }

    #[test]
    fn test_hydrate_builds_two_level_scaffold() {
        let ids = SequentialIdSource::new();
        let tree = hydrate(&sample_filter(), &ids);

        let RuleNode::Group { children1, path, .. } = &tree.root else {
            panic!("root must be a group");
        };
        assert_eq!(path.len(), 1);
        assert_eq!(children1.len(), 1);

        let inner = children1.values().next().unwrap();
        let RuleNode::Group {
            children1: rules,
            path: inner_path,
            ..
        } = inner
        else {
            panic!("inner node must be a group");
        };
        assert_eq!(inner_path.len(), 2);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_hydrated_rule_paths_chain_ancestor_ids() {
        let ids = SequentialIdSource::new();
        let tree = hydrate(&sample_filter(), &ids);

        let RuleNode::Group { children1, id, .. } = &tree.root else {
            panic!("root must be a group");
        };
        let root_id = id.clone();
        let RuleNode::Group { children1: rules, id: inner_id, .. } =
            children1.values().next().unwrap()
        else {
            panic!("inner node must be a group");
        };

        for rule in rules.values() {
            assert_eq!(
                rule.path(),
                &[root_id.clone(), inner_id.clone(), rule.id().clone()]
            );
        }
    }

    #[test]
    fn test_hydrate_drops_unrecognized_fragments() {
        let filter = QueryFilter::from_fragments(vec![
            BoolQuery::term("deleted", Scalar::Bool(true)),
            // A bare conjunction matches no classifier row
            BoolQuery::Bool(BoolClauses::new().must(BoolQuery::exists("owners"))),
        ])
        .to_value();

        let ids = SequentialIdSource::new();
        let tree = hydrate(&filter, &ids);
        assert_eq!(tree.rules().len(), 1);
    }

    #[test]
    fn test_malformed_envelope_yields_empty_group() {
        let ids = SequentialIdSource::new();
        let tree = hydrate(&json!({ "query": { "term": { "deleted": false } } }), &ids);

        let RuleNode::Group { children1, .. } = &tree.root else {
            panic!("root must be a group");
        };
        assert!(children1.is_empty());
    }

    #[test]
    fn test_hydrate_ids_unique_within_tree() {
        let ids = SequentialIdSource::new();
        let tree = hydrate(&sample_filter(), &ids);

        let mut seen = std::collections::HashSet::new();
        fn walk(node: &RuleNode, seen: &mut std::collections::HashSet<RuleId>) {
            assert!(seen.insert(node.id().clone()), "duplicate id {}", node.id());
            if let RuleNode::Group { children1, .. } = node {
                for child in children1.values() {
                    walk(child, seen);
                }
            }
        }
        walk(&tree.root, &mut seen);
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_dehydrate_inverts_classification() {
        let ids = SequentialIdSource::new();
        let original = QueryFilter::from_fragments(vec![
            BoolQuery::term("deleted", Scalar::Bool(false)),
            BoolQuery::exists("owners"),
            BoolQuery::wildcard("name", "*shop*"),
        ]);

        let tree = hydrate_filter(&original, &ids);
        let round_tripped = dehydrate(&tree).unwrap();
        assert_eq!(round_tripped, original);
    }

    #[test]
    fn test_dehydrate_empty_tree() {
        let ids = SequentialIdSource::new();
        let filter = dehydrate(&RuleTree::empty(&ids)).unwrap();
        assert!(filter.fragments.is_empty());
    }

    #[test]
    fn test_dehydrate_rejects_valueless_like() {
        let properties = RuleProperties {
            field: "name".to_string(),
            operator: Operator::Like,
            value: Vec::new(),
            value_src: Vec::new(),
            operator_options: None,
            value_type: Vec::new(),
            async_list_values: None,
        };
        let tree = RuleTree {
            root: RuleNode::Rule {
                id: "r".to_string(),
                path: vec!["r".to_string()],
                properties,
            },
        };

        assert!(matches!(
            dehydrate(&tree),
            Err(QueryBridgeError::InvalidRequest(_))
        ));
    }
}
