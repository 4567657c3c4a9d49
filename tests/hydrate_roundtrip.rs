//! Integration tests for filter hydration and the lossy shape round trip
//!
//! These exercise the full path a saved search takes: persisted envelope ->
//! editable rule tree -> persisted envelope, asserting the multiset of
//! (field, operator, value) conditions survives even though node ids differ.

use querybridge::query::dsl::{BoolQuery, Scalar};
use querybridge::query::parser::QueryFilter;
use querybridge::testing::SequentialIdSource;
use querybridge::tree::{dehydrate, hydrate, hydrate_filter, Operator, RuleNode, RuleValue};
use querybridge::UuidIdSource;
use serde_json::json;

fn saved_search_filter() -> serde_json::Value {
    json!({
        "query": {
            "bool": {
                "must": [
                    { "bool": { "must": [
                        { "term": { "deleted": false } },
                        { "term": { "serviceType": "BigQuery" } },
                        { "bool": { "must_not": { "term": { "owner.id": "u1" } } } },
                        { "bool": { "should": [
                            { "term": { "tier.tagFQN": "Tier.Tier1" } },
                            { "term": { "tier.tagFQN": "Tier.Tier2" } }
                        ] } },
                        { "bool": { "should": [
                            { "bool": { "must_not": { "term": { "tags.tagFQN": "PII.Sensitive" } } } },
                            { "bool": { "must_not": { "term": { "tags.tagFQN": "PII.NonSensitive" } } } }
                        ] } },
                        { "bool": { "must_not": { "exists": { "field": "description" } } } },
                        { "exists": { "field": "owners" } },
                        { "wildcard": { "name": { "value": "*shop*" } } },
                        { "bool": { "must_not": { "wildcard": { "name": { "value": "*tmp*" } } } } }
                    ] } }
                ]
            }
        }
    })
}

/// The (field, operator, values) triple of one hydrated rule, for multiset
/// comparison across round trips
fn condition_triples(tree: &querybridge::RuleTree) -> Vec<(String, Operator, Vec<RuleValue>)> {
    let mut triples: Vec<_> = tree
        .rules()
        .iter()
        .map(|properties| {
            (
                properties.field.clone(),
                properties.operator,
                properties.value.clone(),
            )
        })
        .collect();
    triples.sort_by(|a, b| (&a.0, a.1.as_str()).cmp(&(&b.0, b.1.as_str())));
    triples
}

#[test]
fn test_hydrate_covers_every_canonical_shape() {
    let ids = SequentialIdSource::new();
    let tree = hydrate(&saved_search_filter(), &ids);

    let operators: Vec<Operator> = tree.rules().iter().map(|r| r.operator).collect();
    assert_eq!(
        operators,
        vec![
            Operator::Equal,
            Operator::SelectEquals,
            Operator::SelectNotEquals,
            Operator::SelectAnyIn,
            Operator::SelectNotAnyIn,
            Operator::IsNull,
            Operator::IsNotNull,
            Operator::Like,
            Operator::NotLike,
        ]
    );
}

#[test]
fn test_shape_round_trip_preserves_condition_multiset() {
    let ids = SequentialIdSource::new();
    let first = hydrate(&saved_search_filter(), &ids);

    let persisted = dehydrate(&first).unwrap();
    let second = hydrate_filter(&persisted, &ids);

    assert_eq!(condition_triples(&first), condition_triples(&second));
}

#[test]
fn test_round_trip_allocates_fresh_ids() {
    let ids = SequentialIdSource::new();
    let first = hydrate(&saved_search_filter(), &ids);
    let second = hydrate(&saved_search_filter(), &ids);

    assert_ne!(first.root.id(), second.root.id());
    assert_eq!(condition_triples(&first), condition_triples(&second));
}

#[test]
fn test_hydrate_with_uuid_source() {
    let ids = UuidIdSource;
    let tree = hydrate(&saved_search_filter(), &ids);
    assert_eq!(tree.rules().len(), 9);
}

#[test]
fn test_boolean_deleted_rule_scenario() {
    let ids = SequentialIdSource::new();
    let filter = QueryFilter::from_fragments(vec![BoolQuery::term("deleted", Scalar::Bool(true))]);
    let tree = hydrate_filter(&filter, &ids);

    let rules = tree.rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].operator, Operator::Equal);
    assert_eq!(rules[0].field, "deleted");
    assert_eq!(rules[0].value, vec![RuleValue::Scalar(Scalar::Bool(true))]);
}

#[test]
fn test_any_in_rule_scenario() {
    let ids = SequentialIdSource::new();
    let filter = json!({
        "query": { "bool": { "must": [
            { "bool": { "must": [
                { "bool": { "should": [
                    { "term": { "owner.id": "u1" } },
                    { "term": { "owner.id": "u2" } }
                ] } }
            ] } }
        ] } }
    });
    let tree = hydrate(&filter, &ids);

    let rules = tree.rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].operator, Operator::SelectAnyIn);
    assert_eq!(rules[0].field, "owner.id");
    assert_eq!(
        rules[0].value,
        vec![RuleValue::List(vec![
            Scalar::from("u1"),
            Scalar::from("u2")
        ])]
    );
}

#[test]
fn test_malformed_envelope_returns_empty_group() {
    let ids = SequentialIdSource::new();

    for malformed in [
        json!({}),
        json!({ "query": {} }),
        json!({ "query": { "bool": {} } }),
        json!({ "query": { "bool": { "must": [] } } }),
        json!({ "query": { "term": { "deleted": false } } }),
        json!(null),
        json!("not an object"),
    ] {
        let tree = hydrate(&malformed, &ids);
        let RuleNode::Group { children1, .. } = &tree.root else {
            panic!("root must be a group");
        };
        assert!(children1.is_empty(), "expected empty tree for {malformed}");
    }
}

#[test]
fn test_dehydrated_envelope_keeps_widget_wrapper_shape() {
    let ids = SequentialIdSource::new();
    let tree = hydrate(&saved_search_filter(), &ids);
    let wire = dehydrate(&tree).unwrap().to_value();

    let fragments = wire
        .pointer("/query/bool/must/0/bool/must")
        .and_then(serde_json::Value::as_array)
        .expect("two-level envelope");
    assert_eq!(fragments.len(), 9);

    // Spot-check single-object must_not emission
    assert_eq!(
        fragments[2],
        json!({ "bool": { "must_not": { "term": { "owner.id": "u1" } } } })
    );
}

#[test]
fn test_rule_tree_widget_json_shape() {
    let ids = SequentialIdSource::new();
    let filter = QueryFilter::from_fragments(vec![BoolQuery::term(
        "serviceType",
        Scalar::from("BigQuery"),
    )]);
    let tree = hydrate_filter(&filter, &ids);

    assert_eq!(
        tree.to_value(),
        json!({
            "type": "group",
            "id": "node-0",
            "path": ["node-0"],
            "properties": { "conjunction": "AND", "not": false },
            "children1": {
                "node-1": {
                    "type": "group",
                    "id": "node-1",
                    "path": ["node-0", "node-1"],
                    "properties": { "conjunction": "AND", "not": false },
                    "children1": {
                        "node-2": {
                            "type": "rule",
                            "id": "node-2",
                            "path": ["node-0", "node-1", "node-2"],
                            "properties": {
                                "field": "serviceType",
                                "operator": "select_equals",
                                "value": ["BigQuery"],
                                "valueSrc": ["value"],
                                "operatorOptions": null,
                                "valueType": ["select"],
                                "asyncListValues": [
                                    { "key": "BigQuery", "value": "BigQuery", "children": "BigQuery" }
                                ]
                            }
                        }
                    }
                }
            }
        })
    );
}
