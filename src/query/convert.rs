//! Bidirectional conversion between the query DSL and the logic form
//!
//! The two directions are semantic inverses but not byte-for-byte
//! round-trip safe: the DSL has redundant spellings (`must` and `filter`
//! both mean conjunction) that the logic form collapses, and glob patterns
//! are modeled as membership-in-pattern on the logic side.

use crate::config::FieldSet;
use crate::query::dsl::{BoolClauses, BoolQuery, Scalar, TermValue};
use crate::query::logic::{FieldRef, LogicNode};
use crate::query::parser::QueryParser;
use crate::query::resolver::resolve_nested;
use crate::Result;
use serde_json::Value;

/// Convert a DSL fragment to the generic logic form
///
/// `must`, `filter`, and negated `must_not` clauses all land in one
/// flattened conjunction; `should` becomes a disjunction. When a bool query
/// carries both, the disjunction is appended as the final conjunct (the
/// conjunction Elasticsearch itself applies when `must` is present).
pub fn to_logic(query: &BoolQuery) -> LogicNode {
    match query {
        BoolQuery::Bool(clauses) => bool_to_logic(clauses),
        BoolQuery::Term { field, value } => term_to_logic(field, value),
        BoolQuery::Exists { field } => exists_to_logic(field),
        BoolQuery::Wildcard { field, pattern } => wildcard_to_logic(field, pattern),
    }
}

/// Convert a logic tree back to the DSL
///
/// Conjunctions re-acquire the widget's two-level `bool.must` wrapper. A
/// flat equality whose field name contains a dot is wrapped in `bool.must`
/// but the `some` quantifier is not re-derived; only an explicit `some`
/// wrapper in the logic tree produces compound-field semantics.
pub fn to_query(logic: &LogicNode, fields: &FieldSet) -> BoolQuery {
    to_query_with(logic, fields, None)
}

/// Wire-level forward conversion: DSL JSON in, JsonLogic JSON out
///
/// Fails with [`crate::QueryBridgeError::UnsupportedQueryShape`] when the
/// input matches none of the recognized query shapes.
pub fn query_value_to_logic(query: &Value) -> Result<Value> {
    let parsed = QueryParser::parse(query)?;
    Ok(to_logic(&parsed).to_value())
}

/// Wire-level reverse conversion: JsonLogic JSON in, DSL JSON out
///
/// Fails with [`crate::QueryBridgeError::UnsupportedLogicShape`] when the
/// input uses an operator outside the recognized set.
pub fn logic_value_to_query(logic: &Value, fields: &FieldSet) -> Result<Value> {
    let parsed = LogicNode::from_value(logic)?;
    Ok(to_query(&parsed, fields).to_value())
}

fn bool_to_logic(clauses: &BoolClauses) -> LogicNode {
    let mut conjuncts = Vec::new();

    for query in &clauses.must {
        push_flattened(&mut conjuncts, to_logic(query));
    }
    for query in &clauses.filter {
        push_flattened(&mut conjuncts, to_logic(query));
    }
    for query in &clauses.must_not {
        conjuncts.push(LogicNode::not(to_logic(query)));
    }

    let disjunction = if clauses.should.is_empty() {
        None
    } else {
        Some(LogicNode::Or(
            clauses.should.iter().map(to_logic).collect(),
        ))
    };

    match disjunction {
        Some(or_node) if conjuncts.is_empty() => or_node,
        Some(or_node) => {
            conjuncts.push(or_node);
            LogicNode::And(conjuncts)
        }
        None => LogicNode::And(conjuncts),
    }
}

fn push_flattened(acc: &mut Vec<LogicNode>, node: LogicNode) {
    match node {
        LogicNode::And(children) => acc.extend(children),
        other => acc.push(other),
    }
}

fn term_to_logic(field: &str, value: &TermValue) -> LogicNode {
    if let Some((parent, child)) = field.split_once('.') {
        let condition = if value.is_many() {
            LogicNode::In(FieldRef::new(child), value.clone())
        } else {
            LogicNode::Equals(FieldRef::new(child), value.clone())
        };
        LogicNode::some(parent, condition)
    } else {
        // Flat fields compare directly, list payload or not
        LogicNode::Equals(FieldRef::new(field), value.clone())
    }
}

fn exists_to_logic(field: &str) -> LogicNode {
    // Existence of a nested field is checked at the parent level only
    let target = field.split_once('.').map_or(field, |(parent, _)| parent);
    LogicNode::Exists(FieldRef::new(target))
}

fn wildcard_to_logic(field: &str, pattern: &str) -> LogicNode {
    let value = TermValue::One(Scalar::from(pattern));
    if let Some((parent, child)) = field.split_once('.') {
        LogicNode::some(parent, LogicNode::In(FieldRef::new(child), value))
    } else {
        LogicNode::In(FieldRef::new(field), value)
    }
}

fn to_query_with(logic: &LogicNode, fields: &FieldSet, parent: Option<&str>) -> BoolQuery {
    match logic {
        LogicNode::And(items) => {
            let inner = BoolClauses {
                must: items
                    .iter()
                    .map(|item| to_query_with(item, fields, None))
                    .collect(),
                ..Default::default()
            };
            BoolQuery::Bool(BoolClauses::new().must(BoolQuery::Bool(inner)))
        }
        LogicNode::Or(items) => BoolQuery::Bool(BoolClauses {
            should: items
                .iter()
                .map(|item| to_query_with(item, fields, None))
                .collect(),
            ..Default::default()
        }),
        LogicNode::Not(inner) => {
            BoolQuery::Bool(BoolClauses::new().must_not(to_query_with(inner, fields, None)))
        }
        LogicNode::Equals(field, value) => {
            let term = BoolQuery::Term {
                field: compound_field(parent, &field.var),
                value: value.clone(),
            };
            if parent.is_none() && field.var.contains('.') {
                BoolQuery::Bool(BoolClauses::new().must(term))
            } else {
                term
            }
        }
        LogicNode::NotEquals(field, value) => {
            BoolQuery::Bool(BoolClauses::new().must_not(BoolQuery::Term {
                field: compound_field(parent, &field.var),
                value: value.clone(),
            }))
        }
        LogicNode::Exists(field) => {
            let resolved = resolve_nested(&field.var, fields).unwrap_or(&field.var);
            BoolQuery::exists(resolved)
        }
        LogicNode::Some(field, condition) => to_query_with(condition, fields, Some(&field.var)),
        LogicNode::In(field, value) => BoolQuery::Term {
            field: compound_field(parent, &field.var),
            value: value.clone(),
        },
    }
}

fn compound_field(parent: Option<&str>, var: &str) -> String {
    match parent {
        Some(parent) => format!("{}.{}", parent, var),
        None => var.to_string(),
    }
}
