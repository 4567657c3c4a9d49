//! Query-shape classification
//!
//! Maps one DSL fragment (already extracted from the envelope's `must` list)
//! to the rule shape the widget edits it as. The rules form an ordered
//! decision table; several shapes are structurally similar, so first match
//! wins and the order below is load-bearing.

use crate::query::dsl::{BoolClauses, BoolQuery, Scalar, TermValue};
use crate::tree::node::Operator;

/// Widget value typing for a classified condition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Boolean flag rule
    Boolean,
    /// Single choice
    Select,
    /// Multiple choices
    MultiSelect,
    /// Free-form text (glob patterns)
    Text,
    /// No value payload (presence checks)
    Empty,
}

/// One leaf condition extracted from a DSL fragment
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedCondition {
    pub field: String,
    pub operator: Operator,
    pub values: Vec<Scalar>,
    pub kind: ValueKind,
}

/// Classify a single DSL fragment, or `None` when no rule shape matches
///
/// Unrecognized fragments are dropped by the hydrator: a user-saved filter
/// may contain hand-authored DSL the widget cannot represent, and partial
/// hydration is preferable to refusing to open the editor.
pub fn classify(fragment: &BoolQuery) -> Option<ClassifiedCondition> {
    match fragment {
        BoolQuery::Term { field, value } => {
            // Boolean soft-delete flag gets its own operator
            if field == "deleted" {
                if let Some(Scalar::Bool(flag)) = value.as_one() {
                    return Some(ClassifiedCondition {
                        field: field.clone(),
                        operator: Operator::Equal,
                        values: vec![Scalar::Bool(*flag)],
                        kind: ValueKind::Boolean,
                    });
                }
            }
            Some(equality(field, value, Operator::SelectEquals))
        }
        BoolQuery::Bool(clauses) => classify_bool(clauses),
        BoolQuery::Exists { field } => Some(ClassifiedCondition {
            field: field.clone(),
            operator: Operator::IsNotNull,
            values: Vec::new(),
            kind: ValueKind::Empty,
        }),
        BoolQuery::Wildcard { field, pattern } => Some(glob(field, pattern, Operator::Like)),
    }
}

fn classify_bool(clauses: &BoolClauses) -> Option<ClassifiedCondition> {
    // Negated term
    if let Some(BoolQuery::Term { field, value }) = clauses.single_must_not() {
        let operator = if value.is_many() {
            Operator::SelectNotAnyIn
        } else {
            Operator::SelectNotEquals
        };
        return Some(equality(field, value, operator));
    }

    // "Any of" / "none of" via should
    if let Some(condition) = classify_should_terms(&clauses.should) {
        return Some(condition);
    }
    if let Some(condition) = classify_should_negated_terms(&clauses.should) {
        return Some(condition);
    }

    // Negated presence and negated glob
    if let Some(BoolQuery::Exists { field }) = clauses.single_must_not() {
        return Some(ClassifiedCondition {
            field: field.clone(),
            operator: Operator::IsNull,
            values: Vec::new(),
            kind: ValueKind::Empty,
        });
    }
    if let Some(BoolQuery::Wildcard { field, pattern }) = clauses.single_must_not() {
        return Some(glob(field, pattern, Operator::NotLike));
    }

    None
}

/// `should: [term, term, ...]`, every element a bare term on one field
fn classify_should_terms(should: &[BoolQuery]) -> Option<ClassifiedCondition> {
    let mut shared_field: Option<&str> = None;
    let mut values = Vec::new();

    if should.is_empty() {
        return None;
    }
    for element in should {
        let BoolQuery::Term { field, value } = element else {
            return None;
        };
        if *shared_field.get_or_insert(field.as_str()) != field.as_str() {
            return None;
        }
        extend_values(&mut values, value);
    }

    Some(ClassifiedCondition {
        field: shared_field?.to_string(),
        operator: Operator::SelectAnyIn,
        values,
        kind: ValueKind::MultiSelect,
    })
}

/// `should: [{bool: {must_not: term}}, ...]`, every element negating one field
fn classify_should_negated_terms(should: &[BoolQuery]) -> Option<ClassifiedCondition> {
    let mut shared_field: Option<&str> = None;
    let mut values = Vec::new();

    if should.is_empty() {
        return None;
    }
    for element in should {
        let BoolQuery::Bool(inner) = element else {
            return None;
        };
        let Some(BoolQuery::Term { field, value }) = inner.single_must_not() else {
            return None;
        };
        if *shared_field.get_or_insert(field.as_str()) != field.as_str() {
            return None;
        }
        extend_values(&mut values, value);
    }

    Some(ClassifiedCondition {
        field: shared_field?.to_string(),
        operator: Operator::SelectNotAnyIn,
        values,
        kind: ValueKind::MultiSelect,
    })
}

fn extend_values(values: &mut Vec<Scalar>, value: &TermValue) {
    match value {
        TermValue::One(scalar) => values.push(scalar.clone()),
        TermValue::Many(scalars) => values.extend(scalars.iter().cloned()),
    }
}

fn equality(field: &str, value: &TermValue, operator: Operator) -> ClassifiedCondition {
    match value {
        TermValue::One(scalar) => ClassifiedCondition {
            field: field.to_string(),
            operator,
            values: vec![scalar.clone()],
            kind: ValueKind::Select,
        },
        TermValue::Many(scalars) => ClassifiedCondition {
            field: field.to_string(),
            operator,
            values: scalars.clone(),
            kind: ValueKind::MultiSelect,
        },
    }
}

fn glob(field: &str, pattern: &str, operator: Operator) -> ClassifiedCondition {
    ClassifiedCondition {
        field: field.to_string(),
        operator,
        values: vec![Scalar::String(strip_glob(pattern).to_string())],
        kind: ValueKind::Text,
    }
}

/// Strip one wrapping `*` from each end of a glob pattern
fn strip_glob(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('*').unwrap_or(pattern);
    pattern.strip_suffix('*').unwrap_or(pattern)
}
