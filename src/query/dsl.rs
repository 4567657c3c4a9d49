//! Search-engine boolean query DSL
//!
//! A closed variant type covering the subset of the Elasticsearch Query DSL
//! that the query builder persists: `term`, `wildcard`, `exists`, and `bool`
//! with `must`/`should`/`filter`/`must_not` clause lists. Exactly one shape
//! is populated per fragment.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A single scalar term value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean flag (e.g. the `deleted` soft-delete marker)
    Bool(bool),
    /// 64-bit integer
    Long(i64),
    /// 64-bit floating point
    Double(f64),
    /// String (keywords, fully-qualified names)
    String(String),
}

impl Scalar {
    /// Convert to a JSON value
    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Long(n) => json!(n),
            Scalar::Double(f) => json!(f),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }

    /// Parse from a JSON value, if it is scalar
    pub fn from_value(value: &Value) -> Option<Scalar> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Scalar::Long(i))
                } else {
                    n.as_f64().map(Scalar::Double)
                }
            }
            Value::String(s) => Some(Scalar::String(s.clone())),
            _ => None,
        }
    }

    /// Return the boolean payload, if this is a boolean scalar
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the string payload, if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Long(n)
    }
}

/// A term payload: one scalar, or a list of scalars
///
/// Elasticsearch treats a term against an array field as "any element
/// equals"; saved filters use the list form for membership conditions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermValue {
    /// Single scalar value
    One(Scalar),
    /// List of scalar values
    Many(Vec<Scalar>),
}

impl TermValue {
    /// Return the single scalar, if this is not a list
    pub fn as_one(&self) -> Option<&Scalar> {
        match self {
            TermValue::One(s) => Some(s),
            TermValue::Many(_) => None,
        }
    }

    /// Return the list payload, if this is a list
    pub fn as_many(&self) -> Option<&[Scalar]> {
        match self {
            TermValue::One(_) => None,
            TermValue::Many(items) => Some(items),
        }
    }

    /// Whether this payload is a list
    pub fn is_many(&self) -> bool {
        matches!(self, TermValue::Many(_))
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> Value {
        match self {
            TermValue::One(s) => s.to_value(),
            TermValue::Many(items) => Value::Array(items.iter().map(Scalar::to_value).collect()),
        }
    }

    /// Parse from a JSON value
    pub fn from_value(value: &Value) -> Option<TermValue> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(Scalar::from_value)
                .collect::<Option<Vec<_>>>()
                .map(TermValue::Many),
            other => Scalar::from_value(other).map(TermValue::One),
        }
    }
}

impl From<Scalar> for TermValue {
    fn from(s: Scalar) -> Self {
        TermValue::One(s)
    }
}

impl From<Vec<Scalar>> for TermValue {
    fn from(items: Vec<Scalar>) -> Self {
        TermValue::Many(items)
    }
}

/// Clause lists of a `bool` query
///
/// `must` and `filter` are both conjunctive; `should` is disjunctive;
/// `must_not` excludes. The wire form of `must_not` may be a single object
/// or a list; it is normalized to a list here and serialized back as a
/// single object when it holds exactly one clause.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoolClauses {
    /// Clauses that must match (AND)
    pub must: Vec<BoolQuery>,
    /// Clauses where at least one should match (OR)
    pub should: Vec<BoolQuery>,
    /// Clauses that must match without scoring (AND)
    pub filter: Vec<BoolQuery>,
    /// Clauses that must not match (NOT)
    pub must_not: Vec<BoolQuery>,
}

impl BoolClauses {
    /// Create an empty clause set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a must clause
    pub fn must(mut self, query: BoolQuery) -> Self {
        self.must.push(query);
        self
    }

    /// Add a should clause
    pub fn should(mut self, query: BoolQuery) -> Self {
        self.should.push(query);
        self
    }

    /// Add a filter clause
    pub fn filter(mut self, query: BoolQuery) -> Self {
        self.filter.push(query);
        self
    }

    /// Add a must_not clause
    pub fn must_not(mut self, query: BoolQuery) -> Self {
        self.must_not.push(query);
        self
    }

    /// Check if all clause lists are empty
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.should.is_empty()
            && self.filter.is_empty()
            && self.must_not.is_empty()
    }

    /// The sole must_not clause, when `must_not` holds exactly one entry
    pub fn single_must_not(&self) -> Option<&BoolQuery> {
        match self.must_not.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }
}

/// One fragment of the boolean query DSL
#[derive(Clone, Debug, PartialEq)]
pub enum BoolQuery {
    /// Exact match: `{"term": {"<field>": <value>}}`
    Term { field: String, value: TermValue },
    /// Glob match: `{"wildcard": {"<field>": {"value": "<pattern>"}}}`
    Wildcard { field: String, pattern: String },
    /// Field presence: `{"exists": {"field": "<field>"}}`
    Exists { field: String },
    /// Boolean combination of sub-queries
    Bool(BoolClauses),
}

impl BoolQuery {
    /// Create a term query
    pub fn term(field: impl Into<String>, value: impl Into<TermValue>) -> Self {
        BoolQuery::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a wildcard query
    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        BoolQuery::Wildcard {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Create an exists query
    pub fn exists(field: impl Into<String>) -> Self {
        BoolQuery::Exists {
            field: field.into(),
        }
    }

    /// The clause set, when this fragment is a bool query
    pub fn as_bool(&self) -> Option<&BoolClauses> {
        match self {
            BoolQuery::Bool(clauses) => Some(clauses),
            _ => None,
        }
    }

    /// Serialize to the Elasticsearch wire shape
    pub fn to_value(&self) -> Value {
        match self {
            BoolQuery::Term { field, value } => {
                json!({ "term": { field.clone(): value.to_value() } })
            }
            BoolQuery::Wildcard { field, pattern } => {
                json!({ "wildcard": { field.clone(): { "value": pattern.clone() } } })
            }
            BoolQuery::Exists { field } => {
                json!({ "exists": { "field": field.clone() } })
            }
            BoolQuery::Bool(clauses) => {
                let mut body = Map::new();
                if !clauses.must.is_empty() {
                    body.insert("must".to_string(), clause_array(&clauses.must));
                }
                if !clauses.should.is_empty() {
                    body.insert("should".to_string(), clause_array(&clauses.should));
                }
                if !clauses.filter.is_empty() {
                    body.insert("filter".to_string(), clause_array(&clauses.filter));
                }
                match clauses.must_not.as_slice() {
                    [] => {}
                    [single] => {
                        body.insert("must_not".to_string(), single.to_value());
                    }
                    many => {
                        body.insert(
                            "must_not".to_string(),
                            Value::Array(many.iter().map(BoolQuery::to_value).collect()),
                        );
                    }
                }
                json!({ "bool": body })
            }
        }
    }
}

impl From<BoolClauses> for BoolQuery {
    fn from(clauses: BoolClauses) -> Self {
        BoolQuery::Bool(clauses)
    }
}

fn clause_array(clauses: &[BoolQuery]) -> Value {
    Value::Array(clauses.iter().map(BoolQuery::to_value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_wire_shape() {
        let query = BoolQuery::term("owner.id", Scalar::from("u1"));
        assert_eq!(query.to_value(), json!({ "term": { "owner.id": "u1" } }));
    }

    #[test]
    fn test_term_array_wire_shape() {
        let query = BoolQuery::term(
            "tags.tagFQN",
            vec![Scalar::from("PII.Sensitive"), Scalar::from("Tier.Tier1")],
        );
        assert_eq!(
            query.to_value(),
            json!({ "term": { "tags.tagFQN": ["PII.Sensitive", "Tier.Tier1"] } })
        );
    }

    #[test]
    fn test_wildcard_wire_shape() {
        let query = BoolQuery::wildcard("name", "*shop*");
        assert_eq!(
            query.to_value(),
            json!({ "wildcard": { "name": { "value": "*shop*" } } })
        );
    }

    #[test]
    fn test_bool_must_not_single_object() {
        let query = BoolQuery::Bool(
            BoolClauses::new().must_not(BoolQuery::term("owner.id", Scalar::from("u1"))),
        );
        assert_eq!(
            query.to_value(),
            json!({ "bool": { "must_not": { "term": { "owner.id": "u1" } } } })
        );
    }

    #[test]
    fn test_bool_must_not_list() {
        let query = BoolQuery::Bool(
            BoolClauses::new()
                .must_not(BoolQuery::exists("description"))
                .must_not(BoolQuery::exists("owners")),
        );
        assert_eq!(
            query.to_value(),
            json!({ "bool": { "must_not": [
                { "exists": { "field": "description" } },
                { "exists": { "field": "owners" } }
            ] } })
        );
    }

    #[test]
    fn test_empty_clause_lists_omitted() {
        let query = BoolQuery::Bool(BoolClauses::new().must(BoolQuery::exists("owners")));
        assert_eq!(
            query.to_value(),
            json!({ "bool": { "must": [{ "exists": { "field": "owners" } }] } })
        );
    }

    #[test]
    fn test_scalar_from_value() {
        assert_eq!(Scalar::from_value(&json!(true)), Some(Scalar::Bool(true)));
        assert_eq!(Scalar::from_value(&json!(3)), Some(Scalar::Long(3)));
        assert_eq!(Scalar::from_value(&json!(1.5)), Some(Scalar::Double(1.5)));
        assert_eq!(
            Scalar::from_value(&json!("x")),
            Some(Scalar::String("x".to_string()))
        );
        assert_eq!(Scalar::from_value(&json!({})), None);
    }

    #[test]
    fn test_term_value_from_value() {
        assert_eq!(
            TermValue::from_value(&json!(["a", "b"])),
            Some(TermValue::Many(vec![
                Scalar::from("a"),
                Scalar::from("b")
            ]))
        );
        assert!(TermValue::from_value(&json!("a")).unwrap().as_one().is_some());
        assert_eq!(TermValue::from_value(&json!([1, {}])), None);
    }
}
