//! Query DSL parser
//!
//! Parses the persisted JSON query DSL into [`BoolQuery`] fragments and the
//! two-level `queryFilter` envelope the visual query builder serializes.
//! The syntax is compatible with a subset of the Elasticsearch Query DSL.

use crate::error::QueryBridgeError;
use crate::query::dsl::{BoolClauses, BoolQuery, TermValue};
use crate::Result;
use serde_json::{json, Map, Value};

/// Query parser for the JSON DSL
pub struct QueryParser;

impl QueryParser {
    /// Parse a JSON query fragment into a [`BoolQuery`]
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "bool": {
    ///     "must": [
    ///       { "term": { "deleted": false } }
    ///     ],
    ///     "must_not": { "exists": { "field": "owners" } }
    ///   }
    /// }
    /// ```
    pub fn parse(json: &Value) -> Result<BoolQuery> {
        match json {
            Value::Object(map) => Self::parse_query_object(map),
            _ => Err(QueryBridgeError::InvalidRequest(
                "Query must be a JSON object".to_string(),
            )),
        }
    }

    /// Parse a JSON string into a [`BoolQuery`]
    pub fn parse_str(json_str: &str) -> Result<BoolQuery> {
        let value: Value = serde_json::from_str(json_str)
            .map_err(|e| QueryBridgeError::InvalidRequest(format!("Invalid JSON: {}", e)))?;
        Self::parse(&value)
    }

    fn parse_query_object(map: &Map<String, Value>) -> Result<BoolQuery> {
        // Handle wrapped query: { "query": { ... } }
        if let Some(query) = map.get("query") {
            return Self::parse(query);
        }

        if let Some(bool_query) = map.get("bool") {
            return Self::parse_bool(bool_query);
        }
        if let Some(term_query) = map.get("term") {
            return Self::parse_term(term_query);
        }
        if let Some(exists_query) = map.get("exists") {
            return Self::parse_exists(exists_query);
        }
        if let Some(wildcard_query) = map.get("wildcard") {
            return Self::parse_wildcard(wildcard_query);
        }

        Err(QueryBridgeError::UnsupportedQueryShape(format!(
            "Expected one of: bool, term, exists, wildcard. Got keys: {:?}",
            map.keys().collect::<Vec<_>>()
        )))
    }

    /// Parse a bool query
    fn parse_bool(value: &Value) -> Result<BoolQuery> {
        let map = value.as_object().ok_or_else(|| {
            QueryBridgeError::InvalidRequest("bool query must be an object".to_string())
        })?;

        let mut clauses = BoolClauses::new();

        if let Some(must) = map.get("must") {
            clauses.must = Self::parse_clause_list(must)?;
        }
        if let Some(should) = map.get("should") {
            clauses.should = Self::parse_clause_list(should)?;
        }
        if let Some(filter) = map.get("filter") {
            clauses.filter = Self::parse_clause_list(filter)?;
        }
        // must_not occurs both as a single object and as a list; normalize
        if let Some(must_not) = map.get("must_not") {
            clauses.must_not = Self::parse_clause_list(must_not)?;
        }

        Ok(BoolQuery::Bool(clauses))
    }

    /// Parse an array of query clauses (a single clause may omit the array)
    fn parse_clause_list(value: &Value) -> Result<Vec<BoolQuery>> {
        match value {
            Value::Array(arr) => arr.iter().map(Self::parse).collect(),
            obj @ Value::Object(_) => Ok(vec![Self::parse(obj)?]),
            _ => Err(QueryBridgeError::InvalidRequest(
                "Clause must be an array or object".to_string(),
            )),
        }
    }

    /// Parse a term query
    ///
    /// Format: { "term": { "field": value } } where value is a scalar or a
    /// list of scalars
    fn parse_term(value: &Value) -> Result<BoolQuery> {
        let map = value.as_object().ok_or_else(|| {
            QueryBridgeError::InvalidRequest("term query must be an object".to_string())
        })?;

        let (field, term_spec) = map.iter().next().ok_or_else(|| {
            QueryBridgeError::InvalidRequest("term query must specify a field".to_string())
        })?;

        let value = TermValue::from_value(term_spec).ok_or_else(|| {
            QueryBridgeError::InvalidRequest(
                "term query value must be a scalar or a list of scalars".to_string(),
            )
        })?;

        Ok(BoolQuery::Term {
            field: field.clone(),
            value,
        })
    }

    /// Parse an exists query
    ///
    /// Format: { "exists": { "field": "name" } }
    fn parse_exists(value: &Value) -> Result<BoolQuery> {
        let field = value
            .as_object()
            .and_then(|m| m.get("field"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                QueryBridgeError::InvalidRequest(
                    "exists query must have a string 'field'".to_string(),
                )
            })?;

        Ok(BoolQuery::exists(field))
    }

    /// Parse a wildcard query
    ///
    /// Format: { "wildcard": { "field": { "value": "pattern*" } } }
    /// or: { "wildcard": { "field": "pattern*" } }
    fn parse_wildcard(value: &Value) -> Result<BoolQuery> {
        let map = value.as_object().ok_or_else(|| {
            QueryBridgeError::InvalidRequest("wildcard query must be an object".to_string())
        })?;

        let (field, wildcard_spec) = map.iter().next().ok_or_else(|| {
            QueryBridgeError::InvalidRequest("wildcard query must specify a field".to_string())
        })?;

        let pattern = match wildcard_spec {
            Value::String(p) => p.clone(),
            Value::Object(spec) => spec
                .get("value")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    QueryBridgeError::InvalidRequest(
                        "wildcard query spec must have 'value' field".to_string(),
                    )
                })?
                .to_string(),
            _ => {
                return Err(QueryBridgeError::InvalidRequest(
                    "wildcard query value must be a string or object".to_string(),
                ))
            }
        };

        Ok(BoolQuery::wildcard(field.clone(), pattern))
    }
}

/// The persisted `queryFilter` envelope
///
/// The visual query builder serializes its tree as a fixed two-level wrapper,
/// `{query: {bool: {must: [{bool: {must: [fragment, ...]}}]}}}`. The shape is
/// a contract with the widget and is preserved byte-for-shape on both read
/// and write; only the innermost fragment list varies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryFilter {
    /// The innermost `must` fragments, one per editor rule
    pub fragments: Vec<BoolQuery>,
}

impl QueryFilter {
    /// Create an envelope from leaf fragments
    pub fn from_fragments(fragments: Vec<BoolQuery>) -> Self {
        Self { fragments }
    }

    /// Parse a `queryFilter` JSON object
    ///
    /// Fails with [`QueryBridgeError::MalformedFilterEnvelope`] when the
    /// two-level wrapper is missing; callers treat that as "no prior filter".
    /// Fragments inside a well-formed envelope that match no recognized query
    /// shape are dropped: saved filters may carry hand-authored DSL, and
    /// keeping the rest is preferable to discarding the whole filter.
    pub fn parse(value: &Value) -> Result<QueryFilter> {
        let outer_must = value
            .pointer("/query/bool/must")
            .ok_or_else(|| missing("query.bool.must"))?;

        let inner = match outer_must {
            Value::Array(items) => items.first().ok_or_else(|| missing("query.bool.must[0]"))?,
            _ => return Err(missing("query.bool.must")),
        };

        let inner_must = inner
            .pointer("/bool/must")
            .ok_or_else(|| missing("query.bool.must[0].bool.must"))?;

        let fragment_values = match inner_must {
            Value::Array(items) => items.as_slice(),
            single @ Value::Object(_) => std::slice::from_ref(single),
            _ => return Err(missing("query.bool.must[0].bool.must")),
        };

        let mut fragments = Vec::with_capacity(fragment_values.len());
        for fragment in fragment_values {
            match QueryParser::parse(fragment) {
                Ok(parsed) => fragments.push(parsed),
                Err(err) => {
                    tracing::debug!(error = %err, "dropping unparseable filter fragment");
                }
            }
        }

        Ok(QueryFilter { fragments })
    }

    /// Serialize back to the `queryFilter` wire shape
    pub fn to_value(&self) -> Value {
        let fragments: Vec<Value> = self.fragments.iter().map(BoolQuery::to_value).collect();

        json!({
            "query": {
                "bool": {
                    "must": [
                        { "bool": { "must": fragments } }
                    ]
                }
            }
        })
    }
}

fn missing(path: &str) -> QueryBridgeError {
    QueryBridgeError::MalformedFilterEnvelope(format!("missing {}", path))
}
