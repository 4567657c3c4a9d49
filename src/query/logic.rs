//! Generic boolean logic representation
//!
//! A JsonLogic-style expression tree used as the engine-agnostic intermediate
//! form between the search DSL and other filter consumers. The wire format is
//! a JSON object with a single operator key: `and`, `or`, `!`, `==`, `!=`,
//! `!!`, `in`, or `some`.

use crate::error::QueryBridgeError;
use crate::query::dsl::TermValue;
use crate::Result;
use serde_json::{json, Value};

/// Reference to a document field: `{"var": "<name>"}`
#[derive(Clone, Debug, PartialEq)]
pub struct FieldRef {
    pub var: String,
}

impl FieldRef {
    /// Create a field reference
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Serialize to the wire shape
    pub fn to_value(&self) -> Value {
        json!({ "var": self.var })
    }

    /// Parse from the wire shape
    pub fn from_value(value: &Value) -> Option<FieldRef> {
        value
            .get("var")
            .and_then(Value::as_str)
            .map(FieldRef::new)
    }
}

/// One node of the generic boolean logic tree
///
/// An `And` node never nests another `And` directly in its list; use
/// [`LogicNode::and`] to construct conjunctions so nested members are
/// spliced in. This is required for round-trip equality with the DSL form.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicNode {
    /// Conjunction of sub-expressions
    And(Vec<LogicNode>),
    /// Disjunction of sub-expressions
    Or(Vec<LogicNode>),
    /// Negation
    Not(Box<LogicNode>),
    /// Field equality
    Equals(FieldRef, TermValue),
    /// Field inequality
    NotEquals(FieldRef, TermValue),
    /// Field presence (`!!` double negation in JsonLogic)
    Exists(FieldRef),
    /// Membership (also used to model glob patterns)
    In(FieldRef, TermValue),
    /// Quantifier over an array-of-objects field: some element matches
    Some(FieldRef, Box<LogicNode>),
}

impl LogicNode {
    /// Build a conjunction, splicing in the members of any nested `And`
    pub fn and(items: Vec<LogicNode>) -> LogicNode {
        let mut flat = Vec::with_capacity(items.len());
        flatten_into(&mut flat, items);
        LogicNode::And(flat)
    }

    /// Build a disjunction
    pub fn or(items: Vec<LogicNode>) -> LogicNode {
        LogicNode::Or(items)
    }

    /// Build a negation
    pub fn not(inner: LogicNode) -> LogicNode {
        LogicNode::Not(Box::new(inner))
    }

    /// Build an equality check
    pub fn equals(field: impl Into<String>, value: impl Into<TermValue>) -> LogicNode {
        LogicNode::Equals(FieldRef::new(field), value.into())
    }

    /// Build a membership check
    pub fn is_in(field: impl Into<String>, value: impl Into<TermValue>) -> LogicNode {
        LogicNode::In(FieldRef::new(field), value.into())
    }

    /// Build a quantified condition over an array field
    pub fn some(field: impl Into<String>, condition: LogicNode) -> LogicNode {
        LogicNode::Some(FieldRef::new(field), Box::new(condition))
    }

    /// Serialize to the JsonLogic wire shape
    pub fn to_value(&self) -> Value {
        match self {
            LogicNode::And(items) => {
                json!({ "and": items.iter().map(LogicNode::to_value).collect::<Vec<_>>() })
            }
            LogicNode::Or(items) => {
                json!({ "or": items.iter().map(LogicNode::to_value).collect::<Vec<_>>() })
            }
            LogicNode::Not(inner) => json!({ "!": inner.to_value() }),
            LogicNode::Equals(field, value) => {
                json!({ "==": [field.to_value(), value.to_value()] })
            }
            LogicNode::NotEquals(field, value) => {
                json!({ "!=": [field.to_value(), value.to_value()] })
            }
            LogicNode::Exists(field) => json!({ "!!": field.to_value() }),
            LogicNode::In(field, value) => {
                json!({ "in": [field.to_value(), value.to_value()] })
            }
            LogicNode::Some(field, condition) => {
                json!({ "some": [field.to_value(), condition.to_value()] })
            }
        }
    }

    /// Parse from the JsonLogic wire shape
    ///
    /// Fails with [`QueryBridgeError::UnsupportedLogicShape`] for operators
    /// outside the recognized set.
    pub fn from_value(value: &Value) -> Result<LogicNode> {
        let map = value.as_object().ok_or_else(|| {
            QueryBridgeError::UnsupportedLogicShape("logic node must be a JSON object".to_string())
        })?;

        if let Some(items) = map.get("and") {
            return Ok(LogicNode::and(Self::parse_list(items, "and")?));
        }
        if let Some(items) = map.get("or") {
            return Ok(LogicNode::Or(Self::parse_list(items, "or")?));
        }
        if let Some(inner) = map.get("!") {
            return Ok(LogicNode::not(Self::from_value(inner)?));
        }
        if let Some(operands) = map.get("==") {
            let (field, value) = Self::parse_comparison(operands, "==")?;
            return Ok(LogicNode::Equals(field, value));
        }
        if let Some(operands) = map.get("!=") {
            let (field, value) = Self::parse_comparison(operands, "!=")?;
            return Ok(LogicNode::NotEquals(field, value));
        }
        if let Some(operand) = map.get("!!") {
            // The presence check appears both as {var} and as [{var}]
            let unwrapped = match operand {
                Value::Array(items) => items.first().unwrap_or(operand),
                other => other,
            };
            let field = FieldRef::from_value(unwrapped).ok_or_else(|| {
                QueryBridgeError::UnsupportedLogicShape(
                    "'!!' operand must be a field reference".to_string(),
                )
            })?;
            return Ok(LogicNode::Exists(field));
        }
        if let Some(operands) = map.get("in") {
            let (field, value) = Self::parse_comparison(operands, "in")?;
            return Ok(LogicNode::In(field, value));
        }
        if let Some(operands) = map.get("some") {
            let pair = operands.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
                QueryBridgeError::UnsupportedLogicShape(
                    "'some' expects [field, condition]".to_string(),
                )
            })?;
            let field = FieldRef::from_value(&pair[0]).ok_or_else(|| {
                QueryBridgeError::UnsupportedLogicShape(
                    "'some' first operand must be a field reference".to_string(),
                )
            })?;
            let condition = Self::from_value(&pair[1])?;
            return Ok(LogicNode::Some(field, Box::new(condition)));
        }

        Err(QueryBridgeError::UnsupportedLogicShape(format!(
            "Unknown logic operator. Got keys: {:?}",
            map.keys().collect::<Vec<_>>()
        )))
    }

    fn parse_list(value: &Value, op: &str) -> Result<Vec<LogicNode>> {
        let items = value.as_array().ok_or_else(|| {
            QueryBridgeError::UnsupportedLogicShape(format!("'{}' expects a list", op))
        })?;
        items.iter().map(Self::from_value).collect()
    }

    fn parse_comparison(value: &Value, op: &str) -> Result<(FieldRef, TermValue)> {
        let pair = value.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
            QueryBridgeError::UnsupportedLogicShape(format!("'{}' expects [field, value]", op))
        })?;
        let field = FieldRef::from_value(&pair[0]).ok_or_else(|| {
            QueryBridgeError::UnsupportedLogicShape(format!(
                "'{}' first operand must be a field reference",
                op
            ))
        })?;
        let term = TermValue::from_value(&pair[1]).ok_or_else(|| {
            QueryBridgeError::UnsupportedLogicShape(format!(
                "'{}' second operand must be scalar or a list of scalars",
                op
            ))
        })?;
        Ok((field, term))
    }
}

fn flatten_into(acc: &mut Vec<LogicNode>, items: Vec<LogicNode>) {
    for item in items {
        match item {
            LogicNode::And(children) => flatten_into(acc, children),
            other => acc.push(other),
        }
    }
}
