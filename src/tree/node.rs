//! Editable rule-tree AST
//!
//! The tree the visual query-builder widget loads and mutates: `group` nodes
//! carrying a conjunction and a `children1` id map, `rule` nodes carrying one
//! field condition. Serialization matches the widget's JSON shape exactly
//! (`type`/`id`/`path`/`properties`/`children1`, camelCase property keys).

use crate::config::FieldValueType;
use crate::query::dsl::Scalar;
use crate::tree::id::{IdSource, RuleId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rule operator, one variant per supported condition shape
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    SelectEquals,
    SelectNotEquals,
    SelectAnyIn,
    SelectNotAnyIn,
    Like,
    NotLike,
    IsNull,
    IsNotNull,
    /// Boolean equality, used by the `deleted` soft-delete flag
    Equal,
}

impl Operator {
    /// The widget's wire name for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::SelectEquals => "select_equals",
            Operator::SelectNotEquals => "select_not_equals",
            Operator::SelectAnyIn => "select_any_in",
            Operator::SelectNotAnyIn => "select_not_any_in",
            Operator::Like => "like",
            Operator::NotLike => "not_like",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
            Operator::Equal => "equal",
        }
    }
}

/// Group conjunction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

/// Properties of a group node
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupProperties {
    pub conjunction: Conjunction,
    pub not: bool,
}

/// One entry of a rule's `asyncListValues`
///
/// The widget renders list choices from `{key, value, children}` triples,
/// all three carrying the same scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListValue {
    pub key: Scalar,
    pub value: Scalar,
    pub children: Scalar,
}

impl ListValue {
    /// Build the triple for one scalar choice
    pub fn of(scalar: &Scalar) -> Self {
        Self {
            key: scalar.clone(),
            value: scalar.clone(),
            children: scalar.clone(),
        }
    }
}

/// One entry of a rule's `value` list: a scalar, or a list of scalars for
/// multiselect operators
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

/// Properties of a rule node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleProperties {
    pub field: String,
    pub operator: Operator,
    pub value: Vec<RuleValue>,
    pub value_src: Vec<String>,
    #[serde(default)]
    pub operator_options: Option<Value>,
    pub value_type: Vec<FieldValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub async_list_values: Option<Vec<ListValue>>,
}

/// One node of the rule tree
///
/// Every node's `path` equals its parent's `path` with its own `id`
/// appended; ids are unique within one tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleNode {
    Rule {
        id: RuleId,
        path: Vec<RuleId>,
        properties: RuleProperties,
    },
    Group {
        id: RuleId,
        path: Vec<RuleId>,
        properties: GroupProperties,
        children1: IndexMap<RuleId, RuleNode>,
    },
}

impl RuleNode {
    /// This node's identifier
    pub fn id(&self) -> &RuleId {
        match self {
            RuleNode::Rule { id, .. } | RuleNode::Group { id, .. } => id,
        }
    }

    /// This node's ancestor-id chain (including its own id)
    pub fn path(&self) -> &[RuleId] {
        match self {
            RuleNode::Rule { path, .. } | RuleNode::Group { path, .. } => path,
        }
    }

    /// Whether this is a group node
    pub fn is_group(&self) -> bool {
        matches!(self, RuleNode::Group { .. })
    }
}

/// A complete editable rule tree, rooted at a group node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTree {
    pub root: RuleNode,
}

impl RuleTree {
    /// A tree holding a single empty root group
    ///
    /// Returned when a persisted filter is absent or malformed; the editor
    /// treats it as "no prior filter".
    pub fn empty(ids: &dyn IdSource) -> Self {
        let id = ids.next_id();
        Self {
            root: RuleNode::Group {
                path: vec![id.clone()],
                id,
                properties: GroupProperties::default(),
                children1: IndexMap::new(),
            },
        }
    }

    /// A fresh editor tree: a root group holding one empty inner group
    ///
    /// This is the two-level scaffold the widget expects when a user opens
    /// the query builder with no saved filter.
    pub fn scaffold(ids: &dyn IdSource) -> Self {
        let root_id = ids.next_id();
        let inner_id = ids.next_id();
        let root_path = vec![root_id.clone()];
        let inner_path = vec![root_id.clone(), inner_id.clone()];

        let mut children1 = IndexMap::new();
        children1.insert(
            inner_id.clone(),
            RuleNode::Group {
                id: inner_id,
                path: inner_path,
                properties: GroupProperties::default(),
                children1: IndexMap::new(),
            },
        );

        Self {
            root: RuleNode::Group {
                id: root_id,
                path: root_path,
                properties: GroupProperties::default(),
                children1,
            },
        }
    }

    /// All rule properties in the tree, in traversal order
    pub fn rules(&self) -> Vec<&RuleProperties> {
        let mut out = Vec::new();
        collect_rules(&self.root, &mut out);
        out
    }

    /// Serialize to the widget's JSON shape
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("rule tree serialization is infallible")
    }
}

fn collect_rules<'a>(node: &'a RuleNode, out: &mut Vec<&'a RuleProperties>) {
    match node {
        RuleNode::Rule { properties, .. } => out.push(properties),
        RuleNode::Group { children1, .. } => {
            for child in children1.values() {
                collect_rules(child, out);
            }
        }
    }
}
