//! Editable rule-tree layer
//!
//! This module owns the widget-facing side of the engine: node identity and
//! paths, the rule/group AST, the query-shape classifier, and the
//! hydration/dehydration between persisted filters and editable trees.

pub mod classify;
pub mod hydrate;
pub mod id;
pub mod node;

pub use classify::{classify, ClassifiedCondition, ValueKind};
pub use hydrate::{dehydrate, hydrate, hydrate_filter};
pub use id::{child_path, IdSource, RuleId, UuidIdSource};
pub use node::{
    Conjunction, GroupProperties, ListValue, Operator, RuleNode, RuleProperties, RuleTree,
    RuleValue,
};
