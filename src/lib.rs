//! Structured query translation for metadata-catalog search
//!
//! A small bidirectional compiler between three representations of a boolean
//! search filter:
//!
//! - the persisted Elasticsearch-style boolean query DSL
//!   ([`query::BoolQuery`]),
//! - a generic JsonLogic-style expression tree ([`query::LogicNode`]),
//! - the editable rule tree a visual query-builder widget consumes
//!   ([`tree::RuleTree`]).
//!
//! All transformations are synchronous, pure tree rewrites; the engine owns
//! no long-lived state and performs no I/O.

pub mod config;
pub mod error;
pub mod query;
pub mod testing;
pub mod tree;

pub use config::{FieldConfig, FieldSet, FieldValueType};
pub use error::{QueryBridgeError, Result};
pub use query::{
    logic_value_to_query, query_value_to_logic, resolve_nested, to_logic, to_query, BoolClauses,
    BoolQuery, FieldRef, LogicNode, QueryFilter, QueryParser, Scalar, TermValue,
};
pub use tree::{
    classify, dehydrate, hydrate, hydrate_filter, IdSource, Operator, RuleNode, RuleTree,
    UuidIdSource,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
