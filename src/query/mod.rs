//! Query DSL and logic-form translation
//!
//! This module owns the search-engine side of the engine: the boolean query
//! DSL, its JSON parser, the generic JsonLogic representation, and the
//! bidirectional converter between the two.
//!
//! # Example
//!
//! ```json
//! {
//!   "query": {
//!     "bool": {
//!       "must": [
//!         { "bool": { "must": [
//!           { "term": { "deleted": false } },
//!           { "exists": { "field": "owners" } }
//!         ] } }
//!       ]
//!     }
//!   }
//! }
//! ```

pub mod convert;
pub mod dsl;
pub mod logic;
pub mod parser;
pub mod resolver;

pub use convert::{logic_value_to_query, query_value_to_logic, to_logic, to_query};
pub use dsl::{BoolClauses, BoolQuery, Scalar, TermValue};
pub use logic::{FieldRef, LogicNode};
pub use parser::{QueryFilter, QueryParser};
pub use resolver::resolve_nested;
