//! Filter-expression evaluator and query planner/executor (C8, C9).
//!
//! The external `QueryParser` boundary hands this crate a [`query::Query`]:
//! a select list of typed aliases, a filter (raw text or a pre-built
//! [`query::ExpressionTree`]), and an output projection. This crate owns
//! everything downstream of that boundary — predicate substitution,
//! expression parsing and evaluation, and the Cartesian-product planner
//! that turns a `Query` into rows.

pub mod eval;
pub mod expr;
pub mod predicate;
pub mod query;
pub mod value;

pub use eval::{evaluate, evaluate_predicate, Environment};
pub use expr::{parse as parse_expr, Expr};
pub use predicate::{substitute_predicates, PredicateDef};
pub use query::{
    CompareOp, EntityData, ExpressionTree, OutputSpec, Query, QueryExpression, QueryIndex,
    QueryPlanner, QueryResult, RelationshipMap, SelectEntry,
};
pub use value::{Queryable, Value};
