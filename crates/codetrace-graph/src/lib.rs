//! Cross-file call graph resolution (C5), framework recognition (C6), and
//! the call-matcher DSL (C10).

pub mod callgraph;
pub mod error;
pub mod framework;
pub mod matcher;

pub use callgraph::{resolve_call_target, CallGraph, CallSite, FileUnit, Location};
pub use error::{GraphError, Result};
pub use framework::{FrameworkDef, FrameworkRecognizer};
pub use matcher::{
    parse_keyword_arguments, ArgumentConstraint, CallMatcher, CallMatcherIR, ConstraintValue,
    MatchContext,
};
