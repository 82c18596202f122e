//! Typed AST model, tree builder, and module registry (C1-C4).
//!
//! The raw tree-sitter parse is the external `Parser` collaborator referred
//! to by `spec.md` §1: this crate owns everything downstream of it — stable
//! node identifiers, the typed node model, the dispatch-on-type tree
//! builder, and the module registry / import map used to resolve names
//! across files.

pub mod builder;
pub mod error;
pub mod id;
pub mod importmap;
pub mod node;
pub mod registry;
pub mod storage;
pub mod tree;

pub use builder::{build_file, build_file_with_timeout, BuildOutput, Language};
pub use error::{ParseError, Result};
pub use importmap::ImportMap;
pub use node::{Node, NodeBase, NodeKind};
pub use registry::ModuleRegistry;
pub use storage::{ClosureRow, NullStorage, StorageSink};
pub use tree::{NodeIndex, Tree, TreeNode};
