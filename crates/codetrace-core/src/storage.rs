//! The `Storage` collaborator (§1, §6): explicitly out of scope as an
//! implementation — the Tree Builder writes through this trait boundary
//! only. `codetrace-indexer` and `codetrace-cli` supply real
//! implementations; `NullStorage` here exists purely so library code and
//! tests can build trees without wiring one up.

use crate::node::Node;

/// One row of the closure table (§6): for every ancestor/descendant pair in
/// a tree, records the depth between them, supporting ancestor/descendant
/// queries without walking the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureRow {
    pub ancestor_id: String,
    pub descendant_id: String,
    pub depth: u32,
    pub file: String,
}

/// Append/insert boundary for the typed records the Tree Builder produces.
pub trait StorageSink {
    fn insert_package(&mut self, node: &Node);
    fn insert_import(&mut self, node: &Node);
    fn insert_class(&mut self, node: &Node);
    fn insert_field(&mut self, node: &Node);
    fn insert_method(&mut self, node: &Node);
    fn insert_call(&mut self, node: &Node);
    fn insert_binary_expr(&mut self, node: &Node);
    fn insert_closure_row(&mut self, row: ClosureRow);
}

/// A `StorageSink` that discards everything; used by tests and by callers
/// that only want the in-memory tree.
#[derive(Debug, Default)]
pub struct NullStorage;

impl StorageSink for NullStorage {
    fn insert_package(&mut self, _node: &Node) {}
    fn insert_import(&mut self, _node: &Node) {}
    fn insert_class(&mut self, _node: &Node) {}
    fn insert_field(&mut self, _node: &Node) {}
    fn insert_method(&mut self, _node: &Node) {}
    fn insert_call(&mut self, _node: &Node) {}
    fn insert_binary_expr(&mut self, _node: &Node) {}
    fn insert_closure_row(&mut self, _row: ClosureRow) {}
}
