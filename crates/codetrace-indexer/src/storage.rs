//! A concrete, explicitly non-persistent `StorageSink` (§6): everything
//! lives in memory for the lifetime of one analysis run and is dropped
//! with it. `codetrace-cli` wires this up as the default; a durable
//! implementation (on-disk, a real database) is a different crate's job
//! and is not attempted here.

use std::sync::{Arc, Mutex};

use codetrace_core::{ClosureRow, Node, StorageSink};

/// Typed records accumulated by one analysis run, grouped the way the
/// `StorageSink` boundary presents them (§6 outputs).
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    pub packages: Vec<Node>,
    pub imports: Vec<Node>,
    pub classes: Vec<Node>,
    pub fields: Vec<Node>,
    pub methods: Vec<Node>,
    pub calls: Vec<Node>,
    pub binary_exprs: Vec<Node>,
    pub closure_rows: Vec<ClosureRow>,
}

impl StorageSink for InMemoryStorage {
    fn insert_package(&mut self, node: &Node) {
        self.packages.push(node.clone());
    }
    fn insert_import(&mut self, node: &Node) {
        self.imports.push(node.clone());
    }
    fn insert_class(&mut self, node: &Node) {
        self.classes.push(node.clone());
    }
    fn insert_field(&mut self, node: &Node) {
        self.fields.push(node.clone());
    }
    fn insert_method(&mut self, node: &Node) {
        self.methods.push(node.clone());
    }
    fn insert_call(&mut self, node: &Node) {
        self.calls.push(node.clone());
    }
    fn insert_binary_expr(&mut self, node: &Node) {
        self.binary_exprs.push(node.clone());
    }
    fn insert_closure_row(&mut self, row: ClosureRow) {
        self.closure_rows.push(row);
    }
}

/// A `StorageSink` handle shareable across worker threads; every call
/// locks the shared `InMemoryStorage`, serializing writes per §5 ("Storage
/// handle writes must be serialized").
#[derive(Clone)]
pub struct SharedStorage {
    inner: Arc<Mutex<InMemoryStorage>>,
}

impl SharedStorage {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryStorage::default())),
        }
    }

    /// Consumes the handle, returning the accumulated storage. Panics if
    /// other clones are still alive; callers should drop worker-side
    /// clones before calling this.
    pub fn into_inner(self) -> InMemoryStorage {
        Arc::try_unwrap(self.inner)
            .unwrap_or_else(|_| panic!("SharedStorage still has outstanding clones"))
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SharedStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageSink for SharedStorage {
    fn insert_package(&mut self, node: &Node) {
        self.lock().insert_package(node);
    }
    fn insert_import(&mut self, node: &Node) {
        self.lock().insert_import(node);
    }
    fn insert_class(&mut self, node: &Node) {
        self.lock().insert_class(node);
    }
    fn insert_field(&mut self, node: &Node) {
        self.lock().insert_field(node);
    }
    fn insert_method(&mut self, node: &Node) {
        self.lock().insert_method(node);
    }
    fn insert_call(&mut self, node: &Node) {
        self.lock().insert_call(node);
    }
    fn insert_binary_expr(&mut self, node: &Node) {
        self.lock().insert_binary_expr(node);
    }
    fn insert_closure_row(&mut self, row: ClosureRow) {
        self.lock().insert_closure_row(row);
    }
}

impl SharedStorage {
    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryStorage> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codetrace_core::node::ClassDecl;
    use codetrace_core::NodeBase;

    fn class_node(name: &str) -> Node {
        Node::ClassDecl(
            NodeBase {
                id: name.into(),
                name: name.into(),
                code_snippet: name.into(),
                line_number: 1,
                file: "a.java".into(),
                is_source_file: true,
            },
            ClassDecl::default(),
        )
    }

    #[test]
    fn shared_storage_serializes_writes_across_clones() {
        let mut a = SharedStorage::new();
        let mut b = a.clone();
        a.insert_class(&class_node("A"));
        b.insert_class(&class_node("B"));
        drop(b);
        assert_eq!(a.into_inner().classes.len(), 2);
    }
}
