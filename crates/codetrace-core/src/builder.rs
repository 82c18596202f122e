//! Tree Builder (C3): dispatch-on-type walk of a raw tree-sitter parse tree,
//! producing [`Node`] values under an arena-indexed [`Tree`] (§4.3).
//!
//! Recognized kinds attach a typed node and, for container kinds, recurse
//! with the new node as parent. Leaf-relevant kinds attach without
//! re-descending, to avoid duplicate emission. Unrecognized kinds are the
//! only place generic recursion runs: children are visited with the
//! *current* parent unchanged.

use tree_sitter::{Node as TsNode, Parser};

use crate::error::{ParseError, Result};
use crate::id::{generate_node_id, source_key};
use crate::importmap::ImportMap;
use crate::node::{BinaryExpr, Javadoc, JavadocTag, Node, NodeBase};
use crate::storage::{ClosureRow, StorageSink};
use crate::tree::{NodeIndex, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Java,
    Python,
}

impl Language {
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Python => "py",
        }
    }

    fn ts_language(&self) -> tree_sitter::Language {
        match self {
            Language::Java => tree_sitter_java::language(),
            Language::Python => tree_sitter_python::language(),
        }
    }
}

/// The outcome of building one file's tree: the arena plus the import map
/// accumulated while walking its import statements.
pub struct BuildOutput {
    pub tree: Tree,
    pub import_map: ImportMap,
}

/// Parses `source` as `language` and builds its typed tree, writing typed
/// records through `storage` as each node is produced.
pub fn build_file(
    source: &str,
    file_path: &str,
    language: Language,
    storage: &mut dyn StorageSink,
) -> Result<BuildOutput> {
    build_file_with_timeout(source, file_path, language, storage, None)
}

/// As [`build_file`], but bounds the underlying tree-sitter parse to
/// `timeout_micros` (§5 "a file whose parse exceeds a configured timeout
/// is abandoned and logged"). `parser.parse` returns `None` on timeout,
/// which this surfaces as `ParseError::ParserError` so callers can log and
/// move to the next file without the worker blocking indefinitely.
pub fn build_file_with_timeout(
    source: &str,
    file_path: &str,
    language: Language,
    storage: &mut dyn StorageSink,
    timeout_micros: Option<u64>,
) -> Result<BuildOutput> {
    if source.trim().is_empty() {
        return Err(ParseError::EmptyFile(file_path.into()));
    }

    let mut parser = Parser::new();
    parser
        .set_language(&language.ts_language())
        .map_err(ParseError::LanguageError)?;
    if let Some(timeout) = timeout_micros {
        parser.set_timeout_micros(timeout);
    }

    let ts_tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::ParserError(file_path.into()))?;

    let mut ctx = BuildCtx {
        source: source.as_bytes(),
        file: file_path,
        language,
        tree: Tree::new(),
        import_map: ImportMap::new(),
        storage,
        current_class_id: None,
        current_class_name: None,
    };

    let file_base = ctx.base("File", ts_tree.root_node());
    let root = ctx.tree.insert(Node::File(file_base), None);
    ctx.walk_children(ts_tree.root_node(), root);

    emit_closure_table(&ctx.tree, file_path, ctx.storage);

    Ok(BuildOutput {
        tree: ctx.tree,
        import_map: ctx.import_map,
    })
}

/// Walks the finished arena emitting one [`ClosureRow`] per
/// ancestor/descendant pair (§6): for every node, one row per step up its
/// parent chain, depth 0 for the self row through depth N at the root.
/// This is what lets a later ancestor/descendant query run off the
/// closure table instead of re-walking the arena.
fn emit_closure_table(tree: &Tree, file: &str, storage: &mut dyn StorageSink) {
    for (idx, descendant) in tree.iter() {
        let descendant_id = descendant.node.id().to_string();
        let mut depth = 0u32;
        let mut current = Some(idx);
        while let Some(cur) = current {
            let ancestor_id = tree
                .get(cur)
                .expect("index came from tree.iter()")
                .node
                .id()
                .to_string();
            storage.insert_closure_row(ClosureRow {
                ancestor_id,
                descendant_id: descendant_id.clone(),
                depth,
                file: file.to_string(),
            });
            depth += 1;
            current = tree.parent(cur);
        }
    }
}

struct BuildCtx<'a> {
    source: &'a [u8],
    file: &'a str,
    language: Language,
    tree: Tree,
    import_map: ImportMap,
    storage: &'a mut dyn StorageSink,
    current_class_id: Option<String>,
    current_class_name: Option<String>,
}

impl<'a> BuildCtx<'a> {
    fn text(&self, n: TsNode) -> String {
        n.utf8_text(self.source).unwrap_or("").to_string()
    }

    /// tree-sitter rows are 0-based; everywhere a line number is reported it
    /// must be 1-based (§4.3 numeric semantics, property 8).
    fn line_of(&self, n: TsNode) -> u32 {
        n.start_position().row as u32 + 1
    }

    fn base(&self, name: &str, n: TsNode) -> NodeBase {
        let line = self.line_of(n);
        let col = n.start_position().column as u32;
        let key = source_key(self.file, line, col);
        NodeBase {
            id: generate_node_id(n.kind(), name, &key),
            name: name.to_string(),
            code_snippet: self.text(n),
            line_number: line,
            file: self.file.to_string(),
            is_source_file: true,
        }
    }

    fn child_by_field<'t>(&self, n: TsNode<'t>, field: &str) -> Option<TsNode<'t>> {
        n.child_by_field_name(field)
    }

    /// Recurses into every named child of `n`, attaching new nodes under
    /// `parent`. This is the single generic-fallback path (§4.3).
    fn walk_children(&mut self, n: TsNode, parent: NodeIndex) {
        let mut cursor = n.walk();
        let mut pending_doc: Option<Javadoc> = None;
        for child in n.named_children(&mut cursor) {
            if self.is_doc_comment(child) {
                pending_doc = Some(self.parse_javadoc(child));
                continue;
            }
            self.dispatch(child, parent, pending_doc.take());
        }
    }

    fn is_doc_comment(&self, n: TsNode) -> bool {
        (n.kind() == "block_comment" || n.kind() == "comment") && self.text(n).starts_with("/**")
    }

    fn parse_javadoc(&self, n: TsNode) -> Javadoc {
        let raw = self.text(n);
        let mut tags = Vec::new();
        let mut author = None;
        let mut version = None;
        for line in raw.lines() {
            let line = line.trim().trim_start_matches('*').trim();
            if let Some(rest) = line.strip_prefix("@author") {
                author = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("@version") {
                version = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix('@') {
                let mut parts = rest.splitn(2, char::is_whitespace);
                let tag_name = parts.next().unwrap_or("").to_string();
                let text = parts.next().unwrap_or("").trim().to_string();
                tags.push(JavadocTag {
                    name: tag_name.clone(),
                    text,
                    doc_type: tag_name,
                });
            }
        }
        Javadoc {
            number_of_lines: raw.lines().count() as u32,
            tags,
            author,
            version,
            raw_text: raw,
        }
    }

    fn dispatch(&mut self, n: TsNode, parent: NodeIndex, doc: Option<Javadoc>) {
        match self.language {
            Language::Java => self.dispatch_java(n, parent, doc),
            Language::Python => self.dispatch_python(n, parent, doc),
        }
    }

    // ---- shared helpers -------------------------------------------------

    fn modifiers_of(&self, n: TsNode) -> (Vec<String>, String, bool, bool, bool, bool) {
        let mut mods = Vec::new();
        let mut visibility = String::new();
        let (mut is_static, mut is_final, mut is_abstract, mut is_strictfp) =
            (false, false, false, false);
        if let Some(modifiers) = self.child_by_field(n, "modifiers") {
            let text = self.text(modifiers).replace('\n', " ");
            for word in text.split_whitespace() {
                match word {
                    "public" | "private" | "protected" => visibility = word.to_string(),
                    "static" => is_static = true,
                    "final" => is_final = true,
                    "abstract" => is_abstract = true,
                    "strictfp" => is_strictfp = true,
                    _ => {}
                }
                mods.push(word.to_string());
            }
        }
        (mods, visibility, is_static, is_final, is_abstract, is_strictfp)
    }

    fn attach_binary_expr(&mut self, n: TsNode, parent: NodeIndex) {
        let Some(left) = self.child_by_field(n, "left") else {
            return;
        };
        let Some(right) = self.child_by_field(n, "right") else {
            return;
        };
        let Some(op) = self.child_by_field(n, "operator") else {
            return;
        };
        let payload = BinaryExpr {
            left_operand: self.text(left),
            right_operand: self.text(right),
            operator: self.text(op),
        };
        let base = self.base(&payload.operator, n);
        let node = Node::BinaryExpr(base, payload);
        self.storage.insert_binary_expr(&node);
        self.tree.insert(node, Some(parent));
        // Operands may themselves contain calls/nested expressions worth recognizing.
        self.walk_children(n, parent);
    }
}

mod java;
mod python;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NullStorage;

    #[test]
    fn java_class_and_method_produce_typed_nodes() {
        let source = r#"
package com.example;

import com.example.util.Sanitizer;

public class Calculator {
    public int add(int x, int y) {
        return x + y;
    }
}
"#;
        let mut storage = NullStorage;
        let out = build_file(source, "Calculator.java", Language::Java, &mut storage).unwrap();

        let classes: Vec<_> = out
            .tree
            .iter()
            .filter_map(|(_, n)| n.node.as_class_decl())
            .collect();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].0.name, "Calculator");

        let methods: Vec<_> = out
            .tree
            .iter()
            .filter_map(|(_, n)| n.node.as_method())
            .collect();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].0.name, "add");
        assert_eq!(methods[0].0.line_number, 7, "line numbers are 1-based");
    }

    #[test]
    fn node_ids_are_stable_across_reparses() {
        let source = "class A {\n    void run() {}\n}\n";
        let mut s1 = NullStorage;
        let mut s2 = NullStorage;
        let a = build_file(source, "A.java", Language::Java, &mut s1).unwrap();
        let b = build_file(source, "A.java", Language::Java, &mut s2).unwrap();

        let ids_a: Vec<_> = a.tree.iter().map(|(_, n)| n.node.id().to_string()).collect();
        let ids_b: Vec<_> = b.tree.iter().map(|(_, n)| n.node.id().to_string()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn python_import_forms_populate_import_map() {
        let source = "from utils.helpers import sanitize\nimport django.db\n\ndef get_user():\n    sanitize(data)\n";
        let mut storage = NullStorage;
        let out = build_file(source, "views.py", Language::Python, &mut storage).unwrap();

        assert_eq!(
            out.import_map.resolve("sanitize"),
            Some("utils.helpers.sanitize")
        );
        assert_eq!(out.import_map.resolve("django.db"), Some("django.db"));
    }

    #[test]
    fn empty_file_is_rejected() {
        let mut storage = NullStorage;
        let err = build_file("", "empty.py", Language::Python, &mut storage);
        assert!(matches!(err, Err(ParseError::EmptyFile(_))));
    }

    #[derive(Default)]
    struct RecordingStorage {
        closure_rows: Vec<ClosureRow>,
    }

    impl StorageSink for RecordingStorage {
        fn insert_package(&mut self, _node: &Node) {}
        fn insert_import(&mut self, _node: &Node) {}
        fn insert_class(&mut self, _node: &Node) {}
        fn insert_field(&mut self, _node: &Node) {}
        fn insert_method(&mut self, _node: &Node) {}
        fn insert_call(&mut self, _node: &Node) {}
        fn insert_binary_expr(&mut self, _node: &Node) {}
        fn insert_closure_row(&mut self, row: ClosureRow) {
            self.closure_rows.push(row);
        }
    }

    #[test]
    fn closure_table_has_one_self_row_per_node() {
        let source = "class A:\n    def run(self):\n        pass\n";
        let mut storage = RecordingStorage::default();
        let out = build_file(source, "a.py", Language::Python, &mut storage).unwrap();

        let self_rows: Vec<_> = storage
            .closure_rows
            .iter()
            .filter(|r| r.depth == 0)
            .collect();
        assert_eq!(self_rows.len(), out.tree.len());
        for row in &self_rows {
            assert_eq!(row.ancestor_id, row.descendant_id);
            assert_eq!(row.file, "a.py");
        }
    }

    #[test]
    fn closure_table_links_method_up_to_root() {
        let source = "class A:\n    def run(self):\n        pass\n";
        let mut storage = RecordingStorage::default();
        let out = build_file(source, "a.py", Language::Python, &mut storage).unwrap();

        let method_id = out
            .tree
            .iter()
            .find_map(|(_, n)| n.node.as_method())
            .map(|(base, _)| base.id.clone())
            .unwrap();
        let root_id = out.tree.get(out.tree.root().unwrap()).unwrap().node.id();

        assert!(storage
            .closure_rows
            .iter()
            .any(|r| r.ancestor_id == root_id && r.descendant_id == method_id && r.depth > 0));
    }
}
