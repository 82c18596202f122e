use tree_sitter::Node as TsNode;

use crate::id::{generate_method_id, source_key};
use crate::node::{
    BlockStmt, ClassDecl, ForStmt, IfStmt, Javadoc, Method, MethodCall, Node, WhileStmt,
};
use crate::tree::NodeIndex;

use super::BuildCtx;

impl<'a> BuildCtx<'a> {
    pub(super) fn dispatch_python(&mut self, n: TsNode, parent: NodeIndex, doc: Option<Javadoc>) {
        match n.kind() {
            "import_statement" | "import_from_statement" => self.py_import(n, parent),
            "class_definition" => self.py_class(n, parent, doc),
            "function_definition" => self.py_function(n, parent, doc),
            "call" => self.py_call(n, parent),
            "binary_operator" => self.attach_binary_expr(n, parent),
            "if_statement" => self.py_if(n, parent),
            "while_statement" => self.py_while(n, parent),
            "for_statement" => self.py_for(n, parent),
            "block" => self.py_block(n, parent),
            "return_statement" => self.py_simple(n, parent, Node::ReturnStmt),
            "break_statement" => self.py_simple(n, parent, Node::BreakStmt),
            "continue_statement" => self.py_simple(n, parent, Node::ContinueStmt),
            "assert_statement" => self.py_simple(n, parent, Node::AssertStmt),
            "yield" | "yield_expression" => self.py_simple(n, parent, Node::YieldStmt),
            _ => self.walk_children(n, parent),
        }
    }

    fn py_import(&mut self, n: TsNode, parent: NodeIndex) {
        let text = self.text(n);
        if n.kind() == "import_from_statement" {
            if let Some(module) = n.child_by_field_name("module_name") {
                let module_text = self.text(module);
                let mut cursor = n.walk();
                for child in n.named_children(&mut cursor) {
                    match child.kind() {
                        "dotted_name" if child != module => {
                            self.import_map
                                .add_from_import(&module_text, &self.text(child));
                        }
                        "aliased_import" => {
                            let name = child
                                .child_by_field_name("name")
                                .map(|c| self.text(c))
                                .unwrap_or_default();
                            let alias = child
                                .child_by_field_name("alias")
                                .map(|c| self.text(c))
                                .unwrap_or_default();
                            self.import_map
                                .add_aliased_import(&format!("{module_text}.{name}"), &alias);
                        }
                        _ => {}
                    }
                }
            }
        } else {
            let mut cursor = n.walk();
            for child in n.named_children(&mut cursor) {
                match child.kind() {
                    "dotted_name" => self.import_map.add_plain_import(&self.text(child)),
                    "aliased_import" => {
                        let name = child
                            .child_by_field_name("name")
                            .map(|c| self.text(c))
                            .unwrap_or_default();
                        let alias = child
                            .child_by_field_name("alias")
                            .map(|c| self.text(c))
                            .unwrap_or_default();
                        self.import_map.add_aliased_import(&name, &alias);
                    }
                    _ => {}
                }
            }
        }
        let base = self.base(&text, n);
        let node = Node::ImportType(base);
        self.storage.insert_import(&node);
        self.tree.insert(node, Some(parent));
    }

    fn py_class(&mut self, n: TsNode, parent: NodeIndex, doc: Option<Javadoc>) {
        let name = n
            .child_by_field_name("name")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let super_types = n
            .child_by_field_name("superclasses")
            .map(|c| {
                let mut cursor = c.walk();
                c.named_children(&mut cursor).map(|x| self.text(x)).collect()
            })
            .unwrap_or_default();

        let key = source_key(self.file, self.line_of(n), n.start_position().column as u32);
        let class_id = crate::id::generate_node_id("class_definition", &name, &key);

        let payload = ClassDecl {
            qualified_name: name.clone(),
            package: String::new(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
            super_types,
            source_file: self.file.to_string(),
            class_id: class_id.clone(),
            javadoc: doc,
        };
        let mut base = self.base(&name, n);
        base.id = class_id.clone();
        let node = Node::ClassDecl(base, payload);
        self.storage.insert_class(&node);
        let idx = self.tree.insert(node, Some(parent));

        let prev_id = self.current_class_id.replace(class_id);
        let prev_name = self.current_class_name.replace(name);
        if let Some(body) = n.child_by_field_name("body") {
            self.walk_children(body, idx);
        }
        self.current_class_id = prev_id;
        self.current_class_name = prev_name;
    }

    fn py_function(&mut self, n: TsNode, parent: NodeIndex, doc: Option<Javadoc>) {
        let name = n
            .child_by_field_name("name")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let return_type = n
            .child_by_field_name("return_type")
            .map(|c| self.text(c))
            .unwrap_or_default();

        let (mut parameter_types, mut parameter_names) = (Vec::new(), Vec::new());
        if let Some(params) = n.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for p in params.named_children(&mut cursor) {
                match p.kind() {
                    "identifier" => {
                        parameter_names.push(self.text(p));
                        parameter_types.push(String::new());
                    }
                    "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                        let ident = p
                            .named_child(0)
                            .map(|c| self.text(c))
                            .unwrap_or_default();
                        let ty = p
                            .child_by_field_name("type")
                            .map(|c| self.text(c))
                            .unwrap_or_default();
                        parameter_names.push(ident);
                        parameter_types.push(ty);
                    }
                    _ => {}
                }
            }
        }

        let line_start = self.line_of(n);
        let line_end = n.end_position().row as u32 + 1;
        let key = source_key(self.file, line_start, n.start_position().column as u32);
        let id = generate_method_id(&name, &parameter_types, &key);

        let class_id = self.current_class_id.clone().unwrap_or_default();
        let qualified_name = match &self.current_class_name {
            Some(class_name) => format!("{class_name}.{name}"),
            None => name.clone(),
        };

        let payload = Method {
            qualified_name,
            return_type,
            parameter_types,
            parameter_names,
            visibility: String::new(),
            is_abstract: false,
            is_static: false,
            is_final: false,
            is_strictfp: false,
            is_constructor: name == "__init__",
            throws: Vec::new(),
            source_declaration: self.text(n),
            class_id,
            line_start,
            line_end,
            javadoc: doc,
        };
        let mut base = self.base(&name, n);
        base.id = id;
        let node = Node::Method(base, payload);
        self.storage.insert_method(&node);
        let idx = self.tree.insert(node, Some(parent));

        if let Some(body) = n.child_by_field_name("body") {
            self.walk_children(body, idx);
        }
    }

    fn py_call(&mut self, n: TsNode, parent: NodeIndex) {
        let func = n.child_by_field_name("function");
        let (method_name, qualified_method) = match func {
            Some(f) if f.kind() == "attribute" => {
                let object = f
                    .child_by_field_name("object")
                    .map(|c| self.text(c))
                    .unwrap_or_default();
                let attr = f
                    .child_by_field_name("attribute")
                    .map(|c| self.text(c))
                    .unwrap_or_default();
                (attr.clone(), format!("{object}.{attr}"))
            }
            Some(f) => {
                let name = self.text(f);
                (name.clone(), name)
            }
            None => (String::new(), String::new()),
        };

        let arguments = n
            .child_by_field_name("arguments")
            .map(|args| {
                let mut cursor = args.walk();
                args.named_children(&mut cursor)
                    .map(|a| self.text(a))
                    .collect()
            })
            .unwrap_or_default();

        let payload = MethodCall {
            method_name: method_name.clone(),
            qualified_method,
            arguments,
            type_arguments: Vec::new(),
        };
        let base = self.base(&method_name, n);
        let node = Node::MethodCall(base, payload);
        self.storage.insert_call(&node);
        let idx = self.tree.insert(node, Some(parent));
        self.walk_children(n, idx);
    }

    fn py_if(&mut self, n: TsNode, parent: NodeIndex) {
        let condition = n
            .child_by_field_name("condition")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let then_snippet = n
            .child_by_field_name("consequence")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let else_snippet = n.child_by_field_name("alternative").map(|c| self.text(c));
        let payload = IfStmt { condition, then_snippet, else_snippet };
        let base = self.base("if", n);
        let idx = self.tree.insert(Node::IfStmt(base, payload), Some(parent));
        self.walk_children(n, idx);
    }

    fn py_while(&mut self, n: TsNode, parent: NodeIndex) {
        let condition = n
            .child_by_field_name("condition")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let base = self.base("while", n);
        let idx = self
            .tree
            .insert(Node::WhileStmt(base, WhileStmt { condition }), Some(parent));
        self.walk_children(n, idx);
    }

    fn py_for(&mut self, n: TsNode, parent: NodeIndex) {
        let init = n.child_by_field_name("left").map(|c| self.text(c));
        let condition = n.child_by_field_name("right").map(|c| self.text(c));
        let base = self.base("for", n);
        let idx = self.tree.insert(
            Node::ForStmt(base, ForStmt { init, condition, increment: None }),
            Some(parent),
        );
        self.walk_children(n, idx);
    }

    fn py_block(&mut self, n: TsNode, parent: NodeIndex) {
        let stmts = {
            let mut cursor = n.walk();
            n.named_children(&mut cursor).map(|c| self.text(c)).collect()
        };
        let base = self.base("block", n);
        let idx = self
            .tree
            .insert(Node::BlockStmt(base, BlockStmt { stmts }), Some(parent));
        self.walk_children(n, idx);
    }

    fn py_simple(&mut self, n: TsNode, parent: NodeIndex, variant: fn(crate::node::NodeBase) -> Node) {
        let name = n.kind().to_string();
        let base = self.base(&name, n);
        self.tree.insert(variant(base), Some(parent));
    }
}
