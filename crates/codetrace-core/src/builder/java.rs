use tree_sitter::Node as TsNode;

use crate::id::{generate_method_id, source_key};
use crate::node::{
    BlockStmt, ClassDecl, ClassInstanceExpr, DoStmt, FieldDecl, ForStmt, IfStmt, Javadoc, Method,
    MethodCall, Node, WhileStmt,
};
use crate::tree::NodeIndex;

use super::BuildCtx;

impl<'a> BuildCtx<'a> {
    pub(super) fn dispatch_java(&mut self, n: TsNode, parent: NodeIndex, doc: Option<Javadoc>) {
        match n.kind() {
            "package_declaration" => self.java_package(n, parent),
            "import_declaration" => self.java_import(n, parent),
            "class_declaration" | "interface_declaration" | "enum_declaration" => {
                self.java_class(n, parent, doc)
            }
            "method_declaration" => self.java_method(n, parent, doc, false),
            "constructor_declaration" => self.java_method(n, parent, doc, true),
            "field_declaration" => self.java_field(n, parent),
            "method_invocation" => self.java_call(n, parent),
            "object_creation_expression" => self.java_new(n, parent),
            "binary_expression" => self.attach_binary_expr(n, parent),
            "if_statement" => self.java_if(n, parent),
            "while_statement" => self.java_while(n, parent),
            "do_statement" => self.java_do(n, parent),
            "for_statement" => self.java_for(n, parent),
            "block" => self.java_block(n, parent),
            "return_statement" => self.java_simple(n, parent, Node::ReturnStmt),
            "break_statement" => self.java_simple(n, parent, Node::BreakStmt),
            "continue_statement" => self.java_simple(n, parent, Node::ContinueStmt),
            "assert_statement" => self.java_simple(n, parent, Node::AssertStmt),
            _ => self.walk_children(n, parent),
        }
    }

    fn java_package(&mut self, n: TsNode, parent: NodeIndex) {
        let name = n
            .child_by_field_name("name")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let base = self.base(&name, n);
        let node = Node::Package(base);
        self.storage.insert_package(&node);
        self.tree.insert(node, Some(parent));
    }

    fn java_import(&mut self, n: TsNode, parent: NodeIndex) {
        let path_text = self.text(n);
        let path = path_text
            .trim_start_matches("import")
            .trim_end_matches(';')
            .trim();
        if let Some((module, name)) = path.rsplit_once('.') {
            self.import_map.add_from_import(module, name);
        } else {
            self.import_map.add_plain_import(path);
        }
        let base = self.base(path, n);
        let node = Node::ImportType(base);
        self.storage.insert_import(&node);
        self.tree.insert(node, Some(parent));
    }

    fn java_class(&mut self, n: TsNode, parent: NodeIndex, doc: Option<Javadoc>) {
        let name = n
            .child_by_field_name("name")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let (modifiers, _, _, _, _, _) = self.modifiers_of(n);
        let super_types = n
            .child_by_field_name("superclass")
            .map(|c| vec![self.text(c)])
            .unwrap_or_default();

        let key = source_key(self.file, self.line_of(n), n.start_position().column as u32);
        let class_id = crate::id::generate_node_id("class_declaration", &name, &key);

        let payload = ClassDecl {
            qualified_name: name.clone(),
            package: String::new(),
            modifiers,
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

        let prev_class = self.current_class_id.replace(class_id);
        let prev_name = self.current_class_name.replace(name);
        if let Some(body) = n.child_by_field_name("body") {
            self.walk_children(body, idx);
        }
        self.current_class_id = prev_class;
        self.current_class_name = prev_name;
    }

    fn java_method(&mut self, n: TsNode, parent: NodeIndex, doc: Option<Javadoc>, is_ctor: bool) {
        let name = n
            .child_by_field_name("name")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let return_type = n
            .child_by_field_name("type")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let (mut parameter_types, mut parameter_names) = (Vec::new(), Vec::new());
        if let Some(params) = n.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for p in params.named_children(&mut cursor) {
                if p.kind() == "formal_parameter" || p.kind() == "spread_parameter" {
                    parameter_types.push(
                        p.child_by_field_name("type")
                            .map(|c| self.text(c))
                            .unwrap_or_default(),
                    );
                    parameter_names.push(
                        p.child_by_field_name("name")
                            .map(|c| self.text(c))
                            .unwrap_or_default(),
                    );
                }
            }
        }
        let (_, visibility, is_static, is_final, is_abstract, is_strictfp) = self.modifiers_of(n);
        let throws = n
            .child_by_field_name("throws")
            .map(|c| {
                self.text(c)
                    .trim_start_matches("throws")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

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
            visibility,
            is_abstract,
            is_static,
            is_final,
            is_strictfp,
            is_constructor: is_ctor,
            throws,
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

    fn java_field(&mut self, n: TsNode, parent: NodeIndex) {
        let field_type = n
            .child_by_field_name("type")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let mut names = Vec::new();
        let mut cursor = n.walk();
        for child in n.named_children(&mut cursor) {
            if child.kind() == "variable_declarator" {
                if let Some(name_node) = child.child_by_field_name("name") {
                    names.push(self.text(name_node));
                }
            }
        }
        let (mods, visibility, is_static, is_final, _, _) = self.modifiers_of(n);
        let is_volatile = mods.iter().any(|m| m == "volatile");
        let is_transient = mods.iter().any(|m| m == "transient");

        let payload = FieldDecl {
            field_type,
            field_names: names.clone(),
            visibility,
            is_static,
            is_final,
            is_volatile,
            is_transient,
        };
        let base = self.base(&names.join(","), n);
        let node = Node::FieldDecl(base, payload);
        self.storage.insert_field(&node);
        self.tree.insert(node, Some(parent));
    }

    fn java_call(&mut self, n: TsNode, parent: NodeIndex) {
        let method_name = n
            .child_by_field_name("name")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let qualified_method = n
            .child_by_field_name("object")
            .map(|o| format!("{}.{}", self.text(o), method_name))
            .unwrap_or_else(|| method_name.clone());

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

    fn java_new(&mut self, n: TsNode, parent: NodeIndex) {
        let class_name = n
            .child_by_field_name("type")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let args = n
            .child_by_field_name("arguments")
            .map(|a| {
                let mut cursor = a.walk();
                a.named_children(&mut cursor).map(|c| self.text(c)).collect()
            })
            .unwrap_or_default();
        let payload = ClassInstanceExpr { class_name: class_name.clone(), args };
        let base = self.base(&class_name, n);
        let node = Node::ClassInstanceExpr(base, payload);
        self.tree.insert(node, Some(parent));
    }

    fn java_if(&mut self, n: TsNode, parent: NodeIndex) {
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

    fn java_while(&mut self, n: TsNode, parent: NodeIndex) {
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

    fn java_do(&mut self, n: TsNode, parent: NodeIndex) {
        let condition = n
            .child_by_field_name("condition")
            .map(|c| self.text(c))
            .unwrap_or_default();
        let base = self.base("do", n);
        let idx = self
            .tree
            .insert(Node::DoStmt(base, DoStmt { condition }), Some(parent));
        self.walk_children(n, idx);
    }

    fn java_for(&mut self, n: TsNode, parent: NodeIndex) {
        let init = n.child_by_field_name("init").map(|c| self.text(c));
        let condition = n.child_by_field_name("condition").map(|c| self.text(c));
        let increment = n.child_by_field_name("update").map(|c| self.text(c));
        let base = self.base("for", n);
        let idx = self.tree.insert(
            Node::ForStmt(base, ForStmt { init, condition, increment }),
            Some(parent),
        );
        self.walk_children(n, idx);
    }

    fn java_block(&mut self, n: TsNode, parent: NodeIndex) {
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

    fn java_simple(&mut self, n: TsNode, parent: NodeIndex, variant: fn(crate::node::NodeBase) -> Node) {
        let name = n.kind().to_string();
        let base = self.base(&name, n);
        self.tree.insert(variant(base), Some(parent));
    }
}
