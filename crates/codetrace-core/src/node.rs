//! The typed node model (C2): every parsed syntactic element becomes one
//! [`Node`] value. `Node` is a tagged variant (sum type) rather than a
//! struct with many optional fields, so exactly one payload can ever be
//! populated for a given instance — the "two payloads set" error class is
//! unrepresentable rather than merely disciplined against.

use serde::{Deserialize, Serialize};

/// Discriminant shared by every [`Node`] variant; used wherever code needs
/// the kind without matching out the payload (query candidate selection,
/// call matcher dispatch, framework lookups).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Package,
    ImportType,
    ClassDecl,
    Method,
    MethodCall,
    FieldDecl,
    BinaryExpr,
    ClassInstanceExpr,
    IfStmt,
    WhileStmt,
    DoStmt,
    ForStmt,
    BlockStmt,
    ReturnStmt,
    BreakStmt,
    ContinueStmt,
    YieldStmt,
    AssertStmt,
    Javadoc,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Fields every node kind carries regardless of payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBase {
    pub id: String,
    pub name: String,
    pub code_snippet: String,
    /// 1-indexed, per §4.3 "numeric semantics".
    pub line_number: u32,
    pub file: String,
    /// Whether the file this node came from matches the language under analysis.
    pub is_source_file: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassDecl {
    pub qualified_name: String,
    pub package: String,
    pub modifiers: Vec<String>,
    pub annotations: Vec<String>,
    pub super_types: Vec<String>,
    pub source_file: String,
    pub class_id: String,
    pub javadoc: Option<Javadoc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Method {
    pub qualified_name: String,
    pub return_type: String,
    pub parameter_types: Vec<String>,
    pub parameter_names: Vec<String>,
    pub visibility: String,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_strictfp: bool,
    pub is_constructor: bool,
    pub throws: Vec<String>,
    pub source_declaration: String,
    pub class_id: String,
    /// First line of the method body, 1-indexed; used by the call graph
    /// resolver to map a call site back to its enclosing function without
    /// reconstructing intervals from line starts (§9, open question 3).
    pub line_start: u32,
    pub line_end: u32,
    pub javadoc: Option<Javadoc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MethodCall {
    pub method_name: String,
    pub qualified_method: String,
    pub arguments: Vec<String>,
    pub type_arguments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDecl {
    pub field_type: String,
    pub field_names: Vec<String>,
    pub visibility: String,
    pub is_static: bool,
    pub is_final: bool,
    pub is_volatile: bool,
    pub is_transient: bool,
}

/// The canonical, case-sensitive spelling of a binary operator; used to
/// derive the specialized view without storing a second node (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecializedBinaryKind {
    Add,
    Sub,
    Mul,
    Div,
    Comparison,
    Rem,
    RightShift,
    LeftShift,
    Eq,
    NE,
    AndBitwise,
    OrBitwise,
    XorBitwise,
    AndLogical,
    OrLogical,
    UnsignedRightShift,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub left_operand: String,
    pub right_operand: String,
    pub operator: String,
}

impl BinaryExpr {
    /// The specialized tag this operator corresponds to, if recognized.
    /// Callers (§4.8 accessors, query matching) use this rather than a
    /// second stored sibling node to satisfy "queries targeting either
    /// form find matches".
    pub fn specialized_kind(&self) -> Option<SpecializedBinaryKind> {
        use SpecializedBinaryKind::*;
        Some(match self.operator.as_str() {
            "+" => Add,
            "-" => Sub,
            "*" => Mul,
            "/" => Div,
            "<" | ">" | "<=" | ">=" => Comparison,
            "%" => Rem,
            ">>" => RightShift,
            "<<" => LeftShift,
            "==" => Eq,
            "!=" => NE,
            "&" => AndBitwise,
            "|" => OrBitwise,
            "^" => XorBitwise,
            "&&" => AndLogical,
            "||" => OrLogical,
            ">>>" => UnsignedRightShift,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassInstanceExpr {
    pub class_name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: String,
    pub then_snippet: String,
    pub else_snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DoStmt {
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForStmt {
    pub init: Option<String>,
    pub condition: Option<String>,
    pub increment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockStmt {
    pub stmts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavadocTag {
    pub name: String,
    pub text: String,
    pub doc_type: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Javadoc {
    pub tags: Vec<JavadocTag>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub number_of_lines: u32,
    pub raw_text: String,
}

/// One parsed syntactic element. Exactly one kind-specific payload is
/// carried per variant; kinds with no payload beyond [`NodeBase`] (File,
/// Package, ImportType, the simple statement kinds) carry `NodeBase` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    File(NodeBase),
    Package(NodeBase),
    ImportType(NodeBase),
    ClassDecl(NodeBase, ClassDecl),
    Method(NodeBase, Method),
    MethodCall(NodeBase, MethodCall),
    FieldDecl(NodeBase, FieldDecl),
    BinaryExpr(NodeBase, BinaryExpr),
    ClassInstanceExpr(NodeBase, ClassInstanceExpr),
    IfStmt(NodeBase, IfStmt),
    WhileStmt(NodeBase, WhileStmt),
    DoStmt(NodeBase, DoStmt),
    ForStmt(NodeBase, ForStmt),
    BlockStmt(NodeBase, BlockStmt),
    ReturnStmt(NodeBase),
    BreakStmt(NodeBase),
    ContinueStmt(NodeBase),
    YieldStmt(NodeBase),
    AssertStmt(NodeBase),
    Javadoc(NodeBase, Javadoc),
}

macro_rules! as_kind {
    ($fn_name:ident, $variant:ident, $payload:ty) => {
        pub fn $fn_name(&self) -> Option<(&NodeBase, &$payload)> {
            match self {
                Node::$variant(base, payload) => Some((base, payload)),
                _ => None,
            }
        }
    };
}

impl Node {
    pub fn base(&self) -> &NodeBase {
        match self {
            Node::File(b)
            | Node::Package(b)
            | Node::ImportType(b)
            | Node::ReturnStmt(b)
            | Node::BreakStmt(b)
            | Node::ContinueStmt(b)
            | Node::YieldStmt(b)
            | Node::AssertStmt(b) => b,
            Node::ClassDecl(b, _)
            | Node::Method(b, _)
            | Node::MethodCall(b, _)
            | Node::FieldDecl(b, _)
            | Node::BinaryExpr(b, _)
            | Node::ClassInstanceExpr(b, _)
            | Node::IfStmt(b, _)
            | Node::WhileStmt(b, _)
            | Node::DoStmt(b, _)
            | Node::ForStmt(b, _)
            | Node::BlockStmt(b, _)
            | Node::Javadoc(b, _) => b,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn line(&self) -> u32 {
        self.base().line_number
    }

    pub fn file(&self) -> &str {
        &self.base().file
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Package(_) => NodeKind::Package,
            Node::ImportType(_) => NodeKind::ImportType,
            Node::ClassDecl(..) => NodeKind::ClassDecl,
            Node::Method(..) => NodeKind::Method,
            Node::MethodCall(..) => NodeKind::MethodCall,
            Node::FieldDecl(..) => NodeKind::FieldDecl,
            Node::BinaryExpr(..) => NodeKind::BinaryExpr,
            Node::ClassInstanceExpr(..) => NodeKind::ClassInstanceExpr,
            Node::IfStmt(..) => NodeKind::IfStmt,
            Node::WhileStmt(..) => NodeKind::WhileStmt,
            Node::DoStmt(..) => NodeKind::DoStmt,
            Node::ForStmt(..) => NodeKind::ForStmt,
            Node::BlockStmt(..) => NodeKind::BlockStmt,
            Node::ReturnStmt(_) => NodeKind::ReturnStmt,
            Node::BreakStmt(_) => NodeKind::BreakStmt,
            Node::ContinueStmt(_) => NodeKind::ContinueStmt,
            Node::YieldStmt(_) => NodeKind::YieldStmt,
            Node::AssertStmt(_) => NodeKind::AssertStmt,
            Node::Javadoc(..) => NodeKind::Javadoc,
        }
    }

    as_kind!(as_class_decl, ClassDecl, ClassDecl);
    as_kind!(as_method, Method, Method);
    as_kind!(as_method_call, MethodCall, MethodCall);
    as_kind!(as_field_decl, FieldDecl, FieldDecl);
    as_kind!(as_binary_expr, BinaryExpr, BinaryExpr);
    as_kind!(as_class_instance_expr, ClassInstanceExpr, ClassInstanceExpr);
    as_kind!(as_if_stmt, IfStmt, IfStmt);
    as_kind!(as_while_stmt, WhileStmt, WhileStmt);
    as_kind!(as_do_stmt, DoStmt, DoStmt);
    as_kind!(as_for_stmt, ForStmt, ForStmt);
    as_kind!(as_block_stmt, BlockStmt, BlockStmt);
    as_kind!(as_javadoc, Javadoc, Javadoc);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(name: &str) -> NodeBase {
        NodeBase {
            id: "id1".into(),
            name: name.into(),
            code_snippet: name.into(),
            line_number: 3,
            file: "a.py".into(),
            is_source_file: true,
        }
    }

    #[test]
    fn as_kind_fails_cleanly_on_mismatch() {
        let n = Node::ReturnStmt(base("return"));
        assert!(n.as_method().is_none());
        assert_eq!(n.kind(), NodeKind::ReturnStmt);
    }

    #[test]
    fn as_kind_succeeds_on_match() {
        let n = Node::Method(base("run"), Method::default());
        let (b, m) = n.as_method().unwrap();
        assert_eq!(b.name, "run");
        assert_eq!(m.visibility, "");
    }

    #[test]
    fn common_accessors_read_through_base() {
        let n = Node::ClassDecl(base("Calculator"), ClassDecl::default());
        assert_eq!(n.name(), "Calculator");
        assert_eq!(n.line(), 3);
        assert_eq!(n.file(), "a.py");
    }

    #[test]
    fn specialized_binary_kind_maps_known_operators() {
        let add = BinaryExpr {
            operator: "+".into(),
            ..Default::default()
        };
        assert_eq!(add.specialized_kind(), Some(SpecializedBinaryKind::Add));

        let unknown = BinaryExpr {
            operator: "~".into(),
            ..Default::default()
        };
        assert_eq!(unknown.specialized_kind(), None);
    }
}
