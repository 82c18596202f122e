//! Runtime values for the expression evaluator (C8), and the `Queryable`
//! capability trait (§9) that replaces dynamic per-entity accessor maps
//! built at query time with one fixed implementation per entity kind.

use std::fmt;

use codetrace_core::Node;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
    List(Vec<Value>),
    /// A reference into the evaluator's bound entity slots; produced only
    /// while evaluating an `Ident` that names a query alias.
    Entity(usize),
    /// An accessor absent for the bound entity kind, or an identifier with
    /// no binding. Evaluates as `false` wherever a predicate is required
    /// (§9: "unknown accessors return a typed 'missing' value").
    Missing,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => write!(
                f,
                "[{}]",
                items.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
            ),
            Value::Entity(_) => write!(f, "<entity>"),
            Value::Missing => write!(f, ""),
        }
    }
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::Str(s) => Some(s.chars().count()),
            _ => None,
        }
    }
}

/// One entity's accessor bundle, implemented once per supported kind
/// (§4.8). `accessor` returns `None` for attributes the kind does not
/// expose; callers convert that to `Value::Missing`.
pub trait Queryable {
    fn accessor(&self, name: &str) -> Option<Value>;
}

fn list_of(items: &[String]) -> Value {
    Value::List(items.iter().cloned().map(Value::Str).collect())
}

impl Queryable for Node {
    fn accessor(&self, name: &str) -> Option<Value> {
        if name == "toString" {
            return Some(Value::Str(self.base().code_snippet.clone()));
        }
        if name == "getName" {
            return Some(Value::Str(self.name().to_string()));
        }
        if name == "getDoc" {
            return method_doc(self);
        }

        match self {
            Node::Method(_, m) => match name {
                "getVisibility" => Some(Value::Str(m.visibility.clone())),
                "getAnnotation" => Some(Value::List(Vec::new())),
                "getReturnType" => Some(Value::Str(m.return_type.clone())),
                "getArgumentType" => Some(list_of(&m.parameter_types)),
                "getArgumentName" => Some(list_of(&m.parameter_names)),
                "getThrowsType" => Some(list_of(&m.throws)),
                _ => None,
            },
            Node::ClassDecl(_, c) => match name {
                "getSuperClass" => Some(Value::Str(c.super_types.first().cloned().unwrap_or_default())),
                "getAnnotation" => Some(list_of(&c.annotations)),
                "getVisibility" => Some(Value::Str(
                    c.modifiers
                        .iter()
                        .find(|m| matches!(m.as_str(), "public" | "private" | "protected"))
                        .cloned()
                        .unwrap_or_default(),
                )),
                "getInterface" => Some(list_of(&c.super_types)),
                _ => None,
            },
            Node::MethodCall(_, mc) => match name {
                "getArgumentName" => Some(list_of(&mc.arguments)),
                _ => None,
            },
            Node::FieldDecl(_, field) => match name {
                "getVisibility" => Some(Value::Str(field.visibility.clone())),
                "getVariableValue" => Some(Value::Missing),
                "getVariableDataType" => Some(Value::Str(field.field_type.clone())),
                "getScope" => Some(Value::Missing),
                _ => None,
            },
            Node::BinaryExpr(_, b) => match name {
                "getLeftOperand" => Some(Value::Str(b.left_operand.clone())),
                "getRightOperand" => Some(Value::Str(b.right_operand.clone())),
                "getBinaryExpr" => Some(Value::Str(b.operator.clone())),
                "getOperator" if b.specialized_kind().is_some() => {
                    Some(Value::Str(b.operator.clone()))
                }
                _ => None,
            },
            Node::IfStmt(..)
            | Node::WhileStmt(..)
            | Node::DoStmt(..)
            | Node::ForStmt(..)
            | Node::ReturnStmt(_)
            | Node::BreakStmt(_)
            | Node::ContinueStmt(_)
            | Node::YieldStmt(_)
            | Node::AssertStmt(_)
            | Node::BlockStmt(..)
            | Node::ClassInstanceExpr(..) => {
                let expected = format!("get{}", stmt_kind_label(self));
                (name == expected).then(|| Value::Str(self.base().code_snippet.clone()))
            }
            _ => None,
        }
    }
}

fn method_doc(n: &Node) -> Option<Value> {
    let doc = match n {
        Node::Method(_, m) => m.javadoc.as_ref(),
        Node::ClassDecl(_, c) => c.javadoc.as_ref(),
        _ => None,
    };
    Some(Value::Str(doc.map(|d| d.raw_text.clone()).unwrap_or_default()))
}

fn stmt_kind_label(n: &Node) -> &'static str {
    match n {
        Node::IfStmt(..) => "IfStmt",
        Node::WhileStmt(..) => "WhileStmt",
        Node::DoStmt(..) => "DoStmt",
        Node::ForStmt(..) => "ForStmt",
        Node::ReturnStmt(_) => "ReturnStmt",
        Node::BreakStmt(_) => "BreakStmt",
        Node::ContinueStmt(_) => "ContinueStmt",
        Node::YieldStmt(_) => "YieldStmt",
        Node::AssertStmt(_) => "AssertStmt",
        Node::BlockStmt(..) => "BlockStmt",
        Node::ClassInstanceExpr(..) => "ClassInstanceExpr",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codetrace_core::node::Method;
    use codetrace_core::NodeBase;

    fn base(name: &str) -> NodeBase {
        NodeBase {
            id: "id".into(),
            name: name.into(),
            code_snippet: name.into(),
            line_number: 1,
            file: "a.java".into(),
            is_source_file: true,
        }
    }

    #[test]
    fn method_exposes_argument_name_list() {
        let method = Method {
            parameter_names: vec!["self".into(), "x".into(), "y".into()],
            ..Default::default()
        };
        let node = Node::Method(base("add"), method);
        let names = node.accessor("getArgumentName").unwrap();
        assert_eq!(names.len(), Some(3));
    }

    #[test]
    fn unknown_accessor_returns_none() {
        let node = Node::Method(base("add"), Method::default());
        assert!(node.accessor("getNonexistentThing").is_none());
    }
}
