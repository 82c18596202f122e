//! Evaluates a parsed [`Expr`] against an environment of bound entities
//! (§4.8). Evaluation is side-effect-free; any runtime type error (e.g. an
//! accessor absent for the bound kind) degrades to `Value::Missing` rather
//! than propagating, consistent with "evaluation errors are surfaced as a
//! false predicate" (§4.8, §7).

use std::collections::HashMap;

use crate::expr::Expr;
use crate::value::{Queryable, Value};

pub struct Environment<'a> {
    entities: Vec<&'a dyn Queryable>,
    aliases: HashMap<String, usize>,
    bindings: HashMap<String, Value>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            aliases: HashMap::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn bind_entity(&mut self, alias: &str, entity: &'a dyn Queryable) {
        let idx = self.entities.len();
        self.entities.push(entity);
        self.aliases.insert(alias.to_string(), idx);
    }

    pub fn bind_value(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    /// `isJavaSourceFile` is always bound at the top level (§4.8).
    pub fn with_java_source_file(mut self, is_java: bool) -> Self {
        self.bind_value("isJavaSourceFile", Value::Bool(is_java));
        self
    }
}

impl<'a> Default for Environment<'a> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn evaluate(expr: &Expr, env: &Environment) -> Value {
    match expr {
        Expr::Lit(v) => v.clone(),
        Expr::Ident(name) => {
            if let Some(&idx) = env.aliases.get(name) {
                Value::Entity(idx)
            } else if let Some(v) = env.bindings.get(name) {
                v.clone()
            } else {
                Value::Missing
            }
        }
        Expr::Member(base, field) => {
            let base_val = evaluate(base, env);
            eval_member(&base_val, field, env)
        }
        Expr::Call(callee, args) => eval_call(callee, args, env),
        Expr::Unary(op, inner) => {
            let v = evaluate(inner, env);
            match (*op, v) {
                ("!", Value::Bool(b)) => Value::Bool(!b),
                ("-", Value::Num(n)) => Value::Num(-n),
                _ => Value::Missing,
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = evaluate(lhs, env);
            let r = evaluate(rhs, env);
            eval_binary(op, &l, &r, env)
        }
    }
}

fn eval_member(base: &Value, field: &str, env: &Environment) -> Value {
    match base {
        Value::Entity(idx) => env
            .entities
            .get(*idx)
            .and_then(|e| e.accessor(field))
            .unwrap_or(Value::Missing),
        other if field == "toString" => Value::Str(other.to_string()),
        _ => Value::Missing,
    }
}

fn eval_call(callee: &Expr, args: &[Expr], env: &Environment) -> Value {
    if let Expr::Ident(name) = callee {
        if name == "len" {
            let arg = args.first().map(|a| evaluate(a, env)).unwrap_or(Value::Missing);
            return arg.len().map(|n| Value::Num(n as f64)).unwrap_or(Value::Missing);
        }
    }
    // Accessors are zero-argument closures (§4.8): a call on a member
    // access behaves exactly like the bare member access.
    evaluate(callee, env)
}

fn eval_binary(op: &str, l: &Value, r: &Value, env: &Environment) -> Value {
    match op {
        "&&" => match (l.as_bool(), r.as_bool()) {
            (Some(a), Some(b)) => Value::Bool(a && b),
            _ => Value::Missing,
        },
        "||" => match (l.as_bool(), r.as_bool()) {
            (Some(a), Some(b)) => Value::Bool(a || b),
            _ => Value::Missing,
        },
        "==" => Value::Bool(values_equal(l, r, env)),
        "!=" => Value::Bool(!values_equal(l, r, env)),
        "<" | ">" | "<=" | ">=" => match (l.as_num(), r.as_num()) {
            (Some(a), Some(b)) => Value::Bool(match op {
                "<" => a < b,
                ">" => a > b,
                "<=" => a <= b,
                ">=" => a >= b,
                _ => unreachable!(),
            }),
            _ => Value::Missing,
        },
        "+" | "-" | "*" | "/" | "%" => match (l.as_num(), r.as_num()) {
            (Some(a), Some(b)) => Value::Num(match op {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                "/" if b != 0.0 => a / b,
                "%" if b != 0.0 => a % b,
                _ => return Value::Missing,
            }),
            _ => Value::Missing,
        },
        _ => Value::Missing,
    }
}

fn values_equal(l: &Value, r: &Value, env: &Environment) -> bool {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Num(a), Value::Num(b)) => (a - b).abs() < f64::EPSILON,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Entity(_), _) | (_, Value::Entity(_)) => {
            let _ = env;
            false
        }
        _ => false,
    }
}

/// Evaluates `expr` as a boolean predicate; any non-boolean or missing
/// result excludes the tuple (§4.8, §7).
pub fn evaluate_predicate(expr: &Expr, env: &Environment) -> bool {
    evaluate(expr, env).as_bool().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use codetrace_core::node::ClassDecl;
    use codetrace_core::{Node, NodeBase};

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
    fn s6_class_name_equality() {
        let class = Node::ClassDecl(base("Calculator"), ClassDecl::default());
        let mut env = Environment::new().with_java_source_file(true);
        env.bind_entity("c", &class);
        let expr = parse(r#"c.getName()=="Calculator""#).unwrap();
        assert!(evaluate_predicate(&expr, &env));
    }

    #[test]
    fn s6_argument_count_via_len() {
        let method = codetrace_core::node::Method {
            parameter_names: vec!["self".into(), "x".into(), "y".into()],
            ..Default::default()
        };
        let node = Node::Method(base("add"), method);
        let mut env = Environment::new();
        env.bind_entity("f", &node);
        let expr = parse("len(f.getArgumentName())==3").unwrap();
        assert!(evaluate_predicate(&expr, &env));
    }

    #[test]
    fn unknown_accessor_excludes_tuple() {
        let class = Node::ClassDecl(base("Calculator"), ClassDecl::default());
        let mut env = Environment::new();
        env.bind_entity("c", &class);
        let expr = parse(r#"c.getNope()=="x""#).unwrap();
        assert!(!evaluate_predicate(&expr, &env));
    }
}
