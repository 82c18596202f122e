//! Query Planner & Executor (C9): joins candidate tuples per SELECT list,
//! applies the filter, projects output (§4.9). `Query`/`ExpressionTree` are
//! the output types the external `QueryParser` boundary (§1) produces;
//! this crate defines their shape and consumes them, never a grammar.

use std::collections::HashMap;

use codetrace_core::{Node, NodeKind};

use crate::eval::{evaluate, evaluate_predicate, Environment};
use crate::expr::{self, Expr};
use crate::predicate::{substitute_predicates, PredicateDef};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct SelectEntry {
    pub alias: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum OutputSpec {
    Str(String),
    Variable(String),
    MethodChain(String),
}

#[derive(Debug, Clone)]
pub enum QueryExpression {
    Text(String),
    Tree(ExpressionTree),
}

#[derive(Debug, Clone)]
pub struct Query {
    pub select_list: Vec<SelectEntry>,
    pub expression: QueryExpression,
    pub select_output: Vec<OutputSpec>,
    pub predicates: HashMap<String, PredicateDef>,
    pub classes: Vec<String>,
}

/// A per-alias attribute row, as produced by the external `QueryParser`'s
/// entity materialization for the expression-tree path (§4.9.1).
#[derive(Debug, Clone)]
pub struct EntityData {
    pub alias: String,
    pub rows: Vec<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone)]
pub enum ExpressionTree {
    Compare {
        alias: String,
        field: String,
        op: CompareOp,
        value: Value,
    },
    And(Box<ExpressionTree>, Box<ExpressionTree>),
    Or(Box<ExpressionTree>, Box<ExpressionTree>),
}

/// Relates rows of two aliases by a shared key (e.g. class↔method via
/// `class_id`), restricting the product before full materialization.
#[derive(Debug, Clone, Default)]
pub struct RelationshipMap {
    /// `(alias_a, alias_b) -> [(row index in a, row index in b)]`.
    pub joins: HashMap<(String, String), Vec<(usize, usize)>>,
}

/// The indexed typed model the planner draws candidate sets from: every
/// node produced by the tree builder across every file in the project,
/// grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct QueryIndex {
    by_kind: HashMap<NodeKind, Vec<Node>>,
}

impl QueryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node) {
        self.by_kind.entry(node.kind()).or_default().push(node);
    }

    pub fn candidates(&self, kind: NodeKind) -> &[Node] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub rows: Vec<Vec<String>>,
}

pub struct QueryPlanner<'a> {
    index: &'a QueryIndex,
    is_java_source: bool,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(index: &'a QueryIndex, is_java_source: bool) -> Self {
        Self { index, is_java_source }
    }

    pub fn execute(&self, query: &Query) -> QueryResult {
        self.execute_with_relationships(query, None)
    }

    /// Decision on §9 open question 1: the expression-tree path is used
    /// only when the query carries a pre-built `ExpressionTree` AND a
    /// `RelationshipMap` is supplied; otherwise the planner falls back to
    /// full Cartesian-product materialization with text-expression
    /// evaluation per tuple.
    pub fn execute_with_relationships(
        &self,
        query: &Query,
        relationships: Option<&RelationshipMap>,
    ) -> QueryResult {
        match (&query.expression, relationships) {
            (QueryExpression::Tree(tree), Some(rel)) => self.execute_tree(query, tree, rel),
            _ => self.execute_product(query),
        }
    }

    fn execute_product(&self, query: &Query) -> QueryResult {
        let candidate_sets: Vec<&[Node]> = query
            .select_list
            .iter()
            .map(|entry| self.index.candidates(entry.kind))
            .collect();

        let expr_text = match &query.expression {
            QueryExpression::Text(t) => t.clone(),
            QueryExpression::Tree(_) => {
                tracing::warn!("expression tree supplied without a RelationshipMap; falling back to text path is not possible");
                String::new()
            }
        };
        let substituted = substitute_predicates(&expr_text, &query.predicates);
        let expr = match expr::parse(&substituted) {
            Ok(e) => e,
            Err(err) => {
                tracing::error!(error = %err, "malformed filter expression; returning zero rows");
                return QueryResult::default();
            }
        };

        let mut rows = Vec::new();
        for tuple in cartesian_product(&candidate_sets) {
            let mut env = Environment::new().with_java_source_file(self.is_java_source);
            for (entry, node) in query.select_list.iter().zip(tuple.iter()) {
                env.bind_entity(&entry.alias, *node);
            }
            if evaluate_predicate(&expr, &env) {
                rows.push(self.project(query, &expr, &env));
            }
        }
        QueryResult { rows }
    }

    fn project(&self, query: &Query, _expr: &Expr, env: &Environment) -> Vec<String> {
        query
            .select_output
            .iter()
            .filter_map(|spec| match spec {
                OutputSpec::Str(literal) => {
                    Some(literal.trim_matches('"').trim_matches('\'').to_string())
                }
                OutputSpec::Variable(var_expr) => {
                    let with_tostring = if var_expr.contains(".toString()") {
                        var_expr.clone()
                    } else {
                        format!("{var_expr}.toString()")
                    };
                    expr::parse(&with_tostring)
                        .ok()
                        .map(|e| evaluate(&e, env).to_string())
                }
                OutputSpec::MethodChain(chain) => {
                    if !chain.contains('.') {
                        return None;
                    }
                    expr::parse(chain).ok().map(|e| evaluate(&e, env).to_string())
                }
            })
            .collect()
    }

    fn execute_tree(
        &self,
        query: &Query,
        tree: &ExpressionTree,
        relationships: &RelationshipMap,
    ) -> QueryResult {
        let data: HashMap<String, EntityData> = query
            .select_list
            .iter()
            .map(|entry| {
                let rows = self
                    .index
                    .candidates(entry.kind)
                    .iter()
                    .map(|node| materialize(node))
                    .collect();
                (entry.alias.clone(), EntityData { alias: entry.alias.clone(), rows })
            })
            .collect();

        let surviving = eval_tree(tree, &data, relationships);

        let nodes_by_alias: HashMap<&str, &[Node]> = query
            .select_list
            .iter()
            .map(|e| (e.alias.as_str(), self.index.candidates(e.kind)))
            .collect();

        let mut rows = Vec::new();
        for combo in surviving {
            let mut env = Environment::new().with_java_source_file(self.is_java_source);
            for (alias, row_idx) in &combo {
                if let Some(nodes) = nodes_by_alias.get(alias.as_str()) {
                    if let Some(node) = nodes.get(*row_idx) {
                        env.bind_entity(alias, node);
                    }
                }
            }
            rows.push(self.project(query, &Expr::Lit(Value::Bool(true)), &env));
        }
        QueryResult { rows }
    }
}

fn materialize(node: &Node) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    map.insert("name".to_string(), Value::Str(node.name().to_string()));
    map.insert("line".to_string(), Value::Num(node.line() as f64));
    if let Node::Method(_, m) = node {
        map.insert("class_id".to_string(), Value::Str(m.class_id.clone()));
    }
    if let Node::ClassDecl(_, c) = node {
        map.insert("class_id".to_string(), Value::Str(c.class_id.clone()));
    }
    map
}

/// A surviving combination is a set of `(alias, row_index)` pairs.
type RowCombo = Vec<(String, usize)>;

fn eval_tree(
    tree: &ExpressionTree,
    data: &HashMap<String, EntityData>,
    relationships: &RelationshipMap,
) -> Vec<RowCombo> {
    match tree {
        ExpressionTree::Compare { alias, field, op, value } => data
            .get(alias)
            .map(|entity| {
                entity
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| compare_matches(row.get(field), *op, value))
                    .map(|(idx, _)| vec![(alias.clone(), idx)])
                    .collect()
            })
            .unwrap_or_default(),
        ExpressionTree::And(a, b) => {
            let left = eval_tree(a, data, relationships);
            let right = eval_tree(b, data, relationships);
            intersect_or_join(left, right, relationships)
        }
        ExpressionTree::Or(a, b) => {
            let mut left = eval_tree(a, data, relationships);
            let right = eval_tree(b, data, relationships);
            left.extend(right);
            dedup_combos(left)
        }
    }
}

fn compare_matches(field_value: Option<&Value>, op: CompareOp, expected: &Value) -> bool {
    let Some(actual) = field_value else { return false };
    match op {
        CompareOp::Eq => actual == expected,
        CompareOp::Ne => actual != expected,
        CompareOp::Lt | CompareOp::Gt | CompareOp::Le | CompareOp::Ge => {
            match (actual.as_num(), expected.as_num()) {
                (Some(a), Some(b)) => match op {
                    CompareOp::Lt => a < b,
                    CompareOp::Gt => a > b,
                    CompareOp::Le => a <= b,
                    CompareOp::Ge => a >= b,
                    CompareOp::Eq | CompareOp::Ne => unreachable!(),
                },
                _ => false,
            }
        }
    }
}

/// Combines two surviving row-combo sets. When the relationship map relates
/// a pair of aliases appearing on each side, only joined pairs survive;
/// otherwise the two sets are combined as independent combos (set union of
/// their bound aliases is not restricted further).
fn intersect_or_join(left: Vec<RowCombo>, right: Vec<RowCombo>, rel: &RelationshipMap) -> Vec<RowCombo> {
    let mut out = Vec::new();
    for l in &left {
        for r in &right {
            if let Some(merged) = try_join(l, r, rel) {
                out.push(merged);
            }
        }
    }
    dedup_combos(out)
}

fn try_join(l: &RowCombo, r: &RowCombo, rel: &RelationshipMap) -> Option<RowCombo> {
    let mut merged = l.clone();
    for (r_alias, r_idx) in r {
        // Every existing alias in `l` must stay compatible with this
        // incoming (r_alias, r_idx) pair, not just the last one checked.
        let mut compatible = true;
        for (l_alias, l_idx) in l {
            if l_alias == r_alias {
                compatible &= *l_idx == *r_idx;
                continue;
            }
            let forward = (l_alias.clone(), r_alias.clone());
            let backward = (r_alias.clone(), l_alias.clone());
            if let Some(pairs) = rel.joins.get(&forward) {
                compatible &= pairs.contains(&(*l_idx, *r_idx));
            } else if let Some(pairs) = rel.joins.get(&backward) {
                compatible &= pairs.contains(&(*r_idx, *l_idx));
            }
        }
        if !compatible {
            return None;
        }
        if !merged.iter().any(|(a, i)| a == r_alias && *i == *r_idx) {
            merged.push((r_alias.clone(), *r_idx));
        }
    }
    Some(merged)
}

fn dedup_combos(mut combos: Vec<RowCombo>) -> Vec<RowCombo> {
    for combo in combos.iter_mut() {
        combo.sort();
    }
    combos.sort();
    combos.dedup();
    combos
}

fn cartesian_product<'a>(sets: &[&'a [Node]]) -> Vec<Vec<&'a Node>> {
    let mut out: Vec<Vec<&Node>> = vec![Vec::new()];
    for set in sets {
        let mut next = Vec::new();
        for prefix in &out {
            for item in set.iter() {
                let mut extended = prefix.clone();
                extended.push(item);
                next.push(extended);
            }
        }
        out = next;
    }
    if sets.is_empty() {
        Vec::new()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codetrace_core::node::{ClassDecl, Method};
    use codetrace_core::NodeBase;

    fn base(name: &str, line: u32) -> NodeBase {
        NodeBase {
            id: format!("id-{name}-{line}"),
            name: name.into(),
            code_snippet: name.into(),
            line_number: line,
            file: "Calculator.java".into(),
            is_source_file: true,
        }
    }

    fn sample_index() -> QueryIndex {
        let mut idx = QueryIndex::new();
        idx.insert(Node::ClassDecl(base("Calculator", 1), ClassDecl::default()));
        idx.insert(Node::Method(
            base("add", 2),
            Method {
                parameter_names: vec!["self".into(), "x".into(), "y".into()],
                ..Default::default()
            },
        ));
        idx.insert(Node::Method(
            base("subtract", 3),
            Method {
                parameter_names: vec!["self".into(), "x".into(), "y".into()],
                ..Default::default()
            },
        ));
        idx.insert(Node::Method(
            base("process_data", 4),
            Method {
                parameter_names: vec!["data".into()],
                ..Default::default()
            },
        ));
        idx
    }

    #[test]
    fn s6_class_query_yields_one_row() {
        let idx = sample_index();
        let query = Query {
            select_list: vec![SelectEntry { alias: "c".into(), kind: NodeKind::ClassDecl }],
            expression: QueryExpression::Text(r#"c.getName()=="Calculator""#.into()),
            select_output: vec![OutputSpec::Variable("c".into())],
            predicates: HashMap::new(),
            classes: Vec::new(),
        };
        let planner = QueryPlanner::new(&idx, true);
        let result = planner.execute(&query);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn s6_argument_count_query_yields_two_rows() {
        let idx = sample_index();
        let query = Query {
            select_list: vec![SelectEntry { alias: "f".into(), kind: NodeKind::Method }],
            expression: QueryExpression::Text("len(f.getArgumentName())==3".into()),
            select_output: vec![OutputSpec::Variable("f".into())],
            predicates: HashMap::new(),
            classes: Vec::new(),
        };
        let planner = QueryPlanner::new(&idx, true);
        let result = planner.execute(&query);
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn query_idempotence() {
        let idx = sample_index();
        let query = Query {
            select_list: vec![SelectEntry { alias: "c".into(), kind: NodeKind::ClassDecl }],
            expression: QueryExpression::Text(r#"c.getName()=="Calculator""#.into()),
            select_output: vec![OutputSpec::Str("\"found\"".into())],
            predicates: HashMap::new(),
            classes: Vec::new(),
        };
        let planner = QueryPlanner::new(&idx, true);
        let first = planner.execute(&query);
        let second = planner.execute(&query);
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn malformed_expression_yields_zero_rows() {
        let idx = sample_index();
        let query = Query {
            select_list: vec![SelectEntry { alias: "c".into(), kind: NodeKind::ClassDecl }],
            expression: QueryExpression::Text("c.getName(==".into()),
            select_output: vec![],
            predicates: HashMap::new(),
            classes: Vec::new(),
        };
        let planner = QueryPlanner::new(&idx, true);
        assert!(planner.execute(&query).rows.is_empty());
    }

    #[test]
    fn try_join_requires_every_existing_alias_to_stay_compatible() {
        // left carries two aliases (as a merged `And(Compare a, Compare b)`
        // combo would); only the `b`-`c` relationship is satisfied, `a`-`c`
        // is not. The join must fail on the `a`-`c` violation rather than
        // let the later `b`-`c` check overwrite it.
        let left: RowCombo = vec![("a".to_string(), 0), ("b".to_string(), 1)];
        let right: RowCombo = vec![("c".to_string(), 2)];

        let mut rel = RelationshipMap::default();
        rel.joins.insert(("a".to_string(), "c".to_string()), vec![(5, 2)]);
        rel.joins.insert(("b".to_string(), "c".to_string()), vec![(1, 2)]);

        assert!(try_join(&left, &right, &rel).is_none());
    }

    #[test]
    fn try_join_checks_both_key_orderings_in_the_relationship_map() {
        let left: RowCombo = vec![("a".to_string(), 0)];
        let right: RowCombo = vec![("c".to_string(), 2)];

        // Stored under (c, a) instead of (a, c); row order within the pair
        // matches the stored key's alias order.
        let mut rel = RelationshipMap::default();
        rel.joins.insert(("c".to_string(), "a".to_string()), vec![(2, 0)]);

        let merged = try_join(&left, &right, &rel).expect("reverse-keyed join should still match");
        assert_eq!(merged.len(), 2);
    }
}
