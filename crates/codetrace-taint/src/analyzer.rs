//! A single-function heuristic taint scanner grounded on the common
//! source/sink/sanitizer vocabulary of static taint tools: it walks a
//! method's `MethodCall` descendants (stopping at nested method
//! boundaries, mirroring the call graph's own call-site walk) and flags a
//! sink call whose own argument text mentions a known taint source unless
//! that same argument text is wrapped in a known sanitizer call.
//!
//! This is intraprocedural and textual, not a dataflow fixpoint: the typed
//! node model carries no assignment/variable-binding node, so there is no
//! representation of "this local now holds tainted data" to propagate
//! across statements. What it catches is the inline shape
//! `sink(source(...))` / `sink(source_attr)`; taint routed through an
//! intermediate local variable is missed by design.

use codetrace_core::node::MethodCall;
use codetrace_core::{Node, NodeIndex, Tree};

use crate::{TaintInfo, TaintSummary};

const SOURCES: &[&str] = &[
    "request.GET",
    "request.POST",
    "request.args",
    "request.form",
    "input",
    "sys.argv",
    "os.environ",
];

const SINKS: &[&str] = &[
    "execute",
    "eval",
    "exec",
    "os.system",
    "subprocess.run",
    "subprocess.call",
    "cursor.execute",
];

const SANITIZERS: &[&str] = &["escape", "sanitize", "quote", "clean", "strip_tags"];

fn call_name(call: &MethodCall) -> &str {
    if !call.qualified_method.is_empty() {
        &call.qualified_method
    } else {
        &call.method_name
    }
}

fn matches_any(name: &str, table: &[&str]) -> bool {
    table.iter().any(|p| name == *p || name.ends_with(p))
}

fn source_mentioned_in<'a>(text: &str, table: &[&'a str]) -> Option<&'a str> {
    table.iter().find(|p| text.contains(*p)).copied()
}

/// Collects `(line, &MethodCall)` pairs, not descending into a nested
/// `Method`'s own body.
fn ordered_calls<'a>(tree: &'a Tree, start: NodeIndex, out: &mut Vec<(u32, &'a MethodCall)>) {
    for &child in tree.children(start) {
        let Some(node) = tree.get(child) else { continue };
        match &node.node {
            Node::MethodCall(base, call) => {
                out.push((base.line_number, call));
                ordered_calls(tree, child, out);
            }
            Node::Method(..) => {}
            _ => ordered_calls(tree, child, out),
        }
    }
}

/// Scans the method rooted at `method_idx` for inline source-to-sink flows.
pub fn analyze_method(tree: &Tree, method_idx: NodeIndex) -> TaintSummary {
    let mut summary = TaintSummary::new();
    let mut calls = Vec::new();
    ordered_calls(tree, method_idx, &mut calls);

    for (line, call) in &calls {
        let name = call_name(call);
        if !matches_any(name, SINKS) {
            continue;
        }
        for arg in &call.arguments {
            let Some(source) = source_mentioned_in(arg, SOURCES) else {
                continue;
            };
            let sanitizer_call = SANITIZERS.iter().find(|s| arg.contains(**s)).copied();

            let mut info = TaintInfo::new(*line, source, 0.9);
            if let Some(sanitizer) = sanitizer_call {
                info.sanitized = true;
                info.sanitizer_line = Some(*line);
                info.sanitizer_call = Some(sanitizer.to_string());
                summary.add_tainted_var(source, info);
                continue;
            }

            info.sink_line = Some(*line);
            info.sink_var = Some(source.to_string());
            info.sink_call = Some(name.to_string());
            info.propagation_path.push(name.to_string());
            summary.add_detection(info.clone());
            summary.add_tainted_var(source, info);
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use codetrace_core::{build_file, Language, NullStorage};

    fn method_index(tree: &Tree) -> NodeIndex {
        tree.iter()
            .find(|(_, n)| matches!(n.node, Node::Method(..)))
            .map(|(idx, _)| idx)
            .unwrap()
    }

    #[test]
    fn unsanitized_source_to_sink_is_detected() {
        let source = "def get_user():\n    cursor.execute(request.GET)\n";
        let mut storage = NullStorage;
        let out = build_file(source, "views.py", Language::Python, &mut storage).unwrap();
        let summary = analyze_method(&out.tree, method_index(&out.tree));
        assert!(summary.has_detections());
        assert_eq!(summary.get_high_confidence_detections().len(), 1);
    }

    #[test]
    fn sanitized_source_is_not_detected() {
        let source = "def get_user():\n    cursor.execute(escape(request.GET))\n";
        let mut storage = NullStorage;
        let out = build_file(source, "views.py", Language::Python, &mut storage).unwrap();
        let summary = analyze_method(&out.tree, method_index(&out.tree));
        assert!(!summary.has_detections());
    }

    #[test]
    fn no_source_means_empty_summary() {
        let source = "def run():\n    add(x, y)\n";
        let mut storage = NullStorage;
        let out = build_file(source, "calc.py", Language::Python, &mut storage).unwrap();
        let summary = analyze_method(&out.tree, method_index(&out.tree));
        assert!(!summary.has_detections());
        assert_eq!(summary.get_tainted_var_count(), 0);
    }
}
