//! `analyze_project`: the single entry point tying module discovery (C4),
//! parallel tree construction (C3), call graph resolution (C5), per-method
//! taint scanning (C7), and query-index population (C9 input) into one
//! pass over a project root.

use std::path::Path;
use std::sync::Arc;

use codetrace_core::{Language, ModuleRegistry, Node, Tree};
use codetrace_graph::callgraph::FileUnit;
use codetrace_graph::framework::FrameworkRecognizer;
use codetrace_graph::CallGraph;
use codetrace_query::QueryIndex;
use codetrace_taint::TaintSummary;

use crate::error::{IndexError, Result};
use crate::pool::{build_file_units, discover_files, DEFAULT_WORKERS};
use crate::reporter::Reporter;
use crate::storage::SharedStorage;

/// Everything produced by one `analyze_project` run: the resolved call
/// graph, a per-qualified-method-name taint summary table, a flattened
/// query index over every entity kind, and the paths that failed to
/// parse (logged and absorbed, not fatal per §7).
pub struct ProjectAnalysis {
    pub call_graph: CallGraph,
    pub taint_summaries: Vec<(String, TaintSummary)>,
    pub query_index: QueryIndex,
    pub failed_files: Vec<(String, String)>,
}

pub fn analyze_project(
    root: &Path,
    language: Language,
    storage: SharedStorage,
    reporter: Arc<dyn Reporter>,
    worker_count: Option<usize>,
) -> Result<ProjectAnalysis> {
    if !root.exists() {
        return Err(IndexError::RootNotFound(root.to_path_buf()));
    }

    let registry = ModuleRegistry::build(root, language.extension())
        .map_err(|e| IndexError::StorageInit(e.to_string()))?;

    let files = discover_files(root, language);
    let results = build_file_units(
        files,
        language,
        storage.clone(),
        reporter,
        worker_count.unwrap_or(DEFAULT_WORKERS),
    );

    let mut units = Vec::new();
    let mut failed_files = Vec::new();
    for result in results {
        match (result.tree, result.import_map) {
            (Some(tree), Some(import_map)) => units.push(FileUnit {
                path: result.path,
                tree,
                import_map,
            }),
            _ => failed_files.push((
                result.path,
                result.error.unwrap_or_else(|| "unknown parse failure".into()),
            )),
        }
    }

    let frameworks = FrameworkRecognizer::with_builtin_table();
    let call_graph = CallGraph::build(&units, &registry, &frameworks);

    let mut taint_summaries = Vec::new();
    let mut query_index = QueryIndex::new();
    for unit in &units {
        collect_methods(&unit.tree, &mut taint_summaries, &mut query_index);
        for (idx, tree_node) in unit.tree.iter() {
            let _ = idx;
            query_index.insert(tree_node.node.clone());
        }
    }

    Ok(ProjectAnalysis {
        call_graph,
        taint_summaries,
        query_index,
        failed_files,
    })
}

fn collect_methods(
    tree: &Tree,
    taint_summaries: &mut Vec<(String, TaintSummary)>,
    _query_index: &mut QueryIndex,
) {
    for (idx, tree_node) in tree.iter() {
        if let Node::Method(base, method) = &tree_node.node {
            let summary = codetrace_taint::analyze_method(tree, idx);
            let key = if method.qualified_name.is_empty() {
                base.name.clone()
            } else {
                method.qualified_name.clone()
            };
            taint_summaries.push((key, summary));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NullReporter;
    use std::fs;

    #[test]
    fn missing_root_is_fatal() {
        let storage = SharedStorage::new();
        let reporter: Arc<dyn Reporter> = Arc::new(NullReporter);
        let result = analyze_project(
            Path::new("/nonexistent/does/not/exist"),
            Language::Python,
            storage,
            reporter,
            None,
        );
        assert!(matches!(result, Err(IndexError::RootNotFound(_))));
    }

    #[test]
    fn analyzes_small_project_and_detects_taint() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("views.py"),
            "def handler():\n    cursor.execute(request.GET)\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("helpers.py"),
            "def clean():\n    add(1, 2)\n",
        )
        .unwrap();

        let storage = SharedStorage::new();
        let reporter: Arc<dyn Reporter> = Arc::new(NullReporter);
        let analysis = analyze_project(
            dir.path(),
            Language::Python,
            storage,
            reporter,
            Some(2),
        )
        .unwrap();

        assert!(analysis.failed_files.is_empty());
        assert!(!analysis.call_graph.functions.is_empty());
        assert!(analysis
            .taint_summaries
            .iter()
            .any(|(_, summary)| summary.has_detections()));
        assert!(!analysis.query_index.candidates(codetrace_core::NodeKind::Method).is_empty());
    }
}
