//! Call Graph Resolver (C5): indexes function definitions across files,
//! walks import maps, and resolves call sites to fully qualified names
//! (§3.5, §4.5).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use codetrace_core::{ImportMap, ModuleRegistry, Node, Tree};

use crate::framework::{FrameworkDef, FrameworkRecognizer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSite {
    pub target: String,
    pub target_fqn: String,
    pub resolved: bool,
    pub location: Location,
    pub arguments: Vec<String>,
    pub framework: Option<FrameworkDef>,
}

/// One file's already-built artifacts, as handed off by the per-file
/// parallel construction phase (§5) once all workers have completed.
pub struct FileUnit {
    pub path: String,
    pub tree: Tree,
    pub import_map: ImportMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallGraph {
    pub functions: HashMap<String, Node>,
    pub call_sites: HashMap<String, Vec<CallSite>>,
    pub edges: HashMap<String, HashSet<String>>,
    pub reverse_edges: HashMap<String, HashSet<String>>,
}

impl CallGraph {
    /// Builds a fully populated call graph from the project's tree
    /// collection, module registry, per-file import maps, and the
    /// framework recognizer (§4.5). Resolution is deterministic and
    /// order-independent: the iteration order of `units` never affects the
    /// resulting edge sets, only the (non-deterministic per §5) order of
    /// `call_sites` vectors.
    pub fn build(
        units: &[FileUnit],
        registry: &ModuleRegistry,
        frameworks: &FrameworkRecognizer,
    ) -> Self {
        let mut graph = CallGraph::default();

        for unit in units {
            index_functions(unit, registry, &mut graph);
        }

        for unit in units {
            index_call_sites(unit, registry, &mut graph);
        }

        // Resolve in a second pass now that `functions` is fully indexed.
        for unit in units {
            resolve_unit(unit, registry, frameworks, &mut graph);
        }

        graph
    }

    pub fn get_calls(&self, caller_fqn: &str) -> &[CallSite] {
        self.call_sites
            .get(caller_fqn)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn callers_of(&self, callee_fqn: &str) -> HashSet<String> {
        self.reverse_edges.get(callee_fqn).cloned().unwrap_or_default()
    }

    pub fn callees_of(&self, caller_fqn: &str) -> HashSet<String> {
        self.edges.get(caller_fqn).cloned().unwrap_or_default()
    }
}

fn index_functions(unit: &FileUnit, registry: &ModuleRegistry, graph: &mut CallGraph) {
    let module = registry
        .module_of_file(std::path::Path::new(&unit.path))
        .unwrap_or(&unit.path)
        .to_string();

    for (_, tree_node) in unit.tree.iter() {
        if let Node::Method(base, method) = &tree_node.node {
            let fqn = if module.is_empty() {
                method.qualified_name.clone()
            } else {
                format!("{module}.{}", method.qualified_name)
            };
            let _ = base;
            graph.functions.insert(fqn, tree_node.node.clone());
        }
    }
}

fn index_call_sites(unit: &FileUnit, registry: &ModuleRegistry, graph: &mut CallGraph) {
    let module = registry
        .module_of_file(std::path::Path::new(&unit.path))
        .unwrap_or(&unit.path)
        .to_string();

    for (idx, tree_node) in unit.tree.iter() {
        let Node::Method(_, method) = &tree_node.node else {
            continue;
        };
        let caller_fqn = if module.is_empty() {
            method.qualified_name.clone()
        } else {
            format!("{module}.{}", method.qualified_name)
        };

        let mut calls = Vec::new();
        collect_calls_within(&unit.tree, idx, &mut calls);

        let entry = graph.call_sites.entry(caller_fqn).or_default();
        for call_idx in calls {
            let Some(call_node) = unit.tree.get(call_idx) else {
                continue;
            };
            let Node::MethodCall(base, call) = &call_node.node else {
                continue;
            };
            let target = if call.qualified_method.is_empty() {
                call.method_name.clone()
            } else {
                call.qualified_method.clone()
            };
            entry.push(CallSite {
                target,
                target_fqn: String::new(),
                resolved: false,
                location: Location {
                    file: unit.path.clone(),
                    line: base.line_number,
                    column: 0,
                },
                arguments: call.arguments.clone(),
                framework: None,
            });
        }
    }
}

/// Collects every `MethodCall` node reachable from `start` without crossing
/// into a nested `Method`'s own subtree — calls made inside a nested
/// function belong to that function's caller FQN, not its enclosing one.
fn collect_calls_within(
    tree: &Tree,
    start: codetrace_core::NodeIndex,
    out: &mut Vec<codetrace_core::NodeIndex>,
) {
    for &child in tree.children(start) {
        let Some(node) = tree.get(child) else { continue };
        match &node.node {
            Node::MethodCall(..) => {
                out.push(child);
                collect_calls_within(tree, child, out);
            }
            Node::Method(..) => {
                // Nested function: its own indexing pass owns its calls.
            }
            _ => collect_calls_within(tree, child, out),
        }
    }
}

fn resolve_unit(
    unit: &FileUnit,
    registry: &ModuleRegistry,
    frameworks: &FrameworkRecognizer,
    graph: &mut CallGraph,
) {
    let module = registry
        .module_of_file(std::path::Path::new(&unit.path))
        .unwrap_or(&unit.path)
        .to_string();

    for (_, tree_node) in unit.tree.iter() {
        let Node::Method(_, method) = &tree_node.node else {
            continue;
        };
        let caller_fqn = if module.is_empty() {
            method.qualified_name.clone()
        } else {
            format!("{module}.{}", method.qualified_name)
        };

        let Some(sites) = graph.call_sites.get_mut(&caller_fqn) else {
            continue;
        };

        for site in sites.iter_mut() {
            if site.resolved || !site.target_fqn.is_empty() {
                continue;
            }
            let resolution = resolve(
                &site.target,
                &module,
                &unit.import_map,
                registry,
                frameworks,
            );
            site.target_fqn = resolution.fqn.clone();
            site.resolved = resolution.resolved;
            site.framework = resolution.framework;
        }

        if let Some(sites) = graph.call_sites.get(&caller_fqn) {
            for site in sites {
                if site.resolved {
                    graph
                        .edges
                        .entry(caller_fqn.clone())
                        .or_default()
                        .insert(site.target_fqn.clone());
                    graph
                        .reverse_edges
                        .entry(site.target_fqn.clone())
                        .or_default()
                        .insert(caller_fqn.clone());
                }
            }
        }
    }
}

struct Resolution {
    fqn: String,
    resolved: bool,
    framework: Option<FrameworkDef>,
}

/// Resolves a raw call target text to an FQN (§4.5 step 3). Ties between an
/// import alias and a same-module name prefer the import map (property 5).
pub fn resolve_call_target(
    target_text: &str,
    module: &str,
    import_map: &ImportMap,
    registry: &ModuleRegistry,
    frameworks: &FrameworkRecognizer,
) -> (String, bool) {
    let r = resolve(target_text, module, import_map, registry, frameworks);
    (r.fqn, r.resolved)
}

fn resolve(
    target_text: &str,
    module: &str,
    import_map: &ImportMap,
    registry: &ModuleRegistry,
    frameworks: &FrameworkRecognizer,
) -> Resolution {
    let candidate = if !target_text.contains('.') {
        if let Some(fqn) = import_map.resolve(target_text) {
            Some(fqn.to_string())
        } else {
            let same_module = if module.is_empty() {
                target_text.to_string()
            } else {
                format!("{module}.{target_text}")
            };
            registry.validate_fqn(&same_module).then_some(same_module)
        }
    } else {
        let (head, tail) = target_text.split_once('.').unwrap();
        if let Some(fqn) = import_map.resolve(head) {
            Some(format!("{fqn}.{tail}"))
        } else if registry.validate_fqn(head) {
            Some(target_text.to_string())
        } else {
            None
        }
    };

    match candidate {
        Some(fqn) => {
            if let Some(def) = frameworks.recognize(&fqn) {
                return Resolution {
                    fqn,
                    resolved: true,
                    framework: Some(def.clone()),
                };
            }
            Resolution {
                fqn,
                resolved: true,
                framework: None,
            }
        }
        None => {
            if let Some(def) = frameworks.recognize(target_text) {
                return Resolution {
                    fqn: target_text.to_string(),
                    resolved: true,
                    framework: Some(def.clone()),
                };
            }
            Resolution {
                fqn: target_text.to_string(),
                resolved: false,
                framework: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codetrace_core::{build_file, Language, NullStorage};
    use std::fs;

    fn unit_for(root: &std::path::Path, rel: &str, source: &str) -> FileUnit {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, source).unwrap();
        let mut storage = NullStorage;
        let out = build_file(source, path.to_str().unwrap(), Language::Python, &mut storage)
            .unwrap();
        FileUnit {
            path: path.to_string_lossy().into_owned(),
            tree: out.tree,
            import_map: out.import_map,
        }
    }

    #[test]
    fn s1_single_file_python_resolver() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_for(
            dir.path(),
            "views.py",
            "def get_user():\n    sanitize(data)\n\ndef sanitize(data):\n    pass\n",
        );
        let registry = codetrace_core::ModuleRegistry::build(dir.path(), "py").unwrap();
        let frameworks = FrameworkRecognizer::with_builtin_table();
        let graph = CallGraph::build(&[unit], &registry, &frameworks);

        assert!(graph.edges["views.get_user"].contains("views.sanitize"));
    }

    #[test]
    fn s2_cross_module_import_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let helpers = unit_for(dir.path(), "utils/helpers.py", "def sanitize(data):\n    pass\n");
        let views = unit_for(
            dir.path(),
            "views.py",
            "from utils.helpers import sanitize\n\ndef get_user():\n    sanitize(data)\n",
        );
        let registry = codetrace_core::ModuleRegistry::build(dir.path(), "py").unwrap();
        let frameworks = FrameworkRecognizer::with_builtin_table();
        let graph = CallGraph::build(&[helpers, views], &registry, &frameworks);

        assert!(graph.reverse_edges["utils.helpers.sanitize"].contains("views.get_user"));
    }

    #[test]
    fn s3_framework_short_circuit() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_for(
            dir.path(),
            "views.py",
            "import django.db\n\ndef get_user():\n    django.db.models.ForeignKey(x)\n",
        );
        let registry = codetrace_core::ModuleRegistry::build(dir.path(), "py").unwrap();
        let frameworks = FrameworkRecognizer::with_builtin_table();
        let graph = CallGraph::build(&[unit], &registry, &frameworks);

        let sites = graph.get_calls("views.get_user");
        let matched = sites.iter().find(|s| s.target.contains("ForeignKey")).unwrap();
        assert!(matched.resolved);
        assert_eq!(matched.framework.as_ref().unwrap().name, "Django");
    }

    #[test]
    fn edges_and_reverse_edges_are_symmetric() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_for(
            dir.path(),
            "a.py",
            "def caller():\n    callee()\n\ndef callee():\n    pass\n",
        );
        let registry = codetrace_core::ModuleRegistry::build(dir.path(), "py").unwrap();
        let frameworks = FrameworkRecognizer::with_builtin_table();
        let graph = CallGraph::build(&[unit], &registry, &frameworks);

        for (caller, callees) in &graph.edges {
            for callee in callees {
                assert!(graph.reverse_edges[callee].contains(caller));
            }
        }
    }

    #[test]
    fn resolver_prefers_import_alias_over_same_module_name() {
        let dir = tempfile::tempdir().unwrap();
        let import_map = {
            let mut m = ImportMap::new();
            m.add_from_import("external.lib", "sanitize");
            m
        };
        fs::create_dir_all(dir.path().join("x")).unwrap();
        fs::write(dir.path().join("views.py"), "").unwrap();
        fs::write(dir.path().join("sanitize.py"), "").unwrap();
        let registry = codetrace_core::ModuleRegistry::build(dir.path(), "py").unwrap();
        let frameworks = FrameworkRecognizer::with_builtin_table();

        let (fqn, resolved) =
            resolve_call_target("sanitize", "views", &import_map, &registry, &frameworks);
        assert!(resolved);
        assert_eq!(fqn, "external.lib.sanitize");
    }
}
