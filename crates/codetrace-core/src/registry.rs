//! Module Registry (C4): filesystem path ↔ module FQN bijection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ParseError, Result};

/// Marker stems that collapse to their enclosing directory's FQN (language
/// package-init files).
const PACKAGE_MARKERS: &[&str] = &["__init__", "package-info"];

#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    fqn_to_path: HashMap<String, PathBuf>,
    path_to_fqn: HashMap<PathBuf, String>,
    top_level_packages: Vec<String>,
}

impl ModuleRegistry {
    /// Walks `root` recursively, registering every file whose extension
    /// matches `extension` (without the leading dot, e.g. `"py"`).
    pub fn build(root: &Path, extension: &str) -> Result<Self> {
        if !root.exists() {
            return Err(ParseError::RootNotFound(root.to_path_buf()));
        }

        let mut registry = ModuleRegistry::default();
        let suffix = format!(".{extension}");

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(&suffix) {
                continue;
            }

            let rel = path.strip_prefix(root).unwrap_or(path);
            let fqn = Self::fqn_for(rel, &suffix);
            registry.insert(fqn, path.to_path_buf());
        }

        registry.top_level_packages = registry
            .fqn_to_path
            .keys()
            .filter_map(|fqn| fqn.split('.').next())
            .map(str::to_string)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(registry)
    }

    fn fqn_for(rel: &Path, suffix: &str) -> String {
        let mut components: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        if let Some(last) = components.last_mut() {
            if let Some(stripped) = last.strip_suffix(suffix) {
                *last = stripped.to_string();
            }
        }

        if let Some(last) = components.last() {
            if PACKAGE_MARKERS.contains(&last.as_str()) {
                components.pop();
            }
        }

        components.join(".")
    }

    fn insert(&mut self, fqn: String, path: PathBuf) {
        self.path_to_fqn.insert(path.clone(), fqn.clone());
        self.fqn_to_path.insert(fqn, path);
    }

    pub fn module_of_file(&self, path: &Path) -> Option<&str> {
        self.path_to_fqn.get(path).map(String::as_str)
    }

    pub fn file_of_module(&self, fqn: &str) -> Option<&Path> {
        self.fqn_to_path.get(fqn).map(PathBuf::as_path)
    }

    pub fn top_level_packages(&self) -> &[String] {
        &self.top_level_packages
    }

    pub fn len(&self) -> usize {
        self.fqn_to_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fqn_to_path.is_empty()
    }

    /// True iff `fqn` names a known module, or its longest dotted prefix does.
    pub fn validate_fqn(&self, fqn: &str) -> bool {
        if self.fqn_to_path.contains_key(fqn) {
            return true;
        }
        let mut parts: Vec<&str> = fqn.split('.').collect();
        while parts.pop().is_some() && !parts.is_empty() {
            if self.fqn_to_path.contains_key(&parts.join(".")) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn builds_bijection_with_init_collapse() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "views.py");
        write(dir.path(), "utils/helpers.py");
        write(dir.path(), "utils/__init__.py");

        let reg = ModuleRegistry::build(dir.path(), "py").unwrap();

        assert_eq!(
            reg.module_of_file(&dir.path().join("views.py")),
            Some("views")
        );
        assert_eq!(
            reg.module_of_file(&dir.path().join("utils/helpers.py")),
            Some("utils.helpers")
        );
        assert_eq!(
            reg.module_of_file(&dir.path().join("utils/__init__.py")),
            Some("utils")
        );
        assert_eq!(reg.file_of_module("views").unwrap().file_name().unwrap(), "views.py");
    }

    #[test]
    fn validate_fqn_checks_longest_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "utils/helpers.py");
        let reg = ModuleRegistry::build(dir.path(), "py").unwrap();

        assert!(reg.validate_fqn("utils.helpers"));
        assert!(reg.validate_fqn("utils.helpers.sanitize"));
        assert!(!reg.validate_fqn("other.module"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let missing = Path::new("/nonexistent/does/not/exist");
        assert!(matches!(
            ModuleRegistry::build(missing, "py"),
            Err(ParseError::RootNotFound(_))
        ));
    }
}
