//! Import Map (C4): per-file alias → target FQN table, populated during
//! tree construction from import statements (§3.4).

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    alias_to_fqn: HashMap<String, String>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `from module import name` → alias `name` → FQN `module.name`.
    pub fn add_from_import(&mut self, module: &str, name: &str) {
        self.alias_to_fqn
            .insert(name.to_string(), format!("{module}.{name}"));
    }

    /// `import module` → alias `module` → FQN `module`.
    pub fn add_plain_import(&mut self, module: &str) {
        self.alias_to_fqn
            .insert(module.to_string(), module.to_string());
    }

    /// `import module as alias` → alias `alias` → FQN `module`.
    pub fn add_aliased_import(&mut self, module: &str, alias: &str) {
        self.alias_to_fqn
            .insert(alias.to_string(), module.to_string());
    }

    /// Single-level substitution: no wildcard expansion, per §4.4.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.alias_to_fqn.get(alias).map(String::as_str)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.alias_to_fqn.contains_key(alias)
    }

    pub fn is_empty(&self) -> bool {
        self.alias_to_fqn.is_empty()
    }

    pub fn len(&self) -> usize {
        self.alias_to_fqn.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_import_form() {
        let mut m = ImportMap::new();
        m.add_from_import("utils.helpers", "sanitize");
        assert_eq!(m.resolve("sanitize"), Some("utils.helpers.sanitize"));
    }

    #[test]
    fn plain_import_form() {
        let mut m = ImportMap::new();
        m.add_plain_import("django.db");
        assert_eq!(m.resolve("django.db"), Some("django.db"));
    }

    #[test]
    fn aliased_import_form() {
        let mut m = ImportMap::new();
        m.add_aliased_import("numpy", "np");
        assert_eq!(m.resolve("np"), Some("numpy"));
        assert_eq!(m.resolve("numpy"), None);
    }
}
