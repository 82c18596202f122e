//! Stable content-addressed identifiers for typed nodes (C1).
//!
//! IDs are derived from SHA-256 over a textual key built from the node's
//! kind, name, and source location, so that two structurally identical
//! occurrences in different files (or at different lines) get distinct IDs,
//! while re-parsing the same source at the same path reproduces the same ID.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `s`.
pub fn generate_sha256(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

/// Builds the `source_key` used as the location component of a node ID.
///
/// Always includes the file path and the 1-based row:col of the node's
/// start, so that textually identical siblings (e.g. two `return;`
/// statements on different lines) never collide.
pub fn source_key(file: &str, line: u32, column: u32) -> String {
    format!("{file}:{line}:{column}")
}

/// `generate_method_id` per §4.1: hex(SHA-256("{name}-{params}-{source_key}")).
pub fn generate_method_id(name: &str, params: &[String], source_key: &str) -> String {
    let joined_params = params.join(",");
    generate_sha256(&format!("{name}-{joined_params}-{source_key}"))
}

/// Generic node ID used for every non-Method kind: hex(SHA-256("{kind}-{text_key}-{source_key}")).
pub fn generate_node_id(kind: &str, text_key: &str, source_key: &str) -> String {
    generate_sha256(&format!("{kind}-{text_key}-{source_key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        assert_eq!(generate_sha256("hello"), generate_sha256("hello"));
        assert_ne!(generate_sha256("hello"), generate_sha256("world"));
    }

    #[test]
    fn method_id_distinguishes_textually_identical_siblings() {
        let a = generate_method_id("run", &[], &source_key("a.py", 1, 0));
        let b = generate_method_id("run", &[], &source_key("a.py", 2, 0));
        assert_ne!(a, b);
    }

    #[test]
    fn method_id_distinguishes_same_name_different_file() {
        let a = generate_method_id("run", &[], &source_key("a.py", 1, 0));
        let b = generate_method_id("run", &[], &source_key("b.py", 1, 0));
        assert_ne!(a, b);
    }

    #[test]
    fn method_id_stable_under_rerun() {
        let a = generate_method_id("run", &["x".into()], &source_key("a.py", 1, 0));
        let b = generate_method_id("run", &["x".into()], &source_key("a.py", 1, 0));
        assert_eq!(a, b);
    }
}
