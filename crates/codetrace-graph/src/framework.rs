//! Framework Recognizer (C6): a static table of known external libraries,
//! matched against resolved call targets by dotted-prefix comparison
//! (§4.6). The table is configuration, not a closed set callers may assume
//! completeness over.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkDef {
    pub name: String,
    pub prefixes: Vec<String>,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct FrameworkRecognizer {
    frameworks: Vec<FrameworkDef>,
}

impl Default for FrameworkRecognizer {
    fn default() -> Self {
        Self::with_builtin_table()
    }
}

impl FrameworkRecognizer {
    pub fn new(frameworks: Vec<FrameworkDef>) -> Self {
        Self { frameworks }
    }

    pub fn with_builtin_table() -> Self {
        let defs = [
            ("Django", &["django."][..], "web"),
            ("Flask", &["flask."], "web"),
            ("FastAPI", &["fastapi."], "web"),
            ("Spring", &["org.springframework."], "web"),
            ("SQLAlchemy", &["sqlalchemy."], "orm"),
            ("Hibernate", &["org.hibernate."], "orm"),
            ("JUnit", &["org.junit.", "junit."], "testing"),
            ("pytest", &["pytest."], "testing"),
            ("requests", &["requests."], "http"),
            ("OkHttp", &["okhttp3."], "http"),
            ("NumPy", &["numpy.", "np."], "data_science"),
            ("Pandas", &["pandas.", "pd."], "data_science"),
            ("asyncio", &["asyncio."], "async"),
            ("Jackson", &["com.fasterxml.jackson."], "serialization"),
            ("Log4j", &["org.apache.logging.log4j."], "logging"),
            ("SLF4J", &["org.slf4j."], "logging"),
            ("java.util", &["java.util."], "stdlib"),
            ("java.lang", &["java.lang."], "stdlib"),
        ];
        let frameworks = defs
            .into_iter()
            .map(|(name, prefixes, category)| FrameworkDef {
                name: name.to_string(),
                prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                category: category.to_string(),
                description: format!("{name} ({category})"),
            })
            .collect();
        Self { frameworks }
    }

    /// Linear prefix match: an FQN matches a framework if it equals a
    /// prefix exactly (sans trailing `.`) or starts with it.
    pub fn recognize(&self, fqn: &str) -> Option<&FrameworkDef> {
        self.frameworks.iter().find(|def| {
            def.prefixes.iter().any(|prefix| {
                fqn.starts_with(prefix.as_str()) || fqn == prefix.trim_end_matches('.')
            })
        })
    }

    pub fn frameworks(&self) -> &[FrameworkDef] {
        &self.frameworks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_django_prefix() {
        let r = FrameworkRecognizer::with_builtin_table();
        let found = r.recognize("django.db.models.ForeignKey").unwrap();
        assert_eq!(found.name, "Django");
        assert_eq!(found.category, "web");
    }

    #[test]
    fn unknown_fqn_does_not_match() {
        let r = FrameworkRecognizer::with_builtin_table();
        assert!(r.recognize("utils.helpers.sanitize").is_none());
    }
}
