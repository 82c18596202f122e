//! Call Matcher DSL (C10): pattern and keyword-argument constraints over the
//! call graph (§4.10).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::callgraph::{CallGraph, CallSite};
use crate::error::{GraphError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintValue {
    Bool(bool),
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentConstraint {
    pub value: ConstraintValue,
    pub wildcard: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallMatcherIR {
    pub call_type: String,
    pub patterns: Vec<String>,
    pub wildcard: bool,
    pub match_mode: String,
    pub keyword_args: HashMap<String, ArgumentConstraint>,
}

impl CallMatcherIR {
    /// Validates patterns at construction time: middle wildcards (an `*`
    /// embedded anywhere but a bare pattern, a `prefix.*`, or a `*.suffix`)
    /// are out of scope (§9, open question 2) and rejected here rather than
    /// silently mishandled later.
    pub fn new(
        call_type: String,
        patterns: Vec<String>,
        wildcard: bool,
        match_mode: String,
        keyword_args: HashMap<String, ArgumentConstraint>,
    ) -> Result<Self> {
        if patterns.is_empty() {
            return Err(GraphError::EmptyPatterns);
        }
        if wildcard {
            for p in &patterns {
                if !is_supported_wildcard_shape(p) {
                    return Err(GraphError::MiddleWildcardUnsupported(p.clone()));
                }
            }
        }
        Ok(Self {
            call_type,
            patterns,
            wildcard,
            match_mode,
            keyword_args,
        })
    }
}

fn is_supported_wildcard_shape(pattern: &str) -> bool {
    let star_count = pattern.matches('*').count();
    match star_count {
        0 => true,
        1 => pattern == "*" || pattern.starts_with("*.") || pattern.ends_with(".*"),
        _ => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchContext {
    pub matched_by: String,
    pub function_fqn: String,
    pub source_file: String,
    pub line: u32,
}

pub struct CallMatcher<'a> {
    ir: &'a CallMatcherIR,
}

impl<'a> CallMatcher<'a> {
    pub fn new(ir: &'a CallMatcherIR) -> Self {
        Self { ir }
    }

    fn target_matches(&self, call_site: &CallSite) -> Option<&'a str> {
        self.ir
            .patterns
            .iter()
            .find(|p| {
                pattern_matches(p, &call_site.target, self.ir.wildcard)
                    || pattern_matches(p, &call_site.target_fqn, self.ir.wildcard)
            })
            .map(String::as_str)
    }

    fn keyword_args_match(&self, call_site: &CallSite) -> bool {
        if self.ir.keyword_args.is_empty() {
            return true; // property 6: empty keyword_args passes trivially.
        }
        let parsed = parse_keyword_arguments(&call_site.arguments);
        self.ir.keyword_args.iter().all(|(name, constraint)| {
            parsed
                .get(name)
                .map(|value| constraint_matches(constraint, value))
                .unwrap_or(false)
        })
    }

    pub fn execute(&self, graph: &CallGraph) -> Vec<CallSite> {
        graph
            .call_sites
            .values()
            .flatten()
            .filter(|site| self.target_matches(site).is_some() && self.keyword_args_match(site))
            .cloned()
            .collect()
    }

    pub fn execute_with_context(&self, graph: &CallGraph) -> Vec<(MatchContext, CallSite)> {
        let mut out = Vec::new();
        for (caller_fqn, sites) in &graph.call_sites {
            for site in sites {
                let Some(matched_by) = self.target_matches(site) else {
                    continue;
                };
                if !self.keyword_args_match(site) {
                    continue;
                }
                out.push((
                    MatchContext {
                        matched_by: matched_by.to_string(),
                        function_fqn: caller_fqn.clone(),
                        source_file: site.location.file.clone(),
                        line: site.location.line,
                    },
                    site.clone(),
                ));
            }
        }
        out
    }
}

pub fn pattern_matches(pattern: &str, target: &str, wildcard: bool) -> bool {
    if target.is_empty() {
        return false;
    }
    if !wildcard {
        return pattern == target;
    }
    if pattern == "*" {
        return !target.is_empty();
    }
    if let Some(prefix) = pattern.strip_suffix(".*") {
        return target.starts_with(&format!("{prefix}."));
    }
    if let Some(suffix) = pattern.strip_prefix("*.") {
        return target.ends_with(&format!(".{suffix}"));
    }
    pattern == target
}

/// Splits each raw argument text on the first `=` only, so complex values
/// containing `=` (URLs, JSON maps) survive intact. Positional arguments
/// (no `=`) are skipped; `key=` keeps an empty string value; `=value`
/// (missing key) is skipped.
pub fn parse_keyword_arguments(arguments: &[String]) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for arg in arguments {
        let Some((key, value)) = arg.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        out.insert(key.to_string(), value.trim().to_string());
    }
    out
}

fn clean(value: &str) -> String {
    value.trim().trim_matches('"').trim_matches('\'').to_string()
}

fn constraint_matches(constraint: &ArgumentConstraint, raw_value: &str) -> bool {
    let cleaned = clean(raw_value);
    match &constraint.value {
        ConstraintValue::Bool(expected) => match cleaned.to_lowercase().as_str() {
            "true" | "1" => *expected,
            "false" | "0" => !*expected,
            _ => false,
        },
        ConstraintValue::Number(expected) => parse_number(&cleaned)
            .map(|n| n == *expected)
            .unwrap_or(false),
        ConstraintValue::Str(expected) => &cleaned == expected,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }
    if let Some(oct) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        return i64::from_str_radix(oct, 8).ok().map(|v| v as f64);
    }
    if s.len() > 1 && s.starts_with('0') && s.chars().skip(1).all(|c| c.is_ascii_digit()) {
        return i64::from_str_radix(&s[1..], 8).ok().map(|v| v as f64);
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_wildcard_matches_prefix_only() {
        assert!(pattern_matches("request.*", "request.GET", true));
        assert!(pattern_matches("request.*", "request.POST", true));
        assert!(!pattern_matches("request.*", "utils.sanitize", true));
    }

    #[test]
    fn middle_wildcard_rejected_at_construction() {
        let result = CallMatcherIR::new(
            "call".into(),
            vec!["a.*.b".into()],
            true,
            "exact".into(),
            HashMap::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn s5_keyword_argument_constraint() {
        let args = vec!["host=\"0.0.0.0\"".to_string(), "debug=True".to_string()];
        let parsed = parse_keyword_arguments(&args);
        let constraint = ArgumentConstraint {
            value: ConstraintValue::Bool(true),
            wildcard: false,
        };
        assert!(constraint_matches(&constraint, &parsed["debug"]));

        let args_false = vec!["debug=False".to_string()];
        let parsed_false = parse_keyword_arguments(&args_false);
        assert!(!constraint_matches(&constraint, &parsed_false["debug"]));
    }

    #[test]
    fn keyword_parsing_splits_on_first_equals_only() {
        let args = vec!["url=http://x.com?a=b".to_string(), "key=".to_string(), "=value".to_string()];
        let parsed = parse_keyword_arguments(&args);
        assert_eq!(parsed["url"], "http://x.com?a=b");
        assert_eq!(parsed["key"], "");
        assert!(!parsed.contains_key(""));
    }

    #[test]
    fn numeric_constraint_accepts_hex_and_octal() {
        assert_eq!(parse_number("0x1F"), Some(31.0));
        assert_eq!(parse_number("0o17"), Some(15.0));
        assert_eq!(parse_number("017"), Some(15.0));
        assert_eq!(parse_number("42"), Some(42.0));
    }
}
