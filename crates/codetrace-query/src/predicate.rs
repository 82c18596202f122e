//! Predicate substitution (§4.8): before compilation, every predicate
//! invocation `P(x,y,...)` in the expression text is replaced by the
//! predicate body, with each positional parameter renamed to the
//! corresponding alias from the call site. Purely textual; recursive
//! predicates are not supported (a predicate's own body is never
//! re-scanned for further invocations).

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateDef {
    pub params: Vec<String>,
    pub body: String,
}

pub fn substitute_predicates(expr_text: &str, predicates: &HashMap<String, PredicateDef>) -> String {
    let mut out = String::new();
    let bytes = expr_text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if let Some((name, args, end)) = try_match_invocation(expr_text, i, predicates) {
            let def = &predicates[&name];
            out.push('(');
            out.push_str(&rename_params(&def.body, &def.params, &args));
            out.push(')');
            i = end;
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

fn try_match_invocation(
    text: &str,
    start: usize,
    predicates: &HashMap<String, PredicateDef>,
) -> Option<(String, Vec<String>, usize)> {
    let rest = &text[start..];
    let prev_is_word_char = text[..start]
        .chars()
        .next_back()
        .map(|c| c.is_alphanumeric() || c == '_')
        .unwrap_or(false);
    if prev_is_word_char {
        return None;
    }
    for name in predicates.keys() {
        if !rest.starts_with(name.as_str()) {
            continue;
        }
        let after_name = &rest[name.len()..];
        let trimmed = after_name.trim_start();
        if !trimmed.starts_with('(') {
            continue;
        }
        let open_offset = rest.len() - trimmed.len();
        let (args_str, close_offset) = match_balanced_parens(rest, open_offset)?;
        let args: Vec<String> = if args_str.trim().is_empty() {
            Vec::new()
        } else {
            args_str.split(',').map(|s| s.trim().to_string()).collect()
        };
        return Some((name.clone(), args, start + close_offset));
    }
    None
}

/// Given `s[open..]` starting with `(`, returns the text between the
/// matching close paren and the byte offset just past it.
fn match_balanced_parens(s: &str, open: usize) -> Option<(&str, usize)> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = open;
    let inner_start = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&s[inner_start..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn rename_params(body: &str, params: &[String], args: &[String]) -> String {
    let mut result = String::new();
    let body_bytes = body.as_bytes();
    let mut i = 0;
    while i < body_bytes.len() {
        let c = body[i..].chars().next().unwrap();
        if c.is_alphabetic() || c == '_' {
            let word_start = i;
            while i < body_bytes.len() {
                let c = body[i..].chars().next().unwrap();
                if c.is_alphanumeric() || c == '_' {
                    i += c.len_utf8();
                } else {
                    break;
                }
            }
            let word = &body[word_start..i];
            if let Some(pos) = params.iter().position(|p| p == word) {
                result.push_str(args.get(pos).map(String::as_str).unwrap_or(word));
            } else {
                result.push_str(word);
            }
        } else {
            result.push(c);
            i += c.len_utf8();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_predicate_with_renamed_params() {
        let mut predicates = HashMap::new();
        predicates.insert(
            "isPublic".to_string(),
            PredicateDef {
                params: vec!["m".to_string()],
                body: "m.getVisibility()==\"public\"".to_string(),
            },
        );
        let out = substitute_predicates("isPublic(f)", &predicates);
        assert_eq!(out, "(f.getVisibility()==\"public\")");
    }

    #[test]
    fn leaves_non_predicate_text_untouched() {
        let predicates = HashMap::new();
        let out = substitute_predicates("c.getName()==\"X\"", &predicates);
        assert_eq!(out, "c.getName()==\"X\"");
    }
}
