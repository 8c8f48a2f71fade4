//! The lookup compiler: splits a lookup string into a left (key) matcher
//! and an optional right (value) side, grounded on the spec's §4.3
//! lookup-compiler design and `dlquery.parser`'s predicate dispatch.

mod scanner;

use crate::config::EngineOptions;
use crate::error::{Error, Result};
use crate::matchers::{self, Matcher};
use crate::predicates::check::{parse_comparator_value, ValueCheck};
use crate::predicates::compare::CompareOp;
use once_cell::sync::Lazy;
use regex::Regex;
use scanner::{EmbeddedKind, Segment};

#[derive(Debug, Clone)]
pub enum RightSide {
    Value(Matcher),
    Predicate(ValueCheck),
}

#[derive(Debug, Clone)]
pub struct CompiledLookup {
    pub left: Matcher,
    pub right: Option<RightSide>,
}

impl CompiledLookup {
    pub fn matches_key(&self, key: &str) -> bool {
        self.left.matches(key)
    }

    /// Evaluate the right side, if any, against a scalar's stringified
    /// value. `options.strict` controls whether a predicate's internal
    /// parse/compare failure propagates or is swallowed to `false`.
    pub fn matches_value(&self, probe: &str, options: &EngineOptions) -> Result<bool> {
        match &self.right {
            None => Ok(true),
            Some(RightSide::Value(m)) => Ok(m.matches(probe)),
            Some(RightSide::Predicate(check)) => check.eval(probe, options),
        }
    }

    pub fn has_right(&self) -> bool {
        self.right.is_some()
    }
}

pub fn compile_lookup(lookup: &str, options: &EngineOptions) -> Result<CompiledLookup> {
    if lookup.is_empty() {
        return Err(Error::LookupSyntax("lookup must not be empty".to_string()));
    }
    match find_separator(lookup) {
        None => Ok(CompiledLookup {
            left: compile_side(lookup, options)?,
            right: None,
        }),
        Some(pos) => {
            let left = compile_side(&lookup[..pos], options)?;
            let right_str = lookup[pos + 1..].trim();
            let right = Some(compile_right(right_str, options)?);
            Ok(CompiledLookup { left, right })
        }
    }
}

/// First `=` at paren-depth 0 that isn't escaped with a backslash.
fn find_separator(s: &str) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            '=' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn compile_side(s: &str, options: &EngineOptions) -> Result<Matcher> {
    let unescaped = s.replace("\\=", "=");
    let segments = scanner::scan(&unescaped)?;
    if segments.is_empty() {
        return matchers::compile_text("", false, options.cache_regex);
    }
    let mut pattern = String::new();
    let mut ignore_case = false;
    for seg in segments {
        match seg {
            Segment::Plain(text) => pattern.push_str(&matchers::escape_text(&text)),
            Segment::Typed {
                kind,
                ignore_case: seg_ic,
                payload,
            } => {
                ignore_case |= seg_ic;
                let frag = match kind {
                    EmbeddedKind::Text => matchers::escape_text(&payload),
                    EmbeddedKind::Wildcard => matchers::wildcard_to_regex_pattern(&payload)?,
                    EmbeddedKind::Regex => payload,
                };
                pattern.push_str(&frag);
            }
        }
    }
    matchers::compile_regex(&pattern, ignore_case, options.cache_regex)
}

static PREDICATE_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([A-Za-z_][A-Za-z0-9_]*)\((.*)\)$").unwrap());

fn compile_right(right: &str, options: &EngineOptions) -> Result<RightSide> {
    if let Some(caps) = PREDICATE_CALL_RE.captures(right) {
        let name = caps.get(1).unwrap().as_str();
        let args = caps.get(2).unwrap().as_str();
        let lname = name.to_ascii_lowercase();
        if let Some(spec) = named_predicate(&lname, args, options) {
            return Ok(RightSide::Predicate(spec));
        }
    }
    Ok(RightSide::Value(compile_side(right, options)?))
}

fn named_predicate(lname: &str, args: &str, options: &EngineOptions) -> Option<ValueCheck> {
    if let Some(rest) = lname.strip_prefix("is_not_") {
        return Some(ValueCheck::Named {
            case: rest.to_string(),
            valid: false,
        });
    }
    if let Some(rest) = lname.strip_prefix("is_") {
        return Some(ValueCheck::Named {
            case: rest.to_string(),
            valid: true,
        });
    }
    match lname {
        "lt" | "le" | "gt" | "ge" | "eq" | "ne" => {
            let op = CompareOp::parse(lname).ok()?;
            Some(parse_comparator_value(op, args, options))
        }
        "contain" | "contains" => Some(ValueCheck::Contain(args.to_string())),
        "not_contain" | "notcontain" => Some(ValueCheck::NotContain(args.to_string())),
        "belong" | "belongs" => Some(ValueCheck::Belong(args.to_string())),
        "not_belong" | "notbelong" => Some(ValueCheck::NotBelong(args.to_string())),
        "match" => Some(ValueCheck::Match(args.to_string())),
        "not_match" | "notmatch" => Some(ValueCheck::NotMatch(args.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_lookup(lookup: &str) -> Result<CompiledLookup> {
        super::compile_lookup(lookup, &EngineOptions::default())
    }

    fn strict() -> EngineOptions {
        EngineOptions {
            strict: true,
            ..EngineOptions::default()
        }
    }

    #[test]
    fn plain_left_only() {
        let lookup = compile_lookup("width").unwrap();
        assert!(lookup.matches_key("width"));
        assert!(!lookup.matches_key("height"));
        assert!(!lookup.has_right());
    }

    #[test]
    fn embedded_wildcard_value() {
        let lookup = compile_lookup("name=_iwildcard(*abc*)").unwrap();
        assert!(lookup.matches_key("name"));
        assert!(lookup.matches_value("window ABC", &strict()).unwrap());
        assert!(!lookup.matches_value("nope", &strict()).unwrap());
    }

    #[test]
    fn plain_value_match() {
        let lookup = compile_lookup("alignment=center").unwrap();
        assert!(lookup.matches_value("center", &strict()).unwrap());
        assert!(!lookup.matches_value("left", &strict()).unwrap());
    }

    #[test]
    fn predicate_right_side() {
        let lookup = compile_lookup("ip=is_ipv4_address()").unwrap();
        assert!(lookup.matches_value("10.0.0.1", &strict()).unwrap());
        assert!(!lookup.matches_value("not-an-ip", &strict()).unwrap());
    }

    #[test]
    fn comparator_right_side() {
        let lookup = compile_lookup("width=gt(100)").unwrap();
        assert!(lookup.matches_value("300", &strict()).unwrap());
        assert!(!lookup.matches_value("50", &strict()).unwrap());
    }

    #[test]
    fn escaped_equals_is_not_a_separator() {
        let lookup = compile_lookup(r"key\=value").unwrap();
        assert!(!lookup.has_right());
        assert!(lookup.matches_key("key=value"));
    }

    #[test]
    fn unterminated_embedded_form_is_lookup_syntax_error() {
        assert!(compile_lookup("name=_itext(abc").is_err());
    }

    #[test]
    fn comparator_right_side_uses_extra_date_formats() {
        let options = EngineOptions {
            extra_date_formats: vec!["%b %d, %Y".to_string()],
            ..EngineOptions::default()
        };
        let lookup = super::compile_lookup("released=eq(date(Jun 14, 2021))", &options).unwrap();
        assert!(lookup.matches_value("06/14/2021", &options).unwrap());
    }
}
