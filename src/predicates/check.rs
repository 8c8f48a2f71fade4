//! `ValueCheck`: a compiled comparator or named predicate, shared by the
//! lookup compiler's right-hand predicate forms and the select-statement
//! atom evaluator. Grounded on `dlquery.parser.SelectParser.get_predicate`'s
//! dispatch-by-operator table.

use super::compare::{self, CompareOp};
use super::datetime::{self, DatetimeOptions};
use super::{false_on_exception, validate};
use crate::config::EngineOptions;
use crate::error::Result;
use crate::matchers;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone)]
pub enum ValueCheck {
    Named { case: String, valid: bool },
    CompareNumber(CompareOp, String),
    Compare(CompareOp, String),
    CompareVersion(CompareOp, String),
    CompareSemanticVersion(CompareOp, String),
    CompareDate(CompareOp, String, DatetimeOptions),
    CompareTime(CompareOp, String, DatetimeOptions),
    CompareDatetime(CompareOp, String, DatetimeOptions),
    Contain(String),
    NotContain(String),
    Belong(String),
    NotBelong(String),
    Match(String),
    NotMatch(String),
    /// An operator the dispatcher does not recognize: always `false`,
    /// mirroring `SelectParser.get_predicate`'s fallback to `Predicate.false`.
    AlwaysFalse,
}

impl ValueCheck {
    pub fn eval(&self, probe: &str, options: &EngineOptions) -> Result<bool> {
        let on_exception = options.strict;
        match self {
            ValueCheck::Named { case, valid } => validate(case, probe, *valid, on_exception),
            ValueCheck::CompareNumber(op, other) => false_on_exception(
                on_exception,
                true,
                compare::compare_number(*op, probe, other),
                "compare_number",
                probe,
            ),
            ValueCheck::Compare(op, other) => false_on_exception(
                on_exception,
                true,
                compare::compare(*op, probe, other),
                "compare",
                probe,
            ),
            ValueCheck::CompareVersion(op, other) => false_on_exception(
                on_exception,
                true,
                compare::compare_version(*op, probe, other),
                "compare_version",
                probe,
            ),
            ValueCheck::CompareSemanticVersion(op, other) => false_on_exception(
                on_exception,
                true,
                compare::compare_semantic_version(*op, probe, other),
                "compare_semantic_version",
                probe,
            ),
            ValueCheck::CompareDate(op, other, opts) => {
                let result = datetime::parse_date(probe, opts).and_then(|p| {
                    datetime::parse_date(other, opts).map(|o| op.apply_ord(p.cmp(&o)))
                });
                false_on_exception(on_exception, true, result, "compare_date", probe)
            }
            ValueCheck::CompareTime(op, other, opts) => {
                let result = datetime::parse_time(probe, opts).and_then(|p| {
                    datetime::parse_time(other, opts).map(|o| op.apply_ord(p.cmp(&o)))
                });
                false_on_exception(on_exception, true, result, "compare_time", probe)
            }
            ValueCheck::CompareDatetime(op, other, opts) => false_on_exception(
                on_exception,
                true,
                compare::compare_datetime(*op, probe, other, opts),
                "compare_datetime",
                probe,
            ),
            ValueCheck::Contain(other) => Ok(compare::contain(probe, other)),
            ValueCheck::NotContain(other) => Ok(!compare::contain(probe, other)),
            ValueCheck::Belong(other) => Ok(compare::belong(probe, other)),
            ValueCheck::NotBelong(other) => Ok(!compare::belong(probe, other)),
            ValueCheck::Match(pattern) => {
                let result = matchers::compile_regex(pattern, false, options.cache_regex)
                    .map(|m| m.matches(probe));
                false_on_exception(on_exception, true, result, "match", probe)
            }
            ValueCheck::NotMatch(pattern) => {
                let result = matchers::compile_regex(pattern, false, options.cache_regex)
                    .map(|m| !m.matches(probe));
                false_on_exception(on_exception, true, result, "notmatch", probe)
            }
            ValueCheck::AlwaysFalse => Ok(false),
        }
    }
}

impl CompareOp {
    fn apply_ord(self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Lt => ord == Less,
            CompareOp::Le => ord != Greater,
            CompareOp::Gt => ord == Greater,
            CompareOp::Ge => ord != Less,
            CompareOp::Eq => ord == Equal,
            CompareOp::Ne => ord != Equal,
        }
    }
}

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^((?P<semantic>semantic)_)?version\((?P<v>.+)\)$").unwrap()
});
static DATETIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?P<name>datetime|date|time)\((?P<body>.+)\)$").unwrap());
static OPTION_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(format|skips|timezone|iso|dayfirst|fuzzy)\s*=").unwrap());

pub fn looks_numeric(s: &str) -> bool {
    s.trim().parse::<f64>().is_ok()
}

fn split_literal_and_options(body: &str) -> (String, String) {
    match OPTION_SPLIT_RE.find(body) {
        Some(m) => (
            body[..m.start()].trim().to_string(),
            body[m.start()..].trim().to_string(),
        ),
        None => (body.trim().to_string(), String::new()),
    }
}

/// Disambiguate a comparator's right-hand literal into a `ValueCheck`,
/// mirroring the `version(..)`/`semantic_version(..)`/`date(..)`/
/// `time(..)`/`datetime(..)` detection in `SelectParser.get_predicate`.
/// `options.extra_date_formats`/`extra_time_formats` are folded into the
/// resulting comparator's `DatetimeOptions.formats` so a caller's
/// configured formats are tried alongside any inline `format=`.
pub fn parse_comparator_value(op: CompareOp, raw: &str, options: &EngineOptions) -> ValueCheck {
    let trimmed = raw.trim();
    if let Some(caps) = VERSION_RE.captures(trimmed) {
        let expected = caps.name("v").unwrap().as_str().to_string();
        return if caps.name("semantic").is_some() {
            ValueCheck::CompareSemanticVersion(op, expected)
        } else {
            ValueCheck::CompareVersion(op, expected)
        };
    }
    if let Some(caps) = DATETIME_RE.captures(trimmed) {
        let name = caps.name("name").unwrap().as_str().to_ascii_lowercase();
        let body = caps.name("body").unwrap().as_str();
        let (literal, opts_str) = split_literal_and_options(body);
        let mut opts = datetime::parse_options(&opts_str);
        return match name.as_str() {
            "date" => {
                opts.formats.extend(options.extra_date_formats.iter().cloned());
                ValueCheck::CompareDate(op, literal, opts)
            }
            "time" => {
                opts.formats.extend(options.extra_time_formats.iter().cloned());
                ValueCheck::CompareTime(op, literal, opts)
            }
            _ => {
                opts.formats.extend(
                    options
                        .extra_date_formats
                        .iter()
                        .flat_map(|d| options.extra_time_formats.iter().map(move |t| format!("{d} {t}"))),
                );
                ValueCheck::CompareDatetime(op, literal, opts)
            }
        };
    }
    match op {
        CompareOp::Eq | CompareOp::Ne => {
            if looks_numeric(trimmed) {
                ValueCheck::CompareNumber(op, trimmed.to_string())
            } else {
                ValueCheck::Compare(op, trimmed.to_string())
            }
        }
        _ => ValueCheck::CompareNumber(op, trimmed.to_string()),
    }
}
