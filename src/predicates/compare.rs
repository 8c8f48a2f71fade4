//! Comparator predicates: numeric, raw-equality, substring, version, and
//! datetime comparisons, grounded on `dlquery.validation.OpValidation` and
//! `VersionValidation`/`DatetimeValidation`.

use super::datetime::{self, DatetimeOptions};
use crate::error::{Error, Result};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn parse(s: &str) -> Result<CompareOp> {
        match s.to_ascii_lowercase().as_str() {
            "lt" | "<" => Ok(CompareOp::Lt),
            "le" | "<=" => Ok(CompareOp::Le),
            "gt" | ">" => Ok(CompareOp::Gt),
            "ge" | ">=" => Ok(CompareOp::Ge),
            "eq" | "==" => Ok(CompareOp::Eq),
            "ne" | "!=" => Ok(CompareOp::Ne),
            other => Err(Error::UnknownPredicate(format!("comparison operator {other:?}"))),
        }
    }

    fn apply(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
        }
    }
}

/// Normalize boolean-ish strings to "1"/"0" before numeric coercion, the
/// same normalization `OpValidation.compare_number` applies.
fn normalize_boolean_string(s: &str) -> String {
    if s.eq_ignore_ascii_case("true") {
        "1".to_string()
    } else if s.eq_ignore_ascii_case("false") {
        "0".to_string()
    } else {
        s.to_string()
    }
}

pub fn compare_number(op: CompareOp, left: &str, right: &str) -> Result<bool> {
    let l: f64 = normalize_boolean_string(left)
        .parse()
        .map_err(|_| Error::PredicateArgument(format!("{left:?} is not a number")))?;
    let r: f64 = normalize_boolean_string(right)
        .parse()
        .map_err(|_| Error::PredicateArgument(format!("{right:?} is not a number")))?;
    let ord = l.partial_cmp(&r).ok_or_else(|| {
        Error::PredicateArgument(format!("{left:?} and {right:?} are not comparable"))
    })?;
    Ok(op.apply(ord))
}

pub fn compare(op: CompareOp, left: &str, right: &str) -> Result<bool> {
    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::Ne => Ok(left != right),
        _ => Err(Error::UnknownPredicate(format!(
            "string compare does not support operator {op:?}"
        ))),
    }
}

pub fn contain(value: &str, other: &str) -> bool {
    value.contains(other)
}

pub fn belong(value: &str, other: &str) -> bool {
    other.contains(value)
}

/// Split a version string into numeric/alphabetic runs so "10" orders
/// after "9" instead of lexicographically before it.
fn version_segments(v: &str) -> Vec<(Option<u64>, String)> {
    v.split(|c| c == '.' || c == '-')
        .map(|seg| match seg.parse::<u64>() {
            Ok(n) => (Some(n), seg.to_string()),
            Err(_) => (None, seg.to_string()),
        })
        .collect()
}

fn compare_version_segments(a: &[(Option<u64>, String)], b: &[(Option<u64>, String)]) -> Ordering {
    for i in 0..a.len().max(b.len()) {
        let sa = a.get(i);
        let sb = b.get(i);
        let ord = match (sa, sb) {
            (Some((Some(x), _)), Some((Some(y), _))) => x.cmp(y),
            (Some((_, x)), Some((_, y))) => x.cmp(y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

pub fn compare_version(op: CompareOp, left: &str, right: &str) -> Result<bool> {
    let a = version_segments(left);
    let b = version_segments(right);
    Ok(op.apply(compare_version_segments(&a, &b)))
}

/// Semantic-version ordering: major.minor.patch numerically, then
/// prerelease identifiers compared per semver precedence rules (numeric
/// identifiers sort before alphanumeric ones, and a version without a
/// prerelease outranks one with).
pub fn compare_semantic_version(op: CompareOp, left: &str, right: &str) -> Result<bool> {
    let (lcore, lpre) = split_prerelease(left);
    let (rcore, rpre) = split_prerelease(right);
    let core_ord = compare_version_segments(&version_segments(lcore), &version_segments(rcore));
    let ord = if core_ord != Ordering::Equal {
        core_ord
    } else {
        match (lpre, rpre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(lp), Some(rp)) => {
                compare_version_segments(&version_segments(lp), &version_segments(rp))
            }
        }
    };
    Ok(op.apply(ord))
}

fn split_prerelease(v: &str) -> (&str, Option<&str>) {
    match v.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (v, None),
    }
}

pub fn compare_datetime(
    op: CompareOp,
    left: &str,
    right: &str,
    opts: &DatetimeOptions,
) -> Result<bool> {
    let l = datetime::parse_datetime(left, opts)?;
    let r = datetime::parse_datetime(right, opts)?;
    Ok(op.apply(l.cmp(&r)))
}
