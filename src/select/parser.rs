//! Expression tokenizing (via the `pest` grammar in `grammar.pest`) and
//! the left-linear `and_`/`or_` fold, grounded on
//! `dlquery.parser.SelectParser.get_predicate`/`build_predicate`.

use crate::config::EngineOptions;
use crate::error::{Error, Result};
use crate::predicates::check::{parse_comparator_value, ValueCheck};
use crate::predicates::compare::CompareOp;
use crate::tree::{NodeId, Tree};
use once_cell::sync::Lazy;
use pest::Parser;
use pest_derive::Parser;
use regex::Regex;

#[derive(Parser)]
#[grammar = "select/grammar.pest"]
struct SelectGrammar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone)]
pub struct Atom {
    pub key: String,
    pub check: ValueCheck,
}

#[derive(Debug, Clone)]
pub enum PredicateNode {
    Atom(Atom),
    Combine(LogicalOp, Box<PredicateNode>, Box<PredicateNode>),
}

impl PredicateNode {
    pub fn evaluate(&self, tree: &Tree, record: NodeId, options: &EngineOptions) -> Result<bool> {
        match self {
            PredicateNode::Atom(atom) => match tree.get_field(record, &atom.key) {
                None => Ok(false),
                Some(child) => {
                    let probe = tree.stringify(child);
                    atom.check.eval(&probe, options)
                }
            },
            PredicateNode::Combine(op, lhs, rhs) => {
                let l = lhs.evaluate(tree, record, options)?;
                let r = rhs.evaluate(tree, record, options)?;
                Ok(match op {
                    LogicalOp::And => l && r,
                    LogicalOp::Or => l || r,
                })
            }
        }
    }
}

/// Split `expr` into alternating atom-text/connective tokens using the
/// `pest` grammar, then fold them strictly left-to-right into a tree:
/// `A op1 B op2 C` becomes `((A op1 B) op2 C)`, regardless of whether
/// op1/op2 are `and_` or `or_` (equal precedence, no Pratt table).
pub fn build_predicate_tree(expr: &str, options: &EngineOptions) -> Result<PredicateNode> {
    let mut pairs = SelectGrammar::parse(Rule::statement, expr.trim())
        .map_err(|e| Error::SelectSyntax(e.to_string()))?;
    let statement = pairs.next().ok_or_else(|| {
        Error::SelectSyntax(format!("empty WHERE expression: {expr:?}"))
    })?;
    let expression = statement
        .into_inner()
        .find(|p| p.as_rule() == Rule::expression)
        .ok_or_else(|| Error::SelectSyntax(format!("malformed WHERE expression: {expr:?}")))?;

    let mut tokens: Vec<String> = Vec::new();
    for pair in expression.into_inner() {
        tokens.push(pair.as_str().trim().to_string());
    }

    if tokens.is_empty() {
        return Err(Error::SelectSyntax(format!(
            "empty WHERE expression: {expr:?}"
        )));
    }

    let mut result = PredicateNode::Atom(parse_atom(&tokens[0], options)?);
    let mut i = 1;
    while i + 1 < tokens.len() {
        let op = logical_op(&tokens[i]);
        let rhs_text = tokens.get(i + 1).ok_or_else(|| {
            Error::SelectSyntax(format!("dangling connective in {expr:?}"))
        })?;
        let rhs = PredicateNode::Atom(parse_atom(rhs_text, options)?);
        result = PredicateNode::Combine(op, Box::new(result), Box::new(rhs));
        i += 2;
    }
    Ok(result)
}

fn logical_op(token: &str) -> LogicalOp {
    if token.eq_ignore_ascii_case("or_") {
        LogicalOp::Or
    } else {
        LogicalOp::And
    }
}

static NOT_CONTAIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^not_?contains?$").unwrap());
static NOT_BELONG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^not_?belongs?$").unwrap());

/// Parse `key op value`, expanding the `_SPACE_`/`_COMMA_` sentinels,
/// mirroring `SelectParser.get_predicate`.
fn parse_atom(expr: &str, options: &EngineOptions) -> Result<Atom> {
    let trimmed = expr.trim();
    let (key_raw, rest) = split_once_whitespace(trimmed)
        .ok_or_else(|| Error::SelectSyntax(format!("malformed atom {expr:?}")))?;
    let (op_raw, value_raw) = split_once_whitespace(rest.trim_start())
        .ok_or_else(|| Error::SelectSyntax(format!("malformed atom {expr:?}")))?;

    let key = expand_sentinels(key_raw);
    let op = op_raw.trim();
    let value = expand_sentinels(value_raw.trim());
    let op_lower = op.to_ascii_lowercase();

    let check = match op_lower.as_str() {
        "is" => ValueCheck::Named {
            case: value,
            valid: true,
        },
        "is_not" | "isnot" => ValueCheck::Named {
            case: value,
            valid: false,
        },
        "lt" | "<" => parse_comparator_value(CompareOp::Lt, &value, options),
        "le" | "<=" => parse_comparator_value(CompareOp::Le, &value, options),
        "gt" | ">" => parse_comparator_value(CompareOp::Gt, &value, options),
        "ge" | ">=" => parse_comparator_value(CompareOp::Ge, &value, options),
        "eq" | "==" => parse_comparator_value(CompareOp::Eq, &value, options),
        "ne" | "!=" => parse_comparator_value(CompareOp::Ne, &value, options),
        "match" => ValueCheck::Match(value),
        "not_match" | "notmatch" => ValueCheck::NotMatch(value),
        "contain" | "contains" => ValueCheck::Contain(value),
        "belong" | "belongs" => ValueCheck::Belong(value),
        other if NOT_CONTAIN_RE.is_match(other) => ValueCheck::NotContain(value),
        other if NOT_BELONG_RE.is_match(other) => ValueCheck::NotBelong(value),
        other => {
            tracing::info!(operator = other, "unsupported logical operator; always false");
            ValueCheck::AlwaysFalse
        }
    };

    Ok(Atom { key, check })
}

fn split_once_whitespace(s: &str) -> Option<(&str, &str)> {
    let idx = s.find(char::is_whitespace)?;
    Some((&s[..idx], &s[idx..]))
}

fn expand_sentinels(s: &str) -> String {
    s.replace("_SPACE_", " ").replace("_COMMA_", ",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build_predicate_tree(expr: &str) -> Result<PredicateNode> {
        super::build_predicate_tree(expr, &EngineOptions::default())
    }

    #[test]
    fn single_atom() {
        let tree = crate::tree::Tree::from_json_value(json!({"width": 300})).unwrap();
        let node = build_predicate_tree("width eq 300").unwrap();
        assert!(node.evaluate(&tree, tree.root(), &EngineOptions::default()).unwrap());
    }

    #[test]
    fn left_linear_fold_mixed_connectives() {
        // (A or_ B) and_ C: A false, B true, C true -> (false or true) and true = true
        let tree =
            crate::tree::Tree::from_json_value(json!({"a": 1, "b": 2, "c": 3})).unwrap();
        let node = build_predicate_tree("a eq 99 or_ b eq 2 and_ c eq 3").unwrap();
        assert!(node.evaluate(&tree, tree.root(), &EngineOptions::default()).unwrap());
    }

    #[test]
    fn equal_precedence_left_to_right_differs_from_and_first() {
        // If and_ bound tighter than or_ (Pratt-style), this would be
        // A or_ (B and_ C) = true or (false and x) = true either way, so
        // use a case where left-to-right folding changes the outcome:
        // A and_ B or_ C with A=false, B=true, C=true:
        //   left-linear: (A and_ B) or_ C = (false and true) or true = true
        //   Pratt (and_ tighter): A and_ (B or_ C) = false and (true or true) = false
        let tree =
            crate::tree::Tree::from_json_value(json!({"a": 1, "b": 2, "c": 3})).unwrap();
        let node = build_predicate_tree("a eq 99 and_ b eq 2 or_ c eq 3").unwrap();
        assert!(node.evaluate(&tree, tree.root(), &EngineOptions::default()).unwrap());
    }

    #[test]
    fn unsupported_operator_is_always_false() {
        let tree = crate::tree::Tree::from_json_value(json!({"a": 1})).unwrap();
        let node = build_predicate_tree("a frobnicate 1").unwrap();
        assert!(!node.evaluate(&tree, tree.root(), &EngineOptions::default()).unwrap());
    }

    #[test]
    fn sentinel_expansion_in_key_and_value() {
        let tree =
            crate::tree::Tree::from_json_value(json!({"full name": "a,b"})).unwrap();
        let node = build_predicate_tree("full_SPACE_name eq a_COMMA_b").unwrap();
        assert!(node.evaluate(&tree, tree.root(), &EngineOptions::default()).unwrap());
    }

    #[test]
    fn datetime_atom_uses_extra_time_formats() {
        let tree = crate::tree::Tree::from_json_value(json!({"t": "23:30:00"})).unwrap();
        let options = EngineOptions {
            extra_time_formats: vec!["%I.%M %p".to_string()],
            ..EngineOptions::default()
        };
        let node = super::build_predicate_tree("t eq time(11.30 PM)", &options).unwrap();
        assert!(node.evaluate(&tree, tree.root(), &EngineOptions::default()).unwrap());
    }
}
