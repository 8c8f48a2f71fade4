//! The select-statement parser: SELECT/WHERE grammar producing a
//! [`ColumnSpec`] and an optional [`PredicateNode`] tree, grounded on
//! `dlquery.parser.SelectParser.parse_statement`.

mod parser;

pub use parser::{Atom, LogicalOp, PredicateNode};

use crate::config::EngineOptions;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSpec {
    ZeroSelect,
    AllSelect,
    Named(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct CompiledSelect {
    pub columns: ColumnSpec,
    pub predicate: Option<PredicateNode>,
}

static WHERE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+where\s+").unwrap());
static LEADING_WHERE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^where\s+").unwrap());
static LEADING_SELECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^select\s+").unwrap());
static COLUMN_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ ,]+").unwrap());

pub fn compile_select(statement: &str, options: &EngineOptions) -> Result<CompiledSelect> {
    let statement = statement.trim();
    if statement.is_empty() {
        return Ok(CompiledSelect {
            columns: ColumnSpec::ZeroSelect,
            predicate: None,
        });
    }

    let (select_part, expr_part) = if let Some(m) = WHERE_SPLIT_RE.find(statement) {
        let select = statement[..m.start()].trim();
        let expr = statement[m.end()..].trim();
        let select = LEADING_SELECT_RE.replace(select, "").to_string();
        (Some(select), Some(expr.to_string()))
    } else if statement.eq_ignore_ascii_case("where") || LEADING_WHERE_RE.is_match(statement) {
        let expr = LEADING_WHERE_RE.replace(statement, "").to_string();
        (None, Some(expr))
    } else {
        let select = LEADING_SELECT_RE.replace(statement, "").to_string();
        (Some(select), None)
    };

    let columns = match select_part {
        None => ColumnSpec::ZeroSelect,
        Some(s) if s.is_empty() => ColumnSpec::ZeroSelect,
        Some(s) if s == "*" || s == "__ALL__" => ColumnSpec::AllSelect,
        Some(s) => ColumnSpec::Named(
            COLUMN_SPLIT_RE
                .split(s.trim())
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string())
                .collect(),
        ),
    };

    let predicate = match expr_part {
        None => None,
        Some(s) if s.is_empty() => None,
        Some(s) => Some(parser::build_predicate_tree(&s, options)?),
    };

    Ok(CompiledSelect { columns, predicate })
}
