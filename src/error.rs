//! Closed error taxonomy for the query engine.

use thiserror::Error;

/// Every fallible entry point in this crate returns `Result<T, Error>`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("lookup syntax error: {0}")]
    LookupSyntax(String),

    #[error("select-statement syntax error: {0}")]
    SelectSyntax(String),

    #[error("unknown predicate: {0}")]
    UnknownPredicate(String),

    #[error("invalid predicate argument: {0}")]
    PredicateArgument(String),

    #[error("tree shape error: {0}")]
    TreeShape(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Ensures `value` is one of `choices`, mirroring the guard style of
/// `dlquery.argumenthelper.validate_argument_choice`.
pub fn validate_choice<T: PartialEq + std::fmt::Debug>(
    name: &str,
    value: &T,
    choices: &[T],
) -> Result<()> {
    if choices.iter().any(|c| c == value) {
        Ok(())
    } else {
        Err(Error::PredicateArgument(format!(
            "{name} must be one of {choices:?}, got {value:?}"
        )))
    }
}
