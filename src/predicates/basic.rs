//! Emptiness and truthiness predicates, grounded on
//! `dlquery.validation.CustomValidation.is_empty/is_optional_empty/is_true/is_false`.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+$").unwrap());

pub fn is_empty(value: &str) -> bool {
    value.is_empty()
}

pub fn is_optional_empty(value: &str) -> bool {
    value.is_empty() || WHITESPACE_ONLY.is_match(value)
}

pub fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

pub fn is_false(value: &str) -> bool {
    value.eq_ignore_ascii_case("false")
}
