//! The value-predicate taxonomy: named checks (`is_ip_address`, …) and
//! comparators (`compare_number`, `compare_version`, …), plus the
//! `false_on_exception` policy wrapper every predicate runs through.
//!
//! Grounded on `dlquery.validation.CustomValidation`/`OpValidation` and
//! the `false_on_exception_for_classmethod` decorator.

pub mod basic;
pub mod check;
pub mod compare;
pub mod datetime;
pub mod interface;
pub mod network;

pub use compare::CompareOp;

use crate::error::{Error, Result};

/// Catch a predicate's failure and collapse it to `false` unless the
/// caller asked for strict (`on_exception`) propagation. `valid=false`
/// inverts a successful result, supporting `is_not_*` spellings.
pub fn false_on_exception(
    on_exception: bool,
    valid: bool,
    result: Result<bool>,
    predicate_name: &str,
    operand: &str,
) -> Result<bool> {
    match result {
        Ok(b) => Ok(if valid { b } else { !b }),
        Err(e) => {
            if on_exception {
                Err(e)
            } else {
                tracing::info!(
                    predicate = predicate_name,
                    operand,
                    error = %e,
                    "predicate raised; treating as false"
                );
                Ok(false)
            }
        }
    }
}

fn dispatch_bool(case: &str, value: &str) -> Result<bool> {
    Ok(match case {
        "empty" => basic::is_empty(value),
        "optional_empty" => basic::is_optional_empty(value),
        "true" => basic::is_true(value),
        "false" => basic::is_false(value),
        "ip_address" => network::is_ip_address(value),
        "ipv4_address" => network::is_ipv4_address(value),
        "ipv6_address" => network::is_ipv6_address(value),
        "mac_address" => network::is_mac_address(value),
        "loopback_interface" => interface::is_loopback_interface(value),
        "bundle_ethernet" => interface::is_bundle_ethernet(value),
        "port_channel" => interface::is_port_channel(value),
        "hundred_gigabit_ethernet" => interface::is_hundred_gigabit_ethernet(value),
        "ten_gigabit_ethernet" => interface::is_ten_gigabit_ethernet(value),
        "gigabit_ethernet" => interface::is_gigabit_ethernet(value),
        "fast_ethernet" => interface::is_fast_ethernet(value),
        other => return Err(Error::UnknownPredicate(other.to_string())),
    })
}

/// Resolve `case` to `is_<case>` (accepting either spelling) and run it
/// through the policy wrapper. This is the engine's one dispatch-by-name
/// seam, mirroring `CustomValidation.validate`.
pub fn validate(case: &str, value: &str, valid: bool, on_exception: bool) -> Result<bool> {
    let normalized = case.strip_prefix("is_").unwrap_or(case);
    let result = dispatch_bool(normalized, value);
    false_on_exception(on_exception, valid, result, case, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_dispatches_by_name() {
        assert!(validate("ipv4_address", "1.2.3.4", true, true).unwrap());
        assert!(validate("is_ipv4_address", "1.2.3.4", true, true).unwrap());
    }

    #[test]
    fn validate_valid_flag_inverts() {
        assert!(!validate("ipv4_address", "1.2.3.4", false, true).unwrap());
    }

    #[test]
    fn unknown_predicate_propagates_when_strict() {
        assert!(validate("not_a_thing", "x", true, true).is_err());
    }

    #[test]
    fn unknown_predicate_swallowed_to_false_by_default() {
        assert!(!validate("not_a_thing", "x", true, false).unwrap());
    }
}
