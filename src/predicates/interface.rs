//! Interface-name shape predicates, grounded on
//! `dlquery.validation.validate_interface` and its `is_*_interface` callers.

use regex::Regex;

fn validate_interface(name: &str, prefix_alt: &str) -> bool {
    let pattern = format!(r"(?i)\b(?:{prefix_alt}) *[0-9]+(/[0-9]+)?([.][0-9]+)?\b");
    Regex::new(&pattern)
        .expect("interface pattern is statically valid")
        .is_match(name)
}

pub fn is_loopback_interface(name: &str) -> bool {
    validate_interface(name, "lo(opback)?")
}

pub fn is_bundle_ethernet(name: &str) -> bool {
    validate_interface(name, "bundle-ether|be")
}

pub fn is_port_channel(name: &str) -> bool {
    validate_interface(name, "po(rt-channel)?")
}

pub fn is_hundred_gigabit_ethernet(name: &str) -> bool {
    validate_interface(name, "hu(ndredgige)?")
}

pub fn is_ten_gigabit_ethernet(name: &str) -> bool {
    validate_interface(name, "te(ngige)?")
}

pub fn is_gigabit_ethernet(name: &str) -> bool {
    validate_interface(name, "gi(gabitethernet)?")
}

pub fn is_fast_ethernet(name: &str) -> bool {
    validate_interface(name, "fa(stethernet)?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_long_and_short_form() {
        assert!(is_loopback_interface("Loopback0"));
        assert!(is_loopback_interface("lo 0"));
        assert!(!is_loopback_interface("GigabitEthernet0/0"));
    }

    #[test]
    fn bundle_ethernet() {
        assert!(is_bundle_ethernet("Bundle-Ether10"));
        assert!(is_bundle_ethernet("BE10"));
    }

    #[test]
    fn port_channel_with_subinterface() {
        assert!(is_port_channel("Port-channel1.100"));
    }

    #[test]
    fn hundred_gig_with_path() {
        assert!(is_hundred_gigabit_ethernet("HundredGigE0/0/0/1"));
        assert!(is_hundred_gigabit_ethernet("Hu0/0/0/1"));
    }

    #[test]
    fn ten_gig_and_gig_and_fast() {
        assert!(is_ten_gigabit_ethernet("TenGigE0/0/0/1"));
        assert!(is_gigabit_ethernet("GigabitEthernet0/0"));
        assert!(is_fast_ethernet("FastEthernet0/0"));
    }
}
