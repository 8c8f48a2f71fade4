//! IP and MAC address shape predicates, grounded on
//! `dlquery.validation.get_ip_address` / `CustomValidation.is_*_address`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::{Ipv4Addr, Ipv6Addr};

static MAC_SEPARATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([0-9a-f]{2}[:\- ]){5}[0-9a-f]{2}$").unwrap());
static MAC_DOTTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[0-9a-f]{4}\.[0-9a-f]{4}\.[0-9a-f]{4}$").unwrap());

/// Convert an octal (leading-zero) or hexadecimal (two-digit, a-f present)
/// dotted quad into a plain decimal dotted quad, if it looks like one.
fn normalize_dotted_quad(addr: &str) -> Option<String> {
    let parts: Vec<&str> = addr.split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    let is_hex_quad = parts
        .iter()
        .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
        && parts.iter().any(|p| p.chars().any(|c| c.is_ascii_alphabetic()));
    if is_hex_quad {
        let converted: Option<Vec<String>> = parts
            .iter()
            .map(|p| u8::from_str_radix(p, 16).ok().map(|v| v.to_string()))
            .collect();
        return converted.map(|v| v.join("."));
    }
    let is_octal_quad = parts
        .iter()
        .all(|p| p.len() > 1 && p.starts_with('0') && p.chars().all(|c| c.is_ascii_digit()));
    if is_octal_quad {
        let converted: Option<Vec<String>> = parts
            .iter()
            .map(|p| i64::from_str_radix(p, 8).ok().map(|v| v.to_string()))
            .collect();
        return converted.map(|v| v.join("."));
    }
    None
}

pub fn is_ipv4_address(addr: &str) -> bool {
    let candidate = normalize_dotted_quad(addr).unwrap_or_else(|| addr.to_string());
    candidate.parse::<Ipv4Addr>().is_ok()
}

/// Split `a/b` or `a%b` into (base, suffix, separator).
fn split_suffix(addr: &str) -> (&str, Option<&str>, Option<char>) {
    if let Some(pos) = addr.find('/') {
        return (&addr[..pos], Some(&addr[pos + 1..]), Some('/'));
    }
    if let Some(pos) = addr.find('%') {
        return (&addr[..pos], Some(&addr[pos + 1..]), Some('%'));
    }
    (addr, None, None)
}

pub fn is_ipv6_address(addr: &str) -> bool {
    let (base, suffix, _sep) = split_suffix(addr);
    if let Some(suf) = suffix {
        match suf.parse::<u32>() {
            Ok(n) if n <= 127 => {}
            _ => return false,
        }
    }
    base.parse::<Ipv6Addr>().is_ok()
}

pub fn is_ip_address(addr: &str) -> bool {
    is_ipv4_address(addr) || is_ipv6_address(addr)
}

pub fn is_mac_address(addr: &str) -> bool {
    MAC_SEPARATED.is_match(addr) || MAC_DOTTED.is_match(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ipv4() {
        assert!(is_ipv4_address("192.168.1.1"));
        assert!(!is_ipv4_address("192.168.1.999"));
    }

    #[test]
    fn octal_ipv4() {
        assert!(is_ipv4_address("010.010.010.010"));
    }

    #[test]
    fn hex_ipv4() {
        assert!(is_ipv4_address("c0.a8.01.01"));
    }

    #[test]
    fn ipv6_with_prefix() {
        assert!(is_ipv6_address("fe80::1/64"));
        assert!(!is_ipv6_address("fe80::1/200"));
    }

    #[test]
    fn ipv6_with_zone() {
        assert!(is_ipv6_address("fe80::1%1"));
    }

    #[test]
    fn mac_variants() {
        assert!(is_mac_address("AA:BB:CC:DD:EE:FF"));
        assert!(is_mac_address("aa-bb-cc-dd-ee-ff"));
        assert!(is_mac_address("aabb.ccdd.eeff"));
        assert!(!is_mac_address("not-a-mac"));
    }
}
