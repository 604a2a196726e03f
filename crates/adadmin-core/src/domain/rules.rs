//! Field rules shared by the domain entities

use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]{1,64}$").expect("identifier pattern is valid")
});

// RFC 952/1123 single label
static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("hostname pattern is valid")
});

/// 1..64 characters from `[A-Za-z0-9._-]`
pub fn is_identifier(value: &str) -> bool {
    IDENTIFIER.is_match(value)
}

/// A single RFC 952/1123 hostname label
pub fn is_hostname(value: &str) -> bool {
    HOSTNAME.is_match(value)
}

/// A principal of the form `name@realm`
pub fn has_realm(value: &str) -> bool {
    value.contains('@')
}

/// An IEEE 802 hardware address
///
/// Accepts 6, 8 or 20 octets written as `aa:bb:..`, `aa-bb-..` or
/// `aabb.ccdd.eeff`.
pub fn is_mac_address(value: &str) -> bool {
    let bytes = value.as_bytes();
    let (separator, width) = match (bytes.get(2), bytes.get(4)) {
        (Some(b':'), _) => (':', 2),
        (Some(b'-'), _) => ('-', 2),
        (_, Some(b'.')) => ('.', 4),
        _ => return false,
    };

    let groups: Vec<&str> = value.split(separator).collect();
    let octets = groups.len() * width / 2;
    matches!(octets, 6 | 8 | 20)
        && groups
            .iter()
            .all(|group| group.len() == width && group.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// An IPv4 address, including the IPv4-mapped IPv6 form
pub fn is_ipv4(value: &str) -> bool {
    match value.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => true,
        Ok(IpAddr::V6(v6)) => v6.to_ipv4_mapped().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert!(is_identifier("rwerum"));
        assert!(is_identifier("svc.backup-01_x"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("!!!"));
        assert!(!is_identifier(&"a".repeat(65)));
    }

    #[test]
    fn test_hostname() {
        assert!(is_hostname("dc1"));
        assert!(is_hostname("a"));
        assert!(is_hostname("print-server-2"));
        assert!(!is_hostname("bad host"));
        assert!(!is_hostname("-leading"));
        assert!(!is_hostname("trailing-"));
        assert!(!is_hostname(&"h".repeat(64)));
    }

    #[test]
    fn test_mac_address() {
        assert!(is_mac_address("bc:24:11:9d:ca:fa"));
        assert!(is_mac_address("BC-24-11-9D-CA-FA"));
        assert!(is_mac_address("bc24.119d.cafa"));
        assert!(is_mac_address("02:00:5e:10:00:00:00:01"));
        assert!(!is_mac_address("zz:zz:zz:zz:zz:zz"));
        assert!(!is_mac_address("bc:24:11:9d:ca"));
        assert!(!is_mac_address("bc:24-11:9d:ca:fa"));
        assert!(!is_mac_address(""));
    }

    #[test]
    fn test_ipv4() {
        assert!(is_ipv4("10.0.10.6"));
        assert!(is_ipv4("::ffff:10.0.10.6"));
        assert!(!is_ipv4("fe80::1"));
        assert!(!is_ipv4("not-ip"));
    }
}
