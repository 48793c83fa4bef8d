/* src/classify.rs */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Check whether a parsed address is local: loopback (`127.0.0.0/8`, `::1`)
/// or one of the private IPv4 ranges `10.0.0.0/8`, `172.16.0.0/12` and
/// `192.168.0.0/16`.
///
/// IPv4-mapped IPv6 addresses (`::ffff:10.0.0.1`) are judged by the IPv4
/// address they carry.
///
/// # Examples
///
/// ```rust
/// use clientip::is_local_ip;
///
/// assert!(is_local_ip("172.31.0.1".parse().unwrap()));
/// assert!(!is_local_ip("172.32.0.1".parse().unwrap()));
/// ```
pub fn is_local_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => is_local_ipv4(ipv4),
        IpAddr::V6(ipv6) => is_local_ipv6(ipv6),
    }
}

/// Textual counterpart of [`is_local_ip`].
///
/// Surrounding whitespace is ignored. Anything that does not parse as an IP
/// address is reported as not local.
pub fn is_local_addr(addr: &str) -> bool {
    addr.trim()
        .parse::<IpAddr>()
        .map(is_local_ip)
        .unwrap_or(false)
}

fn is_local_ipv4(ip: Ipv4Addr) -> bool {
    if ip.is_loopback() {
        return true;
    }
    match ip.octets() {
        [10, ..] => true,
        [172, second, ..] => (16..=31).contains(&second),
        [192, 168, ..] => true,
        _ => false,
    }
}

fn is_local_ipv6(ip: Ipv6Addr) -> bool {
    if ip.is_loopback() {
        return true;
    }
    ip.to_ipv4_mapped().is_some_and(is_local_ipv4)
}

/// Method form of the local address check, for both text and parsed addresses.
pub trait LocalAddr {
    fn is_local(&self) -> bool;
}

impl LocalAddr for str {
    fn is_local(&self) -> bool {
        is_local_addr(self)
    }
}

impl LocalAddr for String {
    fn is_local(&self) -> bool {
        is_local_addr(self)
    }
}

impl LocalAddr for IpAddr {
    fn is_local(&self) -> bool {
        is_local_ip(*self)
    }
}

impl LocalAddr for Ipv4Addr {
    fn is_local(&self) -> bool {
        is_local_ipv4(*self)
    }
}

impl LocalAddr for Ipv6Addr {
    fn is_local(&self) -> bool {
        is_local_ipv6(*self)
    }
}
