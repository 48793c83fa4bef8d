/* src/resolver.rs */

use std::borrow::Cow;
use std::net::IpAddr;

use tracing::trace;

use crate::classify::is_local_addr;
use crate::error::{AddrError, Result};
use crate::request::RequestView;

/// Header carrying the chain of addresses a request was forwarded for.
pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";
/// Header carrying the client address as seen by the nearest proxy.
pub const X_REAL_IP: &str = "X-Real-IP";

/// Configuration for client address resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpResolver {
    /// Header holding the comma-separated forwarding chain.
    pub forwarded_header: Cow<'static, str>,
    /// Header holding a single client address.
    pub real_ip_header: Cow<'static, str>,
    /// Walk the forwarding chain left to right when looking for a public
    /// address. Off by default: the right-most entries are examined first.
    pub scan_from_left: bool,
}

impl Default for IpResolver {
    fn default() -> Self {
        Self {
            forwarded_header: Cow::Borrowed(X_FORWARDED_FOR),
            real_ip_header: Cow::Borrowed(X_REAL_IP),
            scan_from_left: false,
        }
    }
}

impl IpResolver {
    /// Create a resolver reading `X-Forwarded-For` and `X-Real-IP`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header holding the forwarding chain.
    pub fn with_forwarded_header(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.forwarded_header = name.into();
        self
    }

    /// Set the header holding a single client address.
    pub fn with_real_ip_header(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.real_ip_header = name.into();
        self
    }

    /// Set the direction in which [`IpResolver::client_public_ip`] walks the
    /// forwarding chain.
    pub fn scan_forwarded_from_left(mut self, from_left: bool) -> Self {
        self.scan_from_left = from_left;
        self
    }

    /// Host part of the remote socket address. See [`remote_ip`].
    pub fn remote_ip<R: RequestView + ?Sized>(&self, req: &R) -> String {
        remote_ip(req)
    }

    /// Best guess at the client address, public or not.
    ///
    /// Takes the first entry of the forwarding chain, then the real-ip
    /// header, then the remote socket host; the first non-empty trimmed value
    /// wins. Returns an empty string when all three are empty.
    pub fn client_ip<R: RequestView + ?Sized>(&self, req: &R) -> String {
        let forwarded = req
            .header(&self.forwarded_header)
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .unwrap_or_default();
        if !forwarded.is_empty() {
            trace!(ip = forwarded, header = %self.forwarded_header, "client ip from forwarding chain");
            return forwarded.to_string();
        }

        let real_ip = self.real_ip(req);
        if !real_ip.is_empty() {
            trace!(ip = real_ip, header = %self.real_ip_header, "client ip from real-ip header");
            return real_ip.to_string();
        }

        remote_ip(req)
    }

    /// Best guess at a public client address.
    ///
    /// Walks the forwarding chain (right to left unless
    /// [`scan_from_left`](IpResolver::scan_from_left) is set) for the first
    /// entry that is not local, then tries the real-ip header, then the
    /// remote socket host. Returns an empty string if every candidate is
    /// local or empty.
    pub fn client_public_ip<R: RequestView + ?Sized>(&self, req: &R) -> String {
        if let Some(value) = req.header(&self.forwarded_header) {
            let public = if self.scan_from_left {
                forwarded_for(value).find(|ip| self.is_public(ip))
            } else {
                forwarded_for(value).rev().find(|ip| self.is_public(ip))
            };
            if let Some(ip) = public {
                trace!(ip, header = %self.forwarded_header, "public ip from forwarding chain");
                return ip.to_string();
            }
        }

        let real_ip = self.real_ip(req);
        if !real_ip.is_empty() && self.is_public(real_ip) {
            trace!(ip = real_ip, header = %self.real_ip_header, "public ip from real-ip header");
            return real_ip.to_string();
        }

        let remote = remote_ip(req);
        if !remote.is_empty() && self.is_public(&remote) {
            return remote;
        }

        String::new()
    }

    /// [`IpResolver::client_ip`] parsed into an address.
    pub fn client_ip_addr<R: RequestView + ?Sized>(&self, req: &R) -> Option<IpAddr> {
        self.client_ip(req).parse().ok()
    }

    /// [`IpResolver::client_public_ip`] parsed into an address.
    pub fn client_public_ip_addr<R: RequestView + ?Sized>(&self, req: &R) -> Option<IpAddr> {
        self.client_public_ip(req).parse().ok()
    }

    fn real_ip<'a, R: RequestView + ?Sized>(&self, req: &'a R) -> &'a str {
        req.header(&self.real_ip_header)
            .map(str::trim)
            .unwrap_or_default()
    }

    fn is_public(&self, ip: &str) -> bool {
        if is_local_addr(ip) {
            trace!(ip, "skipping local address");
            return false;
        }
        true
    }
}

/// Trimmed, non-empty entries of an `X-Forwarded-For` value, in header order.
///
/// ```rust
/// use clientip::forwarded_for;
///
/// let chain: Vec<&str> = forwarded_for(" 21.45.9.1, , 10.0.0.1 ,").collect();
/// assert_eq!(chain, ["21.45.9.1", "10.0.0.1"]);
/// ```
pub fn forwarded_for(value: &str) -> impl DoubleEndedIterator<Item = &str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

/// Split a `host:port` socket address into its host and port.
///
/// Bracketed IPv6 hosts are returned without brackets. An empty port is
/// accepted; an empty host is not.
///
/// ```rust
/// use clientip::{split_host_port, AddrError};
///
/// assert_eq!(split_host_port("[::1]:8080"), Ok(("::1", "8080")));
/// assert_eq!(split_host_port("101.1.0.4:"), Ok(("101.1.0.4", "")));
/// assert!(matches!(split_host_port("101.1.0.4"), Err(AddrError::MissingPort(_))));
/// ```
pub fn split_host_port(addr: &str) -> Result<(&str, &str)> {
    let Some(last_colon) = addr.rfind(':') else {
        return Err(AddrError::MissingPort(addr.to_string()));
    };

    let host = if let Some(bracketed) = addr.strip_prefix('[') {
        let Some(close) = bracketed.find(']') else {
            return Err(AddrError::MissingBracket(addr.to_string()));
        };
        // `close` is relative to `bracketed`; in `addr` the `]` sits at close + 1.
        let after = close + 2;
        match addr.as_bytes().get(after) {
            None => return Err(AddrError::MissingPort(addr.to_string())),
            Some(b':') if after == last_colon => {}
            Some(b':') => return Err(AddrError::TooManyColons(addr.to_string())),
            Some(_) => return Err(AddrError::MissingPort(addr.to_string())),
        }
        &bracketed[..close]
    } else {
        let host = &addr[..last_colon];
        if host.contains(':') {
            return Err(AddrError::TooManyColons(addr.to_string()));
        }
        host
    };

    let port = &addr[last_colon + 1..];
    if host.contains(['[', ']']) || port.contains(['[', ']']) {
        return Err(AddrError::UnexpectedBracket(addr.to_string()));
    }
    if host.is_empty() {
        return Err(AddrError::MissingHost(addr.to_string()));
    }

    Ok((host, port))
}

/// Host part of the request's remote socket address.
///
/// The address is trimmed and then split strictly: a bare host with no
/// `:port` or an empty host gives an empty string.
///
/// ```rust
/// use clientip::{remote_ip, RequestParts};
///
/// assert_eq!(remote_ip(&RequestParts::new("101.1.0.4:100")), "101.1.0.4");
/// assert_eq!(remote_ip(&RequestParts::new("101.1.0.4")), "");
/// ```
pub fn remote_ip<R: RequestView + ?Sized>(req: &R) -> String {
    let addr = req.remote_addr();
    match split_host_port(addr.trim()) {
        Ok((host, _)) => host.to_string(),
        Err(err) => {
            trace!(%err, "rejecting remote address");
            String::new()
        }
    }
}

/// Client address using the left-most `X-Forwarded-For` entry, then
/// `X-Real-IP`, then the remote socket host.
///
/// # Examples
///
/// ```rust
/// use clientip::{client_ip, RequestParts};
///
/// let req = RequestParts::new("40.40.40.40:42123")
///     .with_header("X-Real-IP", "10.10.10.10")
///     .with_header("X-Forwarded-For", "20.20.20.20, 30.30.30.30");
/// assert_eq!(client_ip(&req), "20.20.20.20");
/// ```
pub fn client_ip<R: RequestView + ?Sized>(req: &R) -> String {
    IpResolver::default().client_ip(req)
}

/// Public client address, walking `X-Forwarded-For` from the right and
/// falling back to `X-Real-IP` and the remote socket host.
///
/// # Examples
///
/// ```rust
/// use clientip::{client_public_ip, RequestParts};
///
/// let req = RequestParts::new("101.1.0.4:100")
///     .with_header("X-Forwarded-For", "192.168.5.45, 172.24.9.1, 89.5.6.1");
/// assert_eq!(client_public_ip(&req), "89.5.6.1");
///
/// let direct = RequestParts::new("127.0.0.1:42123");
/// assert_eq!(client_public_ip(&direct), "");
/// ```
pub fn client_public_ip<R: RequestView + ?Sized>(req: &R) -> String {
    IpResolver::default().client_public_ip(req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestParts;

    fn request(forwarded_for: &str, remote_addr: &str) -> RequestParts {
        RequestParts::new(remote_addr).with_header(X_FORWARDED_FOR, forwarded_for)
    }

    #[test]
    fn test_remote_ip() {
        for (remote_addr, expected) in [
            ("101.1.0.4:100", "101.1.0.4"),
            ("101.1.0.4:", "101.1.0.4"),
            ("101.1.0.4", ""),
            (":100", ""),
            ("  40.40.40.40:42123 ", "40.40.40.40"),
            ("[::1]:8080", "::1"),
            ("::1", ""),
            ("", ""),
        ] {
            assert_eq!(
                remote_ip(&RequestParts::new(remote_addr)),
                expected,
                "remote address {remote_addr:?}"
            );
        }
    }

    #[test]
    fn test_split_host_port_errors() {
        assert_eq!(
            split_host_port("50.50.50.50"),
            Err(AddrError::MissingPort("50.50.50.50".to_string()))
        );
        assert_eq!(
            split_host_port(":100"),
            Err(AddrError::MissingHost(":100".to_string()))
        );
        assert_eq!(
            split_host_port("::1:80"),
            Err(AddrError::TooManyColons("::1:80".to_string()))
        );
        assert_eq!(
            split_host_port("[::1:80"),
            Err(AddrError::MissingBracket("[::1:80".to_string()))
        );
        assert_eq!(
            split_host_port("[::1]"),
            Err(AddrError::MissingPort("[::1]".to_string()))
        );
        assert_eq!(
            split_host_port("[::1]:80:90"),
            Err(AddrError::TooManyColons("[::1]:80:90".to_string()))
        );
        assert_eq!(
            split_host_port("1.2.3.4]:80"),
            Err(AddrError::UnexpectedBracket("1.2.3.4]:80".to_string()))
        );
        assert_eq!(
            split_host_port("[]:80"),
            Err(AddrError::MissingHost("[]:80".to_string()))
        );
    }

    #[test]
    fn test_client_ip_priority() {
        let mut req = RequestParts::new("  40.40.40.40:42123 ")
            .with_header("X-Real-IP", " 10.10.10.10  ")
            .with_header("X-Forwarded-For", "  20.20.20.20, 30.30.30.30");
        assert_eq!(client_ip(&req), "20.20.20.20");

        req.remove_header("X-Forwarded-For");
        assert_eq!(client_ip(&req), "10.10.10.10");

        req = req.with_header("X-Forwarded-For", "30.30.30.30  ");
        assert_eq!(client_ip(&req), "30.30.30.30");

        req.remove_header("X-Forwarded-For");
        req.remove_header("X-Real-IP");
        assert_eq!(client_ip(&req), "40.40.40.40");

        req.remote_addr = "50.50.50.50".to_string();
        assert_eq!(client_ip(&req), "");
    }

    #[test]
    fn test_client_ip_empty_first_entry_falls_through() {
        let req = RequestParts::new("40.40.40.40:1")
            .with_header("X-Forwarded-For", " , 20.20.20.20")
            .with_header("X-Real-IP", "  ");
        assert_eq!(client_ip(&req), "40.40.40.40");
    }

    #[test]
    fn test_client_ip_keeps_local_addresses() {
        let req = request("192.168.1.1, 89.5.6.1", "127.0.0.1:80");
        assert_eq!(client_ip(&req), "192.168.1.1");
    }

    #[test]
    fn test_client_public_ip_chain() {
        for (forwarded_for, remote_addr, expected) in [
            ("10.3.5.45, 21.45.9.1", "101.1.0.4:100", "21.45.9.1"),
            ("", "101.1.0.4:100", "101.1.0.4"),
            ("21.45.9.1", "101.1.0.4:100", "21.45.9.1"),
            ("21.45.9.1, ", "101.1.0.4:100", "21.45.9.1"),
            ("192.168.5.45, 172.24.9.1, 89.5.6.1", "101.1.0.4:100", "89.5.6.1"),
            ("192.168.5.45, 172.24.9.1", "101.1.0.4:100", "101.1.0.4"),
            ("192.168.5.45, 172.24.9.1", "101.1.0.4:5670", "101.1.0.4"),
            // Right-most public entry wins.
            ("101.3.5.45, 21.45.9.1", "101.1.0.4:100", "21.45.9.1"),
            ("192.168.5.45, 210.45.9.1, 89.5.6.1", "101.1.0.4:100", "89.5.6.1"),
            ("89.5.6.1, 10.0.0.2, 127.0.0.1", "101.1.0.4:100", "89.5.6.1"),
        ] {
            assert_eq!(
                client_public_ip(&request(forwarded_for, remote_addr)),
                expected,
                "forwarded for {forwarded_for:?}, remote address {remote_addr:?}"
            );
        }
    }

    #[test]
    fn test_client_public_ip_fallbacks() {
        let mut req = RequestParts::new("  40.40.40.40:42123 ")
            .with_header("X-Real-IP", " 10.10.10.10  ")
            .with_header("X-Forwarded-For", " 172.17.40.152, 192.168.5.45");
        assert_eq!(client_public_ip(&req), "40.40.40.40");

        req = req.with_header("X-Real-IP", " 50.50.50.50  ");
        assert_eq!(client_public_ip(&req), "50.50.50.50");

        req.remove_header("X-Real-IP");
        req.remove_header("X-Forwarded-For");
        req.remote_addr = "  127.0.0.1:42123 ".to_string();
        assert_eq!(client_public_ip(&req), "");

        req.remote_addr = "10.1.1.1".to_string();
        assert_eq!(client_public_ip(&req), "");
    }

    #[test]
    fn test_scan_from_left() {
        let resolver = IpResolver::new().scan_forwarded_from_left(true);
        let req = request("192.168.5.45, 210.45.9.1, 89.5.6.1", "101.1.0.4:100");
        assert_eq!(resolver.client_public_ip(&req), "210.45.9.1");
        assert_eq!(IpResolver::new().client_public_ip(&req), "89.5.6.1");
    }

    #[test]
    fn test_custom_headers() {
        let resolver = IpResolver::new()
            .with_forwarded_header("Fly-Forwarded-For")
            .with_real_ip_header(String::from("CF-Connecting-IP"));
        let req = RequestParts::new("10.0.0.1:443")
            .with_header("X-Forwarded-For", "21.45.9.1")
            .with_header("cf-connecting-ip", "198.51.100.42");
        assert_eq!(resolver.client_ip(&req), "198.51.100.42");
        assert_eq!(resolver.client_public_ip(&req), "198.51.100.42");
        assert_eq!(client_ip(&req), "21.45.9.1");
    }

    #[test]
    fn test_parsed_variants() {
        let resolver = IpResolver::new();
        let req = request("unknown", "127.0.0.1:80");
        assert_eq!(resolver.client_ip_addr(&req), None);
        // Unparseable text is never local, so it is returned as-is.
        assert_eq!(resolver.client_public_ip(&req), "unknown");

        let req = request("10.0.0.1, 89.5.6.1", "127.0.0.1:80");
        assert_eq!(resolver.client_ip_addr(&req), Some("10.0.0.1".parse().unwrap()));
        assert_eq!(resolver.client_public_ip_addr(&req), Some("89.5.6.1".parse().unwrap()));
        assert_eq!(resolver.client_public_ip_addr(&RequestParts::new("127.0.0.1:80")), None);
    }

    #[test]
    fn test_header_map_without_remote_addr() {
        let mut headers = crate::request::HeaderMap::new();
        headers.insert("x-real-ip".to_string(), "192.168.1.100".to_string());
        assert_eq!(client_ip(&headers), "192.168.1.100");
        assert_eq!(client_public_ip(&headers), "");
    }

    #[test]
    fn test_repeated_calls_agree() {
        let req = request("192.168.5.45, 172.24.9.1, 89.5.6.1", "101.1.0.4:100");
        let snapshot = req.clone();
        for _ in 0..3 {
            assert_eq!(client_ip(&req), "192.168.5.45");
            assert_eq!(client_public_ip(&req), "89.5.6.1");
        }
        assert_eq!(req, snapshot);
    }
}
