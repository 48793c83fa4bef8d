/* src/request.rs */

use std::borrow::Cow;
use std::collections::HashMap;

/// Type alias for header maps. Keys are header names, matched case-insensitively.
pub type HeaderMap = HashMap<String, String>;

/// The parts of an HTTP request the resolver reads.
pub trait RequestView {
    /// First value of the named header, looked up case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Remote socket address in `host:port` form (IPv6 hosts may be bracketed).
    fn remote_addr(&self) -> Cow<'_, str>;
}

/// Owned request view built from a header map and a remote address string.
///
/// # Examples
///
/// ```rust
/// use clientip::{RequestParts, RequestView};
///
/// let req = RequestParts::new("101.1.0.4:100").with_header("X-Real-IP", "89.5.6.1");
/// assert_eq!(req.header("x-real-ip"), Some("89.5.6.1"));
/// assert_eq!(req.remote_addr(), "101.1.0.4:100");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParts {
    pub headers: HeaderMap,
    pub remote_addr: String,
}

impl RequestParts {
    pub fn new(remote_addr: impl Into<String>) -> Self {
        Self {
            headers: HeaderMap::new(),
            remote_addr: remote_addr.into(),
        }
    }

    /// Set a header, replacing any existing value stored under the same name
    /// in a different case.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.remove_header(&name);
        self.headers.insert(name, value.into());
        self
    }

    /// Remove a header regardless of the case it was stored with.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
    }
}

impl RequestView for RequestParts {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.header(name)
    }

    fn remote_addr(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.remote_addr)
    }
}

/// A bare header map has no remote address.
impl RequestView for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.get(name) {
            return Some(value.as_str());
        }
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn remote_addr(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

impl<T: RequestView + ?Sized> RequestView for &T {
    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }

    fn remote_addr(&self) -> Cow<'_, str> {
        (**self).remote_addr()
    }
}

#[cfg(feature = "axum")]
mod http_impls {
    use super::RequestView;
    use axum::{
        extract::ConnectInfo,
        http::{Extensions, HeaderMap, Request, request::Parts},
    };
    use std::{borrow::Cow, net::SocketAddr};

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|value| value.to_str().ok())
    }

    fn remote_addr(extensions: &Extensions) -> Cow<'_, str> {
        match extensions.get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => Cow::Owned(addr.to_string()),
            None => Cow::Borrowed(""),
        }
    }

    impl<B> RequestView for Request<B> {
        fn header(&self, name: &str) -> Option<&str> {
            header(self.headers(), name)
        }

        fn remote_addr(&self) -> Cow<'_, str> {
            remote_addr(self.extensions())
        }
    }

    impl RequestView for Parts {
        fn header(&self, name: &str) -> Option<&str> {
            header(&self.headers, name)
        }

        fn remote_addr(&self) -> Cow<'_, str> {
            remote_addr(&self.extensions)
        }
    }
}
