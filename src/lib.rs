/* src/lib.rs */
//! # Client IP Resolver
//!
//! Resolve the originating client IP address of an HTTP request from the
//! `X-Forwarded-For` and `X-Real-IP` headers and the remote socket address,
//! telling local/private addresses apart from public ones.
//!
//! ## Features
//!
//! - Local address check: loopback, `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16`
//! - [`client_ip`]: left-most `X-Forwarded-For` entry, then `X-Real-IP`, then the remote host
//! - [`client_public_ip`]: first public address walking `X-Forwarded-For` from the right
//! - Malformed or missing input never errors; it resolves to an empty string or `false`
//! - Optional Axum middleware and extractor integration via the `axum` feature
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use clientip::{client_ip, client_public_ip, is_local_addr, RequestParts};
//!
//! let req = RequestParts::new("101.1.0.4:100")
//!     .with_header("X-Forwarded-For", "192.168.5.45, 172.24.9.1, 89.5.6.1");
//!
//! assert_eq!(client_ip(&req), "192.168.5.45");
//! assert_eq!(client_public_ip(&req), "89.5.6.1");
//! assert!(is_local_addr("172.24.9.1"));
//! ```

pub mod classify;
pub mod error;
pub mod request;
pub mod resolver;

#[cfg(feature = "axum")]
pub mod middleware;

pub use classify::{LocalAddr, is_local_addr, is_local_ip};
pub use error::{AddrError, Result};
pub use request::{HeaderMap, RequestParts, RequestView};
pub use resolver::{
    IpResolver, X_FORWARDED_FOR, X_REAL_IP, client_ip, client_public_ip, forwarded_for,
    remote_ip, split_host_port,
};

#[cfg(feature = "axum")]
pub use middleware::{ClientIp, ClientIpLayer, ClientIpService, Resolution};

/// Re-export commonly used types
pub use std::net::IpAddr;
