/* src/error.rs */

use thiserror::Error;

/// Result type alias for operations that may fail with `AddrError`.
pub type Result<T> = std::result::Result<T, AddrError>;

/// Reasons a remote socket address string cannot be split into host and port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddrError {
    /// No `:port` component, e.g. a bare `"50.50.50.50"`.
    #[error("missing port in address: {0}")]
    MissingPort(String),

    /// Host part is empty, e.g. `":100"`.
    #[error("missing host in address: {0}")]
    MissingHost(String),

    /// Unbracketed host with more than one colon, e.g. `"::1:80"`.
    #[error("too many colons in address: {0}")]
    TooManyColons(String),

    /// Opening `[` without a matching `]`.
    #[error("missing ']' in address: {0}")]
    MissingBracket(String),

    /// Stray `[` or `]` outside a bracketed host.
    #[error("unexpected bracket in address: {0}")]
    UnexpectedBracket(String),
}
