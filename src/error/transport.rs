//! Transport-layer error types.

use thiserror::Error;

/// Encapsulated transport errors hiding implementation details.
///
/// Wraps every failure mode of the underlying transport without exposing
/// third-party types (like `reqwest::Error`) in the public API, so the
/// transport implementation can change without breaking callers.
///
/// All variants describe a failure that happened *before* a status line was
/// received; a transaction hitting one of these still completes, with the
/// error attached to its response and no status.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum TransportError {
    /// Connection could not be established (refused, reset, unreachable).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport gave up waiting.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// DNS resolution failed.
    ///
    /// The default transport cannot tell DNS failures apart from other
    /// connect failures and reports them as
    /// [`TransportError::ConnectionFailed`]; this variant is for custom
    /// [`Transport`](crate::Transport) implementations that can.
    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    /// TLS negotiation failed.
    ///
    /// Like [`TransportError::DnsResolution`], produced only by custom
    /// transports; the default transport folds TLS failures into
    /// [`TransportError::ConnectionFailed`].
    #[error("TLS error: {0}")]
    Tls(String),
}

impl TransportError {
    /// Stable class name of the failure, used in serialized error detail.
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self {
            TransportError::ConnectionFailed(_) => "connection_failed",
            TransportError::Timeout(_) => "timeout",
            TransportError::DnsResolution(_) => "dns_resolution",
            TransportError::Tls(_) => "tls",
        }
    }
}
