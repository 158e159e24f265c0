//! Error handling for the transaction pipeline.
//!
//! Every failure in the pipeline is represented by [`Error`], a strongly-typed
//! `thiserror` enum. The variants map onto the four failure families of the
//! call pipeline:
//!
//! ```text
//! Error
//! ├── Transport   - connection/timeout/DNS/TLS failure (via TransportError)
//! ├── Compliance  - post-execution contract violation, with severity
//! ├── Encoding    - body handler could not encode the logical body
//! ├── Decoding    - body handler could not decode the raw body
//! └── InvalidRequest - the caller supplied something unusable
//! ```
//!
//! Transport and recoverable compliance errors are *attached* to the
//! [`HttpResponse`](crate::HttpResponse) rather than returned, so callers can
//! inspect them via `response.error()`. Encoding/decoding errors and fatal
//! compliance violations are returned to the immediate caller. Nothing is
//! silently dropped.
//!
//! [`Error::to_value`] produces a stable JSON shape (`{kind, message,
//! detail}`) intended for structured logging and snapshot comparison.

mod config;
mod transport;

use std::borrow::Cow;
use thiserror::Error;

pub use config::{ConfigValidationError, ValidationResult};
pub use transport::TransportError;

/// Result type alias for all pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], stable for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The transport layer failed before a status line was received.
    Transport,
    /// The compliance checker flagged the completed transaction.
    Compliance,
    /// The body handler could not encode the outgoing body.
    Encoding,
    /// The body handler could not decode the incoming body.
    Decoding,
    /// The request itself was unusable (bad parameters, oversized body).
    InvalidRequest,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Compliance => write!(f, "compliance"),
            ErrorKind::Encoding => write!(f, "encoding"),
            ErrorKind::Decoding => write!(f, "decoding"),
            ErrorKind::InvalidRequest => write!(f, "invalid_request"),
        }
    }
}

/// Severity of a compliance violation.
///
/// Decides whether a flagged transaction is still handed back normally or
/// whether `request()` itself fails. The pipeline default is
/// [`Severity::Recoverable`]: the error is attached to the response and the
/// call succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Attach the error to the response; the call still returns `Ok`.
    Recoverable,
    /// Attach the error to the response and fail the call.
    Fatal,
}

/// The primary error type for the `http-transact` pipeline.
///
/// Design constraints follow the usual rules for a library error type:
/// - `#[non_exhaustive]` for forward compatibility
/// - large variants boxed to keep the enum small
/// - `Cow<'static, str>` so static messages allocate nothing
/// - `Clone + Send + Sync` so an error can live inside a cached response
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Transport-layer failure. The transaction still completes; the error is
    /// attached to its response and the status stays absent.
    #[error("Transport error: {0}")]
    Transport(Box<TransportError>),

    /// Compliance violation flagged after execution.
    #[error("Compliance violation: {message}")]
    Compliance {
        /// Human-readable description of the violated rule.
        message: Cow<'static, str>,
        /// Whether the violation fails the call or only annotates it.
        severity: Severity,
    },

    /// Body handler failed to encode the logical body.
    #[error("Encoding failed: {0}")]
    Encoding(Cow<'static, str>),

    /// Body handler failed to decode the raw body (or none was attached).
    #[error("Decoding failed: {0}")]
    Decoding(Cow<'static, str>),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(Cow<'static, str>),
}

impl Error {
    /// Creates a transport error from a message (connection-level failure).
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(Box::new(TransportError::ConnectionFailed(msg.into())))
    }

    /// Creates a transport timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Transport(Box::new(TransportError::Timeout(msg.into())))
    }

    /// Creates a recoverable compliance violation.
    pub fn compliance(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Compliance {
            message: msg.into(),
            severity: Severity::Recoverable,
        }
    }

    /// Creates a compliance violation with an explicit severity.
    pub fn compliance_with_severity(
        msg: impl Into<Cow<'static, str>>,
        severity: Severity,
    ) -> Self {
        Self::Compliance {
            message: msg.into(),
            severity,
        }
    }

    /// Creates an encoding error.
    pub fn encoding(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates a decoding error.
    pub fn decoding(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Decoding(msg.into())
    }

    /// Creates an invalid request error.
    pub fn invalid_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Returns the stable kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Transport,
            Error::Compliance { .. } => ErrorKind::Compliance,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::Decoding(_) => ErrorKind::Decoding,
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Returns the severity if this is a compliance violation.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Error::Compliance { severity, .. } => Some(*severity),
            _ => None,
        }
    }

    /// Returns the transport detail if this is a transport error.
    #[must_use]
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Error::Transport(te) => Some(te.as_ref()),
            _ => None,
        }
    }

    /// Serializes this error into its stable logging shape.
    ///
    /// The shape is `{"kind": ..., "message": ..., "detail": ...}` where
    /// `detail` carries variant-specific structure (transport failure class,
    /// compliance severity) or `null`.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        let detail = match self {
            Error::Transport(te) => serde_json::json!({ "failure": te.class() }),
            Error::Compliance { severity, .. } => serde_json::json!({ "severity": severity }),
            _ => serde_json::Value::Null,
        };
        serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
            "detail": detail,
        })
    }
}
