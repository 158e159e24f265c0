//! # http-transact
//!
//! Client-side HTTP transaction pipeline: a façade for invoking remote
//! services without binding application code to a transport implementation.
//!
//! One logical call (method, URL, body, headers, options) is resolved into a
//! concrete [`HttpRequest`], executed (or intercepted by a mock), timed,
//! decoded lazily, and validated for protocol compliance before being handed
//! back as an [`HttpResponse`].
//!
//! # Features
//!
//! - **Pluggable body handlers**: JSON (default), form, raw, selected by
//!   explicit injection per client or per call
//! - **Mock interception**: a registry hit fully replaces network execution
//! - **Phase timing**: five-phase breakdown on every real transaction
//! - **Compliance checking**: injectable post-execution rule set with
//!   recoverable/fatal severities
//! - **Introspection**: the last transaction stays inspectable on the client
//!
//! # Example
//!
//! ```rust,no_run
//! use http_transact::{ClientConfig, HttpClient};
//!
//! # async fn example() -> http_transact::Result<()> {
//! let mut client = HttpClient::new(ClientConfig::with_base_url("https://api.example.com"))?;
//! client.set_service_name(Some("widgets".to_string()));
//!
//! let body = client.get("/widgets/7", None, None).await?;
//! println!("{body:?}");
//!
//! // Full response access, timing included:
//! if let Some(response) = client.last_response() {
//!     println!("took {:.3}s", response.time().total);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

// Re-exports of external dependencies that appear in the public API.
pub use reqwest::header::HeaderMap;
pub use reqwest::Method;
pub use serde_json;

pub mod body;
pub mod client;
pub mod compliance;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock;
pub mod request;
pub mod response;
pub mod timing;
pub mod transaction;
pub mod transport;

pub use body::{BodyHandler, FormHandler, JsonHandler, RawHandler};
pub use client::HttpClient;
pub use compliance::{ComplianceChecker, ComplianceRule, MaxStatusRule, RuleChecker, Violation};
pub use config::{ClientConfig, ProxyConfig};
pub use error::{
    ConfigValidationError, Error, ErrorKind, Result, Severity, TransportError, ValidationResult,
};
pub use mock::{MockRegistry, StaticMockRegistry};
pub use request::HttpRequest;
pub use response::HttpResponse;
pub use timing::ResponseTime;
pub use transaction::{Transaction, TransactionState};
pub use transport::{ReqwestTransport, Transport, TransportReply};
