//! Client construction, defaults, and introspection.

use crate::body::{BodyHandler, JsonHandler};
use crate::compliance::ComplianceChecker;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::mock::MockRegistry;
use crate::request::merge_options;
use crate::response::HttpResponse;
use crate::transaction::Transaction;
use crate::transport::{ReqwestTransport, Transport};
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// The façade applications call to make HTTP transactions.
pub struct HttpClient {
    config: ClientConfig,
    service_name: Option<String>,
    default_headers: HeaderMap,
    default_options: Map<String, Value>,
    request_handler: Arc<dyn BodyHandler>,
    response_handler: Arc<dyn BodyHandler>,
    transport: Arc<dyn Transport>,
    mocks: Option<Arc<dyn MockRegistry>>,
    checker: Option<Arc<dyn ComplianceChecker>>,
    last_transaction: Option<Transaction>,
}

impl HttpClient {
    /// Creates a client with the default reqwest transport.
    ///
    /// # Errors
    ///
    /// Fails if the transport cannot be built (invalid proxy URL, TLS
    /// backend failure).
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Creates a client over an explicit transport. This is the seam tests
    /// use to substitute a stub for real network I/O.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            service_name: None,
            default_headers: HeaderMap::new(),
            default_options: Map::new(),
            request_handler: Arc::new(JsonHandler),
            response_handler: Arc::new(JsonHandler),
            transport,
            mocks: None,
            checker: None,
            last_transaction: None,
        }
    }

    /// Tags subsequent transactions with a logical service name for
    /// logging/metrics attribution. No validation; `None` clears it.
    pub fn set_service_name(&mut self, name: Option<String>) {
        self.service_name = name;
    }

    /// The current service name.
    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Replaces the default headers wholesale.
    pub fn set_headers(&mut self, headers: HeaderMap) {
        self.default_headers = headers;
    }

    /// Merges headers into the defaults: supplied keys replace, others are
    /// preserved. Keys are case-insensitive and folded to lowercase.
    pub fn push_header(&mut self, headers: HeaderMap) {
        for (key, value) in headers {
            if let Some(key) = key {
                self.default_headers.insert(key, value);
            }
        }
    }

    /// Replaces the default options wholesale.
    pub fn set_options(&mut self, options: Map<String, Value>) {
        self.default_options = options;
    }

    /// Merges options into the defaults. Keys listed in the config's
    /// `deep_merge_keys` with object values on both sides merge key-by-key;
    /// every other key replaces outright.
    pub fn push_option(&mut self, options: Map<String, Value>) {
        merge_options(
            &mut self.default_options,
            options,
            &self.config.deep_merge_keys,
        );
    }

    /// Installs a mock registry, consulted before every real call.
    pub fn set_mock_registry(&mut self, mocks: Arc<dyn MockRegistry>) {
        self.mocks = Some(mocks);
    }

    /// Installs the compliance checker run after every real transaction.
    pub fn set_compliance_checker(&mut self, checker: Arc<dyn ComplianceChecker>) {
        self.checker = Some(checker);
    }

    /// Sets the default handler used to encode request bodies.
    pub fn set_request_handler(&mut self, handler: Arc<dyn BodyHandler>) {
        self.request_handler = handler;
    }

    /// Sets the default handler attached to responses for decoding.
    pub fn set_response_handler(&mut self, handler: Arc<dyn BodyHandler>) {
        self.response_handler = handler;
    }

    /// The most recent real transaction on this client, `None` until the
    /// first non-mocked call. Mock hits leave this untouched.
    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.last_transaction.as_ref()
    }

    /// The response of the most recent real transaction.
    pub fn last_response(&self) -> Option<&HttpResponse> {
        self.last_transaction.as_ref().map(Transaction::response)
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves a path into an absolute URL.
    ///
    /// If per-call options carry a `"baseUrl"` string it is concatenated
    /// with the path verbatim. Otherwise the client's default base URL is
    /// used and trailing slashes are trimmed from the result.
    pub fn get_url(&self, path: &str, options: Option<&Map<String, Value>>) -> String {
        if let Some(base) = options
            .and_then(|opts| opts.get("baseUrl"))
            .and_then(Value::as_str)
        {
            return format!("{base}{path}");
        }
        let url = format!("{}{}", self.config.base_url, path);
        url.trim_end_matches('/').to_string()
    }

    pub(crate) fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub(crate) fn default_options(&self) -> &Map<String, Value> {
        &self.default_options
    }

    pub(crate) fn request_handler(&self) -> &Arc<dyn BodyHandler> {
        &self.request_handler
    }

    pub(crate) fn response_handler(&self) -> &Arc<dyn BodyHandler> {
        &self.response_handler
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub(crate) fn mocks(&self) -> Option<&Arc<dyn MockRegistry>> {
        self.mocks.as_ref()
    }

    pub(crate) fn checker(&self) -> Option<&Arc<dyn ComplianceChecker>> {
        self.checker.as_ref()
    }

    pub(crate) fn store_transaction(&mut self, transaction: Transaction) {
        self.last_transaction = Some(transaction);
    }
}
