//! The orchestration entry point and convenience verbs.

use crate::body::{self, BodyHandler};
use crate::error::{Error, Result};
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::transaction::Transaction;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::builder::HttpClient;

/// The mock-vs-execute decision, made explicit so the bypass of timing and
/// compliance checking is a visible branch rather than an early return.
enum Dispatch {
    /// A mock matched: this canned response replaces execution entirely.
    Intercepted(HttpResponse),
    /// No mock: this transaction will run against the transport.
    Execute(Transaction),
}

impl HttpClient {
    /// Executes one logical HTTP call and returns its response.
    ///
    /// Resolves the URL, consults the mock registry (a hit short-circuits
    /// everything else), builds the request from per-call overrides or
    /// client defaults, runs the transaction, attaches the decode handler,
    /// and runs the compliance checker.
    ///
    /// # Errors
    ///
    /// Returns an error for encoding failures, unusable parameters, and
    /// fatal compliance violations. Transport failures and recoverable
    /// compliance violations do not fail the call; they are attached to the
    /// returned response and introspectable via `response.error()`.
    #[instrument(
        name = "client_request",
        skip(self, body, headers, options),
        fields(
            method = %method,
            path = %path,
            service = self.service_name().unwrap_or("-"),
        )
    )]
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: Option<HeaderMap>,
        options: Option<Map<String, Value>>,
    ) -> Result<HttpResponse> {
        let dispatch = self.dispatch(method, path, body, headers, options)?;

        let mut txn = match dispatch {
            Dispatch::Intercepted(response) => {
                debug!(url = %response.url(), "Mock registry hit, bypassing transport");
                return Ok(response);
            }
            Dispatch::Execute(txn) => txn,
        };

        let run_result = txn.run(self.transport().as_ref()).await;

        let decode_handler =
            self.resolve_handler("responseHandler", txn.request().options(), self.response_handler())?;
        txn.response_mut().attach_handler(decode_handler);

        let check_result = if run_result.is_ok() {
            match self.checker() {
                Some(checker) => checker.check_compliance(&mut txn),
                None => Ok(()),
            }
        } else {
            Ok(())
        };

        let response = txn.response().clone();
        self.store_transaction(txn);

        run_result?;
        check_result?;

        Ok(response)
    }

    /// Executes a GET request and decodes the body.
    ///
    /// A transport failure, compliance violation, or decoding failure is
    /// returned as an error, never swallowed.
    pub async fn get(
        &mut self,
        path: &str,
        headers: Option<HeaderMap>,
        options: Option<Map<String, Value>>,
    ) -> Result<Option<Value>> {
        let response = self.request(Method::GET, path, None, headers, options).await?;
        decoded(&response)
    }

    /// Executes a POST request and decodes the body.
    pub async fn post(
        &mut self,
        path: &str,
        body: Option<Value>,
        headers: Option<HeaderMap>,
        options: Option<Map<String, Value>>,
    ) -> Result<Option<Value>> {
        let response = self.request(Method::POST, path, body, headers, options).await?;
        decoded(&response)
    }

    /// Executes a PUT request and decodes the body.
    pub async fn put(
        &mut self,
        path: &str,
        body: Option<Value>,
        headers: Option<HeaderMap>,
        options: Option<Map<String, Value>>,
    ) -> Result<Option<Value>> {
        let response = self.request(Method::PUT, path, body, headers, options).await?;
        decoded(&response)
    }

    /// Executes a DELETE request and decodes the body.
    pub async fn delete(
        &mut self,
        path: &str,
        headers: Option<HeaderMap>,
        options: Option<Map<String, Value>>,
    ) -> Result<Option<Value>> {
        let response = self
            .request(Method::DELETE, path, None, headers, options)
            .await?;
        decoded(&response)
    }

    /// Resolves the URL, checks the mock registry, and builds either an
    /// intercepted response or a ready-to-run transaction.
    fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: Option<HeaderMap>,
        options: Option<Map<String, Value>>,
    ) -> Result<Dispatch> {
        let url = self.get_url(path, options.as_ref());

        if let Some(mocks) = self.mocks() {
            if let Some(response) = mocks.find(&method, &url) {
                return Ok(Dispatch::Intercepted(response));
            }
        }

        let headers = headers.unwrap_or_else(|| self.default_headers().clone());
        let options = options.unwrap_or_else(|| self.default_options().clone());
        let encode_handler =
            self.resolve_handler("requestHandler", &options, self.request_handler())?;

        let request = HttpRequest::new(method, url, headers, options, body, encode_handler);
        let txn = Transaction::new(request, self.service_name().map(str::to_owned));

        Ok(Dispatch::Execute(txn))
    }

    /// Resolves a body handler: per-call option override, else client
    /// default-options override, else the supplied client default.
    fn resolve_handler(
        &self,
        option_key: &str,
        options: &Map<String, Value>,
        default: &Arc<dyn BodyHandler>,
    ) -> Result<Arc<dyn BodyHandler>> {
        let name = options
            .get(option_key)
            .or_else(|| self.default_options().get(option_key))
            .and_then(Value::as_str);

        match name {
            Some(name) => body::handler_for(name)
                .ok_or_else(|| Error::invalid_request(format!("unknown body handler '{name}'"))),
            None => Ok(default.clone()),
        }
    }
}

/// Decodes a response for the convenience verbs, surfacing any attached
/// error instead of silently returning partial data.
fn decoded(response: &HttpResponse) -> Result<Option<Value>> {
    if let Some(error) = response.error() {
        return Err(error.clone());
    }
    response.decoded_body()
}
