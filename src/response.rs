//! The response value object.

use crate::body::BodyHandler;
use crate::error::{Error, Result};
use crate::timing::ResponseTime;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// The outcome of one logical HTTP call.
///
/// Echoes the request's method and URL for traceability. `status` stays
/// `None` until execution completes and remains `None` on transport failure,
/// in which case [`error`](Self::error) is populated instead.
///
/// Decoding is lazy: the raw body is kept as bytes and only turned into a
/// logical value when [`decoded_body`](Self::decoded_body) is called, through
/// a handler the client attaches after execution. Asking for a decoded body
/// with no handler attached is a caller bug and fails immediately.
#[derive(Clone)]
pub struct HttpResponse {
    method: Method,
    url: String,
    status: Option<u16>,
    headers: HeaderMap,
    options: Map<String, Value>,
    body: Option<Vec<u8>>,
    time: ResponseTime,
    handler: Option<Arc<dyn BodyHandler>>,
    error: Option<Error>,
}

impl HttpResponse {
    /// Creates an empty, not-yet-executed response for the given call.
    pub fn pending(method: Method, url: impl Into<String>, options: Map<String, Value>) -> Self {
        Self {
            method,
            url: url.into(),
            status: None,
            headers: HeaderMap::new(),
            options,
            body: None,
            time: ResponseTime::zero(),
            handler: None,
            error: None,
        }
    }

    /// Creates a canned response for a mock registry: given status and raw
    /// body, zeroed timing, JSON decode handler attached.
    pub fn mock(
        method: Method,
        url: impl Into<String>,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            status: Some(status),
            headers: HeaderMap::new(),
            options: Map::new(),
            body: Some(body.into()),
            time: ResponseTime::zero(),
            handler: Some(Arc::new(crate::body::JsonHandler)),
            error: None,
        }
    }

    /// The request's method, echoed.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request's resolved URL, echoed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Numeric status, absent until execution completes (and absent forever
    /// on transport failure).
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Options the call was made with.
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    /// Raw, undecoded body bytes.
    pub fn raw_body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Phase timing breakdown.
    pub fn time(&self) -> &ResponseTime {
        &self.time
    }

    /// The error attached by the transport or the compliance checker, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Attaches (or replaces) the error on this response.
    pub fn attach_error(&mut self, error: Error) {
        self.error = Some(error);
    }

    /// Attaches the handler used by [`decoded_body`](Self::decoded_body).
    /// The client does this after execution so decoding policy stays a
    /// call-site decision.
    pub fn attach_handler(&mut self, handler: Arc<dyn BodyHandler>) {
        self.handler = Some(handler);
    }

    /// The attached decode handler, if any.
    pub fn handler(&self) -> Option<&Arc<dyn BodyHandler>> {
        self.handler.as_ref()
    }

    /// Decodes the raw body through the attached handler.
    ///
    /// An absent or empty body decodes to `Ok(None)`. Calling this without a
    /// handler attached is a programming error and returns a decoding error
    /// immediately.
    pub fn decoded_body(&self) -> Result<Option<Value>> {
        let handler = self
            .handler
            .as_ref()
            .ok_or_else(|| Error::decoding("no body handler attached to response"))?;
        match &self.body {
            Some(raw) => handler.decode(raw),
            None => Ok(None),
        }
    }

    /// Fills in the execution outcome. Crate-internal: only a
    /// [`Transaction`](crate::Transaction) completes a response.
    pub(crate) fn complete(
        &mut self,
        status: u16,
        headers: HeaderMap,
        body: Vec<u8>,
        time: ResponseTime,
    ) {
        self.status = Some(status);
        self.headers = headers;
        self.body = Some(body);
        self.time = time;
        self.error = None;
    }

    /// Records a transport failure. Status stays absent; whatever timing was
    /// measured up to the failure is kept.
    pub(crate) fn fail(&mut self, error: Error, time: ResponseTime) {
        self.status = None;
        self.time = time;
        self.error = Some(error);
    }

    /// Serializes into the stable snapshot shape:
    /// `{status, headers, time: {5 phases}, body, error|null}`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "status": self.status,
            "headers": headers_to_value(&self.headers),
            "time": self.time.to_value(),
            "body": self.body.as_ref().map(|b| String::from_utf8_lossy(b).into_owned()),
            "error": self.error.as_ref().map(Error::to_value),
        })
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("time", &self.time)
            .field("handler", &self.handler.as_ref().map(|h| h.name()))
            .field("error", &self.error)
            .finish()
    }
}

/// Flattens a `HeaderMap` into a JSON object with lowercase keys.
pub(crate) fn headers_to_value(headers: &HeaderMap) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in headers {
        let value_str = value.to_str().unwrap_or("").to_string();
        map.insert(key.as_str().to_string(), Value::String(value_str));
    }
    Value::Object(map)
}
