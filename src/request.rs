//! The outgoing request value object.

use crate::body::BodyHandler;
use crate::error::Result;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// One logical HTTP request, fully resolved and ready to execute.
///
/// Built once per call by the [`HttpClient`](crate::HttpClient) and then
/// handed to a [`Transaction`](crate::Transaction), which owns it
/// exclusively. There are no mutators: everything is fixed at construction.
///
/// Header keys are case-insensitive and normalized to lowercase by
/// `HeaderMap`; the last write for a key wins.
pub struct HttpRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    options: Map<String, Value>,
    body: Option<Value>,
    handler: Arc<dyn BodyHandler>,
}

impl HttpRequest {
    /// Builds a request. `url` must already be absolute; resolution against
    /// a base URL is the client's job, not this type's.
    pub fn new(
        method: Method,
        url: impl Into<String>,
        headers: HeaderMap,
        options: Map<String, Value>,
        body: Option<Value>,
        handler: Arc<dyn BodyHandler>,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            options,
            body,
            handler,
        }
    }

    /// The HTTP method. Open set: extension methods pass through untouched.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The resolved absolute URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers, keys lowercased.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Free-form per-call options (transport tuning, overrides).
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    /// The logical, not-yet-encoded body.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// The handler that encodes this request's body.
    pub fn handler(&self) -> &Arc<dyn BodyHandler> {
        &self.handler
    }

    /// Encodes the body through the attached handler. `None` body encodes
    /// to `None`: no bytes are put on the wire.
    pub fn encoded_body(&self) -> Result<Option<Vec<u8>>> {
        match &self.body {
            Some(body) => Ok(Some(self.handler.encode(body)?)),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("options", &self.options)
            .field("body", &self.body)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Merges `overlay` into `base` in place.
///
/// Keys listed in `deep_merge_keys` whose values are objects on both sides
/// are merged key-by-key; every other key replaces outright. This is the
/// single merge policy behind `push_option`.
pub(crate) fn merge_options(
    base: &mut Map<String, Value>,
    overlay: Map<String, Value>,
    deep_merge_keys: &[String],
) {
    for (key, value) in overlay {
        let deep = deep_merge_keys.iter().any(|k| k == &key);
        match (deep, base.get_mut(&key), value) {
            (true, Some(Value::Object(existing)), Value::Object(incoming)) => {
                for (sub_key, sub_value) in incoming {
                    existing.insert(sub_key, sub_value);
                }
            }
            (_, _, value) => {
                base.insert(key, value);
            }
        }
    }
}
