//! Body handlers: pluggable encode/decode capability per content type.
//!
//! A [`BodyHandler`] turns a logical `serde_json::Value` into wire bytes and
//! back. Handlers are selected by explicit injection at request/response
//! construction time; the pipeline never sniffs content to pick one.

use crate::error::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

/// Encode/decode capability for a request or response payload.
///
/// Implementations must be symmetric where the content type allows it: for
/// the JSON handler, `decode(encode(v))` reproduces `v` exactly for any
/// JSON-representable value. Decoding an empty body yields `Ok(None)`,
/// never an error.
pub trait BodyHandler: Send + Sync {
    /// Stable name used for per-call handler overrides in options.
    fn name(&self) -> &'static str;

    /// Content type advertised when the request does not set one itself.
    fn content_type(&self) -> &'static str;

    /// Encodes a logical body into wire bytes.
    fn encode(&self, body: &Value) -> Result<Vec<u8>>;

    /// Decodes wire bytes into a logical body. Empty input is `None`.
    fn decode(&self, raw: &[u8]) -> Result<Option<Value>>;
}

/// JSON body handler, the pipeline default.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonHandler;

impl BodyHandler for JsonHandler {
    fn name(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, body: &Value) -> Result<Vec<u8>> {
        serde_json::to_vec(body).map_err(|e| Error::encoding(format!("JSON encode failed: {e}")))
    }

    fn decode(&self, raw: &[u8]) -> Result<Option<Value>> {
        if raw.is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| Error::decoding(format!("JSON decode failed: {e}")))?;
        // A literal `null` body is indistinguishable from an absent one.
        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }
}

/// Form-urlencoded body handler.
///
/// Encodes flat objects of scalar values; nested structures are an encoding
/// error since the format cannot represent them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormHandler;

impl BodyHandler for FormHandler {
    fn name(&self) -> &'static str {
        "form"
    }

    fn content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded"
    }

    fn encode(&self, body: &Value) -> Result<Vec<u8>> {
        let map = body
            .as_object()
            .ok_or_else(|| Error::encoding("form body must be an object"))?;

        let mut pairs: Vec<(&str, String)> = Vec::with_capacity(map.len());
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                _ => {
                    return Err(Error::encoding(format!(
                        "form field '{key}' is not a scalar"
                    )));
                }
            };
            pairs.push((key.as_str(), text));
        }

        serde_urlencoded::to_string(&pairs)
            .map(String::into_bytes)
            .map_err(|e| Error::encoding(format!("form encode failed: {e}")))
    }

    fn decode(&self, raw: &[u8]) -> Result<Option<Value>> {
        if raw.is_empty() {
            return Ok(None);
        }
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(raw)
            .map_err(|e| Error::decoding(format!("form decode failed: {e}")))?;
        let mut map = serde_json::Map::with_capacity(pairs.len());
        for (key, value) in pairs {
            map.insert(key, Value::String(value));
        }
        Ok(Some(Value::Object(map)))
    }
}

/// Raw passthrough handler: string in, string out, no transformation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawHandler;

impl BodyHandler for RawHandler {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn content_type(&self) -> &'static str {
        "application/octet-stream"
    }

    fn encode(&self, body: &Value) -> Result<Vec<u8>> {
        match body {
            Value::String(s) => Ok(s.clone().into_bytes()),
            _ => Err(Error::encoding("raw body must be a string")),
        }
    }

    fn decode(&self, raw: &[u8]) -> Result<Option<Value>> {
        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(Value::String(
            String::from_utf8_lossy(raw).into_owned(),
        )))
    }
}

/// Resolves a handler by its stable name ("json", "form", "raw").
///
/// Used for per-call handler overrides supplied through options.
pub fn handler_for(name: &str) -> Option<Arc<dyn BodyHandler>> {
    match name {
        "json" => Some(Arc::new(JsonHandler)),
        "form" => Some(Arc::new(FormHandler)),
        "raw" => Some(Arc::new(RawHandler)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip() {
        let handler = JsonHandler;
        let values = [
            json!({"a": 1, "b": [true, null, "x"], "c": {"nested": 2.5}}),
            json!([1, 2, 3]),
            json!("plain string"),
            json!(42),
            json!(false),
        ];
        for value in values {
            let encoded = handler.encode(&value).unwrap();
            let decoded = handler.decode(&encoded).unwrap();
            assert_eq!(decoded, Some(value));
        }
    }

    #[test]
    fn test_json_empty_and_null_decode_to_none() {
        let handler = JsonHandler;
        assert_eq!(handler.decode(b"").unwrap(), None);
        assert_eq!(handler.decode(b"null").unwrap(), None);
    }

    #[test]
    fn test_json_decode_garbage_fails() {
        let err = JsonHandler.decode(b"{not json").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Decoding);
    }

    #[test]
    fn test_form_encode_flat_object() {
        let handler = FormHandler;
        let encoded = handler
            .encode(&json!({"a": "x y", "n": 3, "flag": true}))
            .unwrap();
        let text = String::from_utf8(encoded).unwrap();
        assert!(text.contains("a=x+y"));
        assert!(text.contains("n=3"));
        assert!(text.contains("flag=true"));
    }

    #[test]
    fn test_form_rejects_nested_values() {
        let err = FormHandler.encode(&json!({"a": {"b": 1}})).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Encoding);

        let err = FormHandler.encode(&json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Encoding);
    }

    #[test]
    fn test_form_decode() {
        let decoded = FormHandler.decode(b"a=1&b=two+words").unwrap().unwrap();
        assert_eq!(decoded, json!({"a": "1", "b": "two words"}));
        assert_eq!(FormHandler.decode(b"").unwrap(), None);
    }

    #[test]
    fn test_raw_passthrough() {
        let handler = RawHandler;
        let encoded = handler.encode(&json!("payload")).unwrap();
        assert_eq!(encoded, b"payload");
        assert_eq!(handler.decode(b"payload").unwrap(), Some(json!("payload")));
        assert_eq!(handler.decode(b"").unwrap(), None);
        assert!(handler.encode(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_handler_for_names() {
        assert_eq!(handler_for("json").unwrap().name(), "json");
        assert_eq!(handler_for("form").unwrap().name(), "form");
        assert_eq!(handler_for("raw").unwrap().name(), "raw");
        assert!(handler_for("xml").is_none());
    }
}
