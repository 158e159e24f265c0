//! The transport collaborator seam.
//!
//! The pipeline depends only on the [`Transport`] trait: given a built
//! request and its encoded body, produce status/headers/body/phase timings or
//! a transport error. [`ReqwestTransport`] is the default implementation;
//! tests substitute stubs.

use crate::config::ClientConfig;
use crate::error::{Error, Result, TransportError};
use crate::request::HttpRequest;
use crate::timing::ResponseTime;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use std::time::Instant;
use tracing::{debug, error, warn};

/// What a transport hands back for one executed request.
#[derive(Debug)]
pub struct TransportReply {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Phase timings the transport was able to observe. Unobserved phases
    /// stay zero; the transaction fills in the total itself.
    pub time: ResponseTime,
}

/// One-shot request execution against some wire-level implementation.
///
/// Implementations perform exactly one attempt; retries, if wanted, belong
/// to a wrapping transport, never to the pipeline. Timeouts and cancellation
/// are surfaced as [`TransportError`] values.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes the request, returning the reply or a transport error.
    ///
    /// `body` is the already-encoded wire body, if the request has one.
    async fn send(&self, request: &HttpRequest, body: Option<&[u8]>) -> Result<TransportReply>;
}

/// Default transport on `reqwest`, with connection pooling, gzip, optional
/// proxy, and request/response size limits.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    max_request_size: usize,
    max_response_size: usize,
}

impl ReqwestTransport {
    /// Builds the transport from client configuration.
    ///
    /// # Errors
    ///
    /// Fails if the proxy URL is invalid or the underlying client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .gzip(true)
            .user_agent(&config.user_agent);

        if let Some(proxy_config) = &config.proxy {
            let mut proxy = reqwest::Proxy::all(&proxy_config.url)
                .map_err(|e| Error::invalid_request(format!("Invalid proxy URL: {e}")))?;
            if let (Some(username), Some(password)) =
                (&proxy_config.username, &proxy_config.password)
            {
                proxy = proxy.basic_auth(username, password);
            }
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::invalid_request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_request_size: config.max_request_size,
            max_response_size: config.max_response_size,
        })
    }

    async fn read_body_with_limit(&self, response: reqwest::Response, url: &str) -> Result<Vec<u8>> {
        use futures_util::StreamExt;

        let max_size = self.max_response_size;

        if let Some(content_length) = response.content_length() {
            if content_length > max_size as u64 {
                warn!(
                    url = %url,
                    content_length = content_length,
                    max_size = max_size,
                    "Response exceeds size limit (Content-Length check)"
                );
                return Err(Error::invalid_request(format!(
                    "Response size {content_length} bytes exceeds limit {max_size} bytes"
                )));
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let initial_capacity = response
            .content_length()
            .map_or(64 * 1024, |len| std::cmp::min(len as usize, max_size));

        let mut stream = response.bytes_stream();
        let mut body = Vec::with_capacity(initial_capacity);
        let mut accumulated: usize = 0;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| {
                error!(error = %e, "Failed to read response chunk");
                Error::Transport(Box::new(TransportError::ConnectionFailed(format!(
                    "Failed to read response chunk: {e}"
                ))))
            })?;

            accumulated = accumulated.saturating_add(chunk.len());
            if accumulated > max_size {
                warn!(
                    url = %url,
                    accumulated = accumulated,
                    max_size = max_size,
                    "Response exceeds size limit during streaming"
                );
                return Err(Error::invalid_request(format!(
                    "Response size {accumulated} bytes exceeds limit {max_size} bytes (streaming)"
                )));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest, body: Option<&[u8]>) -> Result<TransportReply> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url())
            .headers(request.headers().clone());

        if let Some(body) = body {
            if body.len() > self.max_request_size {
                return Err(Error::invalid_request(format!(
                    "Request body {} bytes exceeds limit {} bytes",
                    body.len(),
                    self.max_request_size
                )));
            }
            if !request.headers().contains_key(CONTENT_TYPE) {
                builder = builder.header(CONTENT_TYPE, request.handler().content_type());
            }
            builder = builder.body(body.to_vec());
        }

        let started = Instant::now();

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let first_byte = started.elapsed();

        let status = response.status().as_u16();
        let headers = response.headers().clone();

        debug!(
            status = status,
            url = %request.url(),
            first_byte_ms = %first_byte.as_millis(),
            "HTTP response head received"
        );

        let body = self.read_body_with_limit(response, request.url()).await?;
        let total = started.elapsed();

        Ok(TransportReply {
            status,
            headers,
            body,
            time: ResponseTime {
                total: total.as_secs_f64(),
                connect: 0.0,
                handshake: 0.0,
                first_byte: first_byte.as_secs_f64(),
                transfer: (total - first_byte).as_secs_f64(),
            },
        })
    }
}

// reqwest does not expose DNS or TLS failure detail, so connect errors all
// map to ConnectionFailed; the finer TransportError variants are left to
// custom transports.
fn map_reqwest_error(e: reqwest::Error) -> Error {
    let detail = if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::ConnectionFailed(format!("Request failed: {e}"))
    };
    error!(error = %e, class = detail.class(), "HTTP request send failed");
    Error::Transport(Box::new(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::JsonHandler;
    use crate::error::ErrorKind;
    use reqwest::Method;
    use serde_json::Map;
    use std::sync::Arc;

    fn post_request() -> HttpRequest {
        HttpRequest::new(
            Method::POST,
            "https://a/p",
            HeaderMap::new(),
            Map::new(),
            None,
            Arc::new(JsonHandler),
        )
    }

    #[test]
    fn test_transport_builds_from_default_config() {
        let transport = ReqwestTransport::new(&ClientConfig::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn test_transport_builds_with_proxy() {
        let config = ClientConfig {
            proxy: Some(crate::config::ProxyConfig::new("http://localhost:8080")),
            ..Default::default()
        };
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn test_transport_rejects_bad_proxy_url() {
        let config = ClientConfig {
            proxy: Some(crate::config::ProxyConfig::new("not a url")),
            ..Default::default()
        };
        assert!(ReqwestTransport::new(&config).is_err());
    }

    // The request-size check runs before anything touches the wire, so no
    // network is involved here.
    #[tokio::test]
    async fn test_oversized_request_body_rejected_before_send() {
        let config = ClientConfig {
            max_request_size: 8,
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();

        let err = transport
            .send(&post_request(), Some(&[0u8; 9]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_response_over_limit_rejected_on_length_precheck() {
        let config = ClientConfig {
            max_response_size: 4,
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();

        let reply = http::Response::new("0123456789".to_string());
        let err = transport
            .read_body_with_limit(reqwest::Response::from(reply), "https://a/p")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_response_within_limit_reads_fully() {
        let config = ClientConfig {
            max_response_size: 16,
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();

        let reply = http::Response::new("0123".to_string());
        let body = transport
            .read_body_with_limit(reqwest::Response::from(reply), "https://a/p")
            .await
            .unwrap();
        assert_eq!(body, b"0123");
    }
}
