//! Client configuration.

use crate::error::{ConfigValidationError, ValidationResult};
use std::time::Duration;

/// Proxy configuration for the default transport.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Proxy URL (http/https/socks5).
    pub url: String,
    /// Optional basic-auth username.
    pub username: Option<String>,
    /// Optional basic-auth password.
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Creates a proxy configuration without authentication.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }
}

/// Configuration for an [`HttpClient`](crate::HttpClient) and its default
/// transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Default base URL prepended to request paths.
    pub base_url: String,
    /// Total request timeout.
    pub timeout: Duration,
    /// TCP connection timeout.
    pub connect_timeout: Duration,
    /// Default User-Agent header value.
    pub user_agent: String,
    /// Optional proxy configuration.
    pub proxy: Option<ProxyConfig>,
    /// Maximum number of idle connections per host kept by the transport.
    pub pool_max_idle_per_host: usize,
    /// Idle timeout for pooled connections.
    pub pool_idle_timeout: Duration,
    /// Maximum response body size in bytes.
    ///
    /// Responses exceeding this limit are rejected with an `InvalidRequest`
    /// error, both on the Content-Length precheck and while streaming.
    pub max_response_size: usize,
    /// Maximum encoded request body size in bytes, checked before send.
    pub max_request_size: usize,
    /// Option keys whose nested object values are merged key-by-key on
    /// `push_option` instead of replaced wholesale.
    pub deep_merge_keys: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: "http-transact/0.1".to_string(),
            proxy: None,
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
            max_response_size: 10 * 1024 * 1024,
            max_request_size: 10 * 1024 * 1024,
            deep_merge_keys: vec!["curlSettings".to_string()],
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with the given base URL and defaults for
    /// everything else.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Validates the configuration parameters.
    ///
    /// Returns `Ok(ValidationResult)` for valid configurations, possibly
    /// with warnings for suboptimal values, and `Err(ConfigValidationError)`
    /// for invalid ones.
    ///
    /// Rules:
    /// - `timeout` > 5 minutes is an error
    /// - `timeout` < 1 second is a warning
    /// - `max_request_size` of zero or above 100MB is an error
    pub fn validate(&self) -> std::result::Result<ValidationResult, ConfigValidationError> {
        const MAX_REASONABLE_REQUEST_SIZE: usize = 100 * 1024 * 1024;

        let mut warnings = Vec::new();

        if self.timeout > Duration::from_secs(300) {
            return Err(ConfigValidationError::too_high(
                "timeout",
                format!("{:?}", self.timeout),
                "5 minutes",
            ));
        }

        if self.timeout < Duration::from_secs(1) {
            warnings.push(format!(
                "timeout {:?} is very short, may cause frequent timeouts",
                self.timeout
            ));
        }

        if self.max_request_size == 0 {
            return Err(ConfigValidationError::invalid(
                "max_request_size",
                "max_request_size cannot be zero",
            ));
        }

        if self.max_request_size > MAX_REASONABLE_REQUEST_SIZE {
            return Err(ConfigValidationError::too_high(
                "max_request_size",
                self.max_request_size,
                "100MB (104857600 bytes)",
            ));
        }

        Ok(ValidationResult::with_warnings(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.max_response_size, 10 * 1024 * 1024);
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert_eq!(config.deep_merge_keys, vec!["curlSettings".to_string()]);
        assert!(config.base_url.is_empty());
    }

    #[test]
    fn test_validate_default_is_clean() {
        let result = ClientConfig::default().validate().unwrap();
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_timeout_too_high() {
        let config = ClientConfig {
            timeout: Duration::from_secs(600),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field_name(), "timeout");
    }

    #[test]
    fn test_validate_short_timeout_warns() {
        let config = ClientConfig {
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        let result = config.validate().unwrap();
        assert!(result.has_warnings());
        assert!(result.warnings[0].contains("very short"));
    }

    #[test]
    fn test_validate_request_size_bounds() {
        let config = ClientConfig {
            max_request_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field_name(), "max_request_size");

        let config = ClientConfig {
            max_request_size: 101 * 1024 * 1024,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            max_request_size: 100 * 1024 * 1024,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
