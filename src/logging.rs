//! Structured logging setup.
//!
//! The pipeline emits `tracing` spans and events; this module wires up a
//! `tracing-subscriber` for applications that don't bring their own.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    Pretty,
    /// Single-line compact output.
    Compact,
    /// JSON output for production log pipelines.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level applied to this crate's targets when `RUST_LOG` is unset.
    pub level: tracing::Level,
    /// Output format.
    pub format: LogFormat,
    /// Whether to include span enter/close events.
    pub show_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            format: LogFormat::Pretty,
            show_span_events: false,
        }
    }
}

impl LogConfig {
    /// Debug-level pretty output with span events, for development.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            format: LogFormat::Pretty,
            show_span_events: true,
        }
    }

    /// Info-level JSON output, for production.
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            format: LogFormat::Json,
            show_span_events: false,
        }
    }
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Initializes the global subscriber. Panics if one is already set; use
/// [`try_init_logging`] in tests.
pub fn init_logging(config: &LogConfig) {
    tracing_subscriber::registry().with(build_layer(config)).init();
}

/// Initializes the global subscriber, ignoring an already-set one.
pub fn try_init_logging(config: &LogConfig) {
    let _ = tracing_subscriber::registry()
        .with(build_layer(config))
        .try_init();
}

fn build_layer(config: &LogConfig) -> BoxedLayer {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("http_transact={}", config.level)));

    let span_events = if config.show_span_events {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_span_events(span_events)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_filter(env_filter)
            .boxed(),
    }
}
