//! Phase timing breakdown for one executed transaction.

use std::time::Duration;

/// Phase measurements for one request/response cycle, in seconds.
///
/// All phases default to zero when unmeasured; a mock hit or a transport
/// that cannot observe a phase leaves it at `0.0`. Created once by the
/// [`Transaction`](crate::Transaction) after execution and never mutated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResponseTime {
    /// Total wall-clock time of the call.
    pub total: f64,
    /// DNS lookup plus TCP connect.
    pub connect: f64,
    /// TLS handshake.
    pub handshake: f64,
    /// Time to first byte of the response.
    pub first_byte: f64,
    /// Body transfer time after the first byte.
    pub transfer: f64,
}

impl ResponseTime {
    /// A fully zeroed timing value, used for mock responses.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Builds a timing value from a measured total, leaving the phases the
    /// transport could not observe at zero.
    #[must_use]
    pub fn from_total(total: Duration) -> Self {
        Self {
            total: total.as_secs_f64(),
            ..Self::default()
        }
    }

    /// Serializes into the stable five-phase snapshot object.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "total": self.total,
            "connect": self.connect,
            "handshake": self.handshake,
            "first_byte": self.first_byte,
            "transfer": self.transfer,
        })
    }
}
