//! One bound (request, response, service-name) execution unit.

use crate::error::{ErrorKind, Result};
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::timing::ResponseTime;
use crate::transport::Transport;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Constructed, not yet executed.
    Built,
    /// Execution in flight.
    Running,
    /// Execution finished, whether success or transport failure.
    Completed,
}

/// Binds one request to one response plus a logical service name used for
/// logging/metrics attribution.
///
/// `run` is the only state transition trigger and is not idempotent: calling
/// it again re-executes the transport call and overwrites the response state
/// and timing. A transport failure still reaches [`TransactionState::Completed`],
/// with the error attached to the response, no status, and whatever timing
/// was measured up to the failure.
#[derive(Debug)]
pub struct Transaction {
    request: HttpRequest,
    response: HttpResponse,
    service_name: Option<String>,
    state: TransactionState,
}

impl Transaction {
    /// Builds a transaction around a request. The response starts pending,
    /// echoing the request's method, URL, and options.
    pub fn new(request: HttpRequest, service_name: Option<String>) -> Self {
        let response = HttpResponse::pending(
            request.method().clone(),
            request.url(),
            request.options().clone(),
        );
        Self {
            request,
            response,
            service_name,
            state: TransactionState::Built,
        }
    }

    /// The request this transaction executes. Immutable from here on.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// The response, populated once `run` completes.
    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    /// Mutable response access, for attaching decode handlers and
    /// compliance errors after execution.
    pub fn response_mut(&mut self) -> &mut HttpResponse {
        &mut self.response
    }

    /// The logical service name this call is attributed to.
    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Executes the request through the transport and populates the
    /// response.
    ///
    /// Transport failures (connection refused, timeout, DNS) do not return
    /// an error: the transaction completes with the error attached to the
    /// response and status absent. Encoding failures and request-validation
    /// failures are returned to the caller.
    #[instrument(
        name = "transaction_run",
        skip(self, transport),
        fields(
            method = %self.request.method(),
            url = %self.request.url(),
            service = self.service_name.as_deref().unwrap_or("-"),
        )
    )]
    pub async fn run(&mut self, transport: &dyn Transport) -> Result<()> {
        self.state = TransactionState::Running;

        let encoded = match self.request.encoded_body() {
            Ok(encoded) => encoded,
            Err(e) => {
                self.state = TransactionState::Completed;
                self.response.fail(e.clone(), ResponseTime::zero());
                return Err(e);
            }
        };

        let started = Instant::now();
        let result = transport.send(&self.request, encoded.as_deref()).await;
        let elapsed = started.elapsed();

        self.state = TransactionState::Completed;

        match result {
            Ok(reply) => {
                let mut time = reply.time;
                if time.total == 0.0 {
                    // Transport could not observe phases; keep our own total.
                    time = ResponseTime::from_total(elapsed);
                }
                debug!(
                    status = reply.status,
                    total_ms = %elapsed.as_millis(),
                    body_len = reply.body.len(),
                    "Transaction completed"
                );
                self.response
                    .complete(reply.status, reply.headers, reply.body, time);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::Transport => {
                warn!(
                    error = %e,
                    total_ms = %elapsed.as_millis(),
                    "Transaction completed with transport failure"
                );
                self.response.fail(e, ResponseTime::from_total(elapsed));
                Ok(())
            }
            Err(e) => {
                self.response
                    .fail(e.clone(), ResponseTime::from_total(elapsed));
                Err(e)
            }
        }
    }
}
