//! Quality-assurance hook: post-execution protocol compliance checking.
//!
//! After a real (non-mocked) transaction completes, the client hands it to a
//! [`ComplianceChecker`]. The checker's rule set is injectable; the pipeline
//! only fixes *when* it runs (once, after execution, before the response is
//! returned) and *how* violations surface (attached to the response, raised
//! only for [`Severity::Fatal`]).

use crate::error::{Error, Result, Severity};
use crate::response::HttpResponse;
use crate::transaction::Transaction;
use std::borrow::Cow;
use tracing::warn;

/// A flagged protocol violation.
#[derive(Debug, Clone)]
pub struct Violation {
    /// What was violated.
    pub message: Cow<'static, str>,
    /// Whether this fails the call or only annotates the response.
    pub severity: Severity,
}

impl Violation {
    /// Creates a recoverable violation.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Recoverable,
        }
    }

    /// Creates a fatal violation.
    pub fn fatal(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Fatal,
        }
    }
}

/// One pluggable compliance rule, evaluated against a completed response.
pub trait ComplianceRule: Send + Sync {
    /// Stable rule name, used in logs.
    fn name(&self) -> &'static str;

    /// Returns a violation if the response breaks this rule.
    fn evaluate(&self, response: &HttpResponse) -> Option<Violation>;
}

/// The checker collaborator invoked once per real transaction.
pub trait ComplianceChecker: Send + Sync {
    /// Inspects the completed transaction. Violations are attached to the
    /// response as compliance errors; a fatal violation is also returned.
    fn check_compliance(&self, transaction: &mut Transaction) -> Result<()>;
}

/// Checker over an injectable list of rules.
///
/// Rules are evaluated in registration order. The first violation is
/// attached to the response (later rules still run, for logging); if any
/// violation is fatal, the attached error carries fatal severity and is
/// returned.
#[derive(Default)]
pub struct RuleChecker {
    rules: Vec<Box<dyn ComplianceRule>>,
}

impl RuleChecker {
    /// Creates a checker with no rules (which flags nothing).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, builder style.
    #[must_use]
    pub fn with_rule(mut self, rule: impl ComplianceRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }
}

impl ComplianceChecker for RuleChecker {
    fn check_compliance(&self, transaction: &mut Transaction) -> Result<()> {
        let mut flagged: Option<Violation> = None;

        for rule in &self.rules {
            if let Some(violation) = rule.evaluate(transaction.response()) {
                warn!(
                    rule = rule.name(),
                    severity = ?violation.severity,
                    service = transaction.service_name().unwrap_or("-"),
                    url = %transaction.response().url(),
                    message = %violation.message,
                    "Compliance violation"
                );
                // A fatal violation outranks an earlier recoverable one.
                let replace = match &flagged {
                    None => true,
                    Some(existing) => {
                        existing.severity == Severity::Recoverable
                            && violation.severity == Severity::Fatal
                    }
                };
                if replace {
                    flagged = Some(violation);
                }
            }
        }

        if let Some(violation) = flagged {
            let error = Error::compliance_with_severity(violation.message, violation.severity);
            transaction.response_mut().attach_error(error.clone());
            if violation.severity == Severity::Fatal {
                return Err(error);
            }
        }

        Ok(())
    }
}

/// Rule: the status must be present and strictly below a threshold.
///
/// Responses with no status are skipped; those already carry a transport
/// error and the checker must not mask it.
#[derive(Debug, Clone)]
pub struct MaxStatusRule {
    max: u16,
    severity: Severity,
}

impl MaxStatusRule {
    /// Recoverable rule flagging statuses at or above `max`.
    #[must_use]
    pub fn new(max: u16) -> Self {
        Self {
            max,
            severity: Severity::Recoverable,
        }
    }

    /// Same rule with an explicit severity.
    #[must_use]
    pub fn with_severity(max: u16, severity: Severity) -> Self {
        Self { max, severity }
    }
}

impl ComplianceRule for MaxStatusRule {
    fn name(&self) -> &'static str {
        "max_status"
    }

    fn evaluate(&self, response: &HttpResponse) -> Option<Violation> {
        let status = response.status()?;
        if status >= self.max {
            return Some(Violation {
                message: Cow::Owned(format!("status must be < {}, got {status}", self.max)),
                severity: self.severity,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::JsonHandler;
    use crate::request::HttpRequest;
    use crate::timing::ResponseTime;
    use crate::ErrorKind;
    use reqwest::header::HeaderMap;
    use reqwest::Method;
    use serde_json::Map;
    use std::sync::Arc;

    fn completed_transaction(status: u16) -> Transaction {
        let request = HttpRequest::new(
            Method::GET,
            "https://a/p",
            HeaderMap::new(),
            Map::new(),
            None,
            Arc::new(JsonHandler),
        );
        let mut txn = Transaction::new(request, None);
        txn.response_mut()
            .complete(status, HeaderMap::new(), b"{}".to_vec(), ResponseTime::zero());
        txn
    }

    #[test]
    fn test_clean_response_passes() {
        let checker = RuleChecker::new().with_rule(MaxStatusRule::new(500));
        let mut txn = completed_transaction(200);
        checker.check_compliance(&mut txn).unwrap();
        assert!(txn.response().error().is_none());
    }

    #[test]
    fn test_recoverable_violation_attaches_without_raising() {
        let checker = RuleChecker::new().with_rule(MaxStatusRule::new(500));
        let mut txn = completed_transaction(503);

        checker.check_compliance(&mut txn).unwrap();

        // Error is additive: the real status stays put.
        assert_eq!(txn.response().status(), Some(503));
        let error = txn.response().error().unwrap();
        assert_eq!(error.kind(), ErrorKind::Compliance);
        assert_eq!(error.severity(), Some(Severity::Recoverable));
    }

    #[test]
    fn test_fatal_violation_raises_and_attaches() {
        let checker = RuleChecker::new()
            .with_rule(MaxStatusRule::with_severity(500, Severity::Fatal));
        let mut txn = completed_transaction(503);

        let err = checker.check_compliance(&mut txn).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compliance);
        assert_eq!(err.severity(), Some(Severity::Fatal));
        assert_eq!(
            txn.response().error().unwrap().severity(),
            Some(Severity::Fatal)
        );
    }

    #[test]
    fn test_fatal_outranks_earlier_recoverable() {
        struct AlwaysFlag(Severity);
        impl ComplianceRule for AlwaysFlag {
            fn name(&self) -> &'static str {
                "always_flag"
            }
            fn evaluate(&self, _response: &HttpResponse) -> Option<Violation> {
                Some(Violation {
                    message: Cow::Borrowed("flagged"),
                    severity: self.0,
                })
            }
        }

        let checker = RuleChecker::new()
            .with_rule(AlwaysFlag(Severity::Recoverable))
            .with_rule(AlwaysFlag(Severity::Fatal));
        let mut txn = completed_transaction(200);

        assert!(checker.check_compliance(&mut txn).is_err());
    }

    #[test]
    fn test_statusless_response_is_skipped() {
        let checker = RuleChecker::new().with_rule(MaxStatusRule::new(500));
        let request = HttpRequest::new(
            Method::GET,
            "https://a/p",
            HeaderMap::new(),
            Map::new(),
            None,
            Arc::new(JsonHandler),
        );
        let mut txn = Transaction::new(request, None);
        txn.response_mut()
            .fail(Error::transport("connection refused"), ResponseTime::zero());

        checker.check_compliance(&mut txn).unwrap();

        // The transport error is still the one attached.
        assert_eq!(
            txn.response().error().unwrap().kind(),
            ErrorKind::Transport
        );
    }
}
