//! End-to-end pipeline scenarios driven through a scripted transport stub.
//!
//! No real network I/O: the stub transport plays back scripted replies so
//! every scenario is deterministic.

use async_trait::async_trait;
use http_transact::{
    ClientConfig, Error, ErrorKind, HttpClient, HttpRequest, HttpResponse, MaxStatusRule, Method,
    Result, RuleChecker, Severity, StaticMockRegistry, Transport, TransportReply,
};
use reqwest::header::HeaderMap;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Plays back a script of replies, one per call, recording what it saw.
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportReply>>>,
    seen: Mutex<Vec<(Method, String)>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<TransportReply>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn reply(status: u16, body: &[u8]) -> Result<TransportReply> {
        Ok(TransportReply {
            status,
            headers: HeaderMap::new(),
            body: body.to_vec(),
            time: http_transact::ResponseTime::zero(),
        })
    }

    fn seen(&self) -> Vec<(Method, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest, _body: Option<&[u8]>) -> Result<TransportReply> {
        self.seen
            .lock()
            .unwrap()
            .push((request.method().clone(), request.url().to_string()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("script exhausted")))
    }
}

fn client(transport: Arc<dyn Transport>) -> HttpClient {
    HttpClient::with_transport(ClientConfig::with_base_url("https://a"), transport)
}

#[tokio::test]
async fn full_pipeline_success_path() {
    let transport = ScriptedTransport::new(vec![ScriptedTransport::reply(
        200,
        br#"{"widgets":[1,2,3]}"#,
    )]);
    let mut client = client(transport.clone());
    client.set_service_name(Some("inventory".to_string()));
    client.set_compliance_checker(Arc::new(
        RuleChecker::new().with_rule(MaxStatusRule::new(500)),
    ));

    let body = client.get("/widgets", None, None).await.unwrap();
    assert_eq!(body, Some(json!({"widgets": [1, 2, 3]})));

    // The transport saw the resolved URL, and the transaction is cached.
    assert_eq!(
        transport.seen(),
        vec![(Method::GET, "https://a/widgets".to_string())]
    );
    let txn = client.last_transaction().unwrap();
    assert_eq!(txn.service_name(), Some("inventory"));
    assert_eq!(txn.response().status(), Some(200));
    assert!(txn.response().error().is_none());
}

#[tokio::test]
async fn mock_registration_bypasses_everything() {
    // Transport would blow up the compliance rule if it were ever reached.
    let transport = ScriptedTransport::new(vec![ScriptedTransport::reply(503, b"{}")]);
    let mut client = client(transport.clone());
    client.set_compliance_checker(Arc::new(
        RuleChecker::new().with_rule(MaxStatusRule::with_severity(500, Severity::Fatal)),
    ));

    let mocks = Arc::new(StaticMockRegistry::new());
    mocks.register(HttpResponse::mock(
        Method::GET,
        "https://a/p",
        200,
        br#"{"mocked":true}"#.to_vec(),
    ));
    client.set_mock_registry(mocks);

    let body = client.get("/p", None, None).await.unwrap();
    assert_eq!(body, Some(json!({"mocked": true})));

    // No transport call, no transaction, no compliance check.
    assert!(transport.seen().is_empty());
    assert!(client.last_transaction().is_none());
}

#[tokio::test]
async fn mock_hit_leaves_prior_transaction_in_place() {
    let transport = ScriptedTransport::new(vec![ScriptedTransport::reply(200, b"{}")]);
    let mut client = client(transport);

    client.get("/real", None, None).await.unwrap();
    assert_eq!(client.last_response().unwrap().url(), "https://a/real");

    let mocks = Arc::new(StaticMockRegistry::new());
    mocks.register(HttpResponse::mock(
        Method::GET,
        "https://a/mocked",
        200,
        b"{}".to_vec(),
    ));
    client.set_mock_registry(mocks);

    client.get("/mocked", None, None).await.unwrap();

    // Still the earlier real call.
    assert_eq!(client.last_response().unwrap().url(), "https://a/real");
}

#[tokio::test]
async fn transport_refusal_completes_with_attached_error() {
    let transport = ScriptedTransport::new(vec![Err(Error::transport("connection refused"))]);
    let mut client = client(transport);

    let response = client
        .request(Method::GET, "/p", None, None, None)
        .await
        .unwrap();

    assert_eq!(response.status(), None);
    let error = response.error().unwrap();
    assert_eq!(error.kind(), ErrorKind::Transport);
    assert_eq!(error.as_transport().unwrap().class(), "connection_failed");

    // Phases past the failure point stay zeroed.
    assert_eq!(response.time().first_byte, 0.0);
    assert_eq!(response.time().transfer, 0.0);

    // Snapshot shape survives the failure.
    let snapshot = response.to_value();
    assert!(snapshot["status"].is_null());
    assert_eq!(snapshot["error"]["kind"], "transport");
    assert_eq!(snapshot["time"].as_object().unwrap().len(), 5);
}

#[tokio::test]
async fn compliance_rule_flags_503_without_replacing_data() {
    let transport = ScriptedTransport::new(vec![ScriptedTransport::reply(
        503,
        br#"{"error":"overloaded"}"#,
    )]);
    let mut client = client(transport);
    client.set_compliance_checker(Arc::new(
        RuleChecker::new().with_rule(MaxStatusRule::new(500)),
    ));

    let response = client
        .request(Method::GET, "/p", None, None, None)
        .await
        .unwrap();

    assert_eq!(response.status(), Some(503));
    assert_eq!(response.error().unwrap().kind(), ErrorKind::Compliance);
    assert_eq!(
        response.decoded_body().unwrap(),
        Some(json!({"error": "overloaded"}))
    );
}

#[tokio::test]
async fn base_url_override_reaches_transport_verbatim() {
    let transport = ScriptedTransport::new(vec![ScriptedTransport::reply(200, b"{}")]);
    let mut client = client(transport.clone());

    let options = json!({"baseUrl": "https://x"}).as_object().cloned().unwrap();
    client
        .request(Method::GET, "/p/", None, None, Some(options))
        .await
        .unwrap();

    assert_eq!(
        transport.seen(),
        vec![(Method::GET, "https://x/p/".to_string())]
    );
}

#[tokio::test]
async fn custom_method_passes_through() {
    let transport = ScriptedTransport::new(vec![ScriptedTransport::reply(200, b"{}")]);
    let mut client = client(transport.clone());

    let method = Method::from_bytes(b"PURGE").unwrap();
    client
        .request(method.clone(), "/cache", None, None, None)
        .await
        .unwrap();

    assert_eq!(transport.seen()[0].0, method);
}

#[tokio::test]
async fn sequential_calls_overwrite_last_transaction() {
    let transport = ScriptedTransport::new(vec![
        ScriptedTransport::reply(200, br#"{"n":1}"#),
        Err(Error::timeout("no response after 30s")),
    ]);
    let mut client = client(transport);

    client.get("/one", None, None).await.unwrap();
    assert_eq!(client.last_response().unwrap().status(), Some(200));

    let err = client.get("/two", None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);

    let last = client.last_response().unwrap();
    assert_eq!(last.url(), "https://a/two");
    assert_eq!(last.status(), None);
    assert_eq!(
        last.error().unwrap().as_transport().unwrap().class(),
        "timeout"
    );
}
