use std::time::Duration;

use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use do_facts::{Client, FactsParams, FactsTarget, Outcome, invoke};
use sonic_rs::{JsonValueTrait, json};
use tokio::net::TcpListener;
use tokio::time::sleep;

const LISTING: &str = r#"{"floating_ips":[{"ip":"45.55.96.47","droplet":null,"locked":false}],"links":{},"meta":{"total":1}}"#;

fn params(server: &TestServer, token: &str) -> FactsParams {
    FactsParams {
        oauth_token: Some(token.to_string()),
        api_url: Some(server.url("/v2")),
        timeout: Some(Duration::from_secs(1)),
        ..FactsParams::default()
    }
}

async fn invoke_floating_ips(params: FactsParams) -> Outcome {
    invoke(params, FactsTarget::FloatingIps, |_| None, Client::new()).await
}

#[tokio::test]
async fn e2e_floating_ips_success_roundtrip() {
    let server = TestServer::start().await;

    let outcome = invoke_floating_ips(params(&server, "abc123")).await;

    let expected: sonic_rs::Value = sonic_rs::from_str(LISTING).expect("fixture is json");
    assert_eq!(outcome, Outcome::facts(Some(expected)));
}

#[tokio::test]
async fn e2e_wrong_token_reports_api_message() {
    let server = TestServer::start().await;

    let outcome = invoke_floating_ips(params(&server, "wrong")).await;

    assert_eq!(
        outcome.msg(),
        Some("Error fetching facts [401: Unable to authenticate you.]")
    );
}

#[tokio::test]
async fn e2e_token_with_spaces_reaches_the_server_verbatim() {
    let server = TestServer::start().await;
    let token = "tok en with spaces & special!chars";
    let params = FactsParams {
        api_url: Some(server.url("/echo")),
        ..params(&server, token)
    };

    let outcome = invoke_floating_ips(params).await;

    let received = outcome
        .data()
        .and_then(|data| data.get("authorization"))
        .and_then(|value| value.as_str());
    assert_eq!(received, Some(format!("Bearer {token}").as_str()));
}

#[tokio::test]
async fn e2e_server_error_with_empty_body() {
    let server = TestServer::start().await;
    let params = FactsParams {
        api_url: Some(server.url("/broken")),
        ..params(&server, "abc123")
    };

    let outcome = invoke_floating_ips(params).await;

    assert_eq!(outcome.msg(), Some("Error fetching facts [500]"));
}

#[tokio::test]
async fn e2e_timeout_surfaces_as_transport_failure() {
    let server = TestServer::start().await;
    let params = FactsParams {
        api_url: Some(server.url("/slow")),
        ..params(&server, "abc123")
    };

    let outcome = invoke_floating_ips(params).await;

    let msg = outcome.msg().expect("timeout is a failure");
    assert!(msg.starts_with("Error fetching facts [-1: Request failed:"), "{msg}");
}

#[tokio::test]
async fn e2e_connection_refused_surfaces_as_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let params = FactsParams {
        oauth_token: Some("abc123".to_string()),
        api_url: Some(format!("http://{addr}/v2")),
        ..FactsParams::default()
    };
    let outcome = invoke_floating_ips(params).await;

    let msg = outcome.msg().expect("refused connection is a failure");
    assert!(msg.starts_with("Error fetching facts [-1: Request failed:"), "{msg}");
}

struct TestServer {
    base_url: String,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let app = Router::new()
            .route("/v2/floating_ips", get(floating_ips_handler))
            .route("/broken/floating_ips", get(broken_handler))
            .route("/slow/floating_ips", get(slow_handler))
            .route("/echo/floating_ips", get(echo_handler));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { base_url, task }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn floating_ips_handler(headers: HeaderMap) -> (StatusCode, &'static str) {
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some("Bearer abc123");
    let json = headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        == Some("application/json");

    if authorized && json {
        (StatusCode::OK, LISTING)
    } else {
        (
            StatusCode::UNAUTHORIZED,
            r#"{"id":"unauthorized","message":"Unable to authenticate you."}"#,
        )
    }
}

async fn broken_handler() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn slow_handler() -> (StatusCode, &'static str) {
    sleep(Duration::from_millis(2500)).await;
    (StatusCode::OK, LISTING)
}

async fn echo_handler(headers: HeaderMap) -> (StatusCode, String) {
    let authorization = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let body = sonic_rs::to_string(&json!({ "authorization": authorization }))
        .expect("echo body encodes");
    (StatusCode::OK, body)
}
