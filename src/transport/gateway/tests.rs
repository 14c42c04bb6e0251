use super::*;
use crate::pipeline::{JobReceiver, job_queue};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn test_state(capacity: usize) -> (AppState, JobReceiver) {
    let (queue, rx) = job_queue(capacity);
    (
        AppState {
            queue,
            env: "test".into(),
            tz: "Europe/Warsaw".into(),
        },
        rx,
    )
}

struct TestServer {
    base: String,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start(state: AppState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_gateway_with_listener(
            "127.0.0.1",
            listener,
            state,
            shutdown.clone(),
        ));
        Self {
            base: format!("http://127.0.0.1:{port}"),
            shutdown,
            handle,
        }
    }

    async fn stop(self) {
        self.shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("gateway did not shut down")
            .unwrap()
            .unwrap();
    }
}

#[test]
fn security_body_limit_is_64kb() {
    assert_eq!(MAX_BODY_SIZE, 65_536);
}

#[test]
fn security_timeout_is_30_seconds() {
    assert_eq!(REQUEST_TIMEOUT_SECS, 30);
}

#[test]
fn loopback_hosts_are_not_public() {
    assert!(!is_public_bind("127.0.0.1"));
    assert!(!is_public_bind("localhost"));
    assert!(!is_public_bind("::1"));
    assert!(is_public_bind("0.0.0.0"));
    assert!(is_public_bind("192.168.1.10"));
}

#[tokio::test]
async fn public_bind_is_refused_without_opt_in() {
    let (state, _rx) = test_state(1);
    let err = run_gateway("0.0.0.0", 0, false, state, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Refusing to bind"));
}

#[tokio::test]
async fn health_reports_environment_and_queue_depth() {
    let (state, _rx) = test_state(4);
    state.queue.enqueue(None).unwrap();
    let server = TestServer::start(state).await;

    let response = reqwest::get(format!("{}/health", server.base)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let json: serde_json::Value = response.json().await.unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["env"], "test");
    assert_eq!(json["tz"], "Europe/Warsaw");
    assert_eq!(json["queue_size"], 1);
    assert!(json["now_utc"].as_str().unwrap().ends_with('Z'));
    assert!(json["now_local"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn run_now_queues_job_with_request_id() {
    let (state, mut rx) = test_state(4);
    let server = TestServer::start(state).await;

    let response = reqwest::Client::new()
        .post(format!("{}/run-now", server.base))
        .header(REQUEST_ID_HEADER, "req-abc")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()[REQUEST_ID_HEADER].to_str().unwrap(),
        "req-abc"
    );
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["queued"], true);

    let job = rx.recv().await.unwrap();
    assert_eq!(json["job_id"], job.id.as_str());
    assert_eq!(job.request_id.as_deref(), Some("req-abc"));

    server.stop().await;
}

#[tokio::test]
async fn request_id_is_generated_when_missing() {
    let (state, _rx) = test_state(1);
    let server = TestServer::start(state).await;

    let response = reqwest::get(format!("{}/health", server.base)).await.unwrap();
    let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());

    server.stop().await;
}

#[tokio::test]
async fn run_now_reports_full_queue() {
    let (state, _rx) = test_state(1);
    state.queue.enqueue(None).unwrap();
    let server = TestServer::start(state).await;

    let response = reqwest::Client::new()
        .post(format!("{}/run-now", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 429);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["queued"], false);

    server.stop().await;
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (state, _rx) = test_state(1);
    let server = TestServer::start(state).await;

    let response = reqwest::get(format!("{}/nope", server.base)).await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    server.stop().await;
}
