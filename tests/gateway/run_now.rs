use crate::fakes::{FakeImageModel, MemoryChat, ScriptedGenerator, Sent};
use nanobanana::core::images::ImageEngine;
use nanobanana::core::prompt::{GuardPolicy, PromptComposer, PromptSynthesizer, SynthesisSettings};
use nanobanana::pipeline::{Pipeline, PipelineSettings, WorkerSettings, job_queue, run_worker};
use nanobanana::transport::channels::{ChannelConnection, DeliveryEngine};
use nanobanana::transport::gateway::{AppState, REQUEST_ID_HEADER, run_gateway_with_listener};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const PROMPT: &str = "Runway shot of a model in a patent leather corset under a rim light.";

struct Service {
    base: String,
    chat: Arc<MemoryChat>,
    shutdown: CancellationToken,
    gateway: tokio::task::JoinHandle<anyhow::Result<()>>,
    worker: tokio::task::JoinHandle<()>,
}

impl Service {
    async fn start() -> Self {
        let chat = Arc::new(MemoryChat::new());
        let synthesizer = PromptSynthesizer::new(
            Arc::new(ScriptedGenerator::new(&[PROMPT])),
            PromptComposer::default(),
            GuardPolicy::reference(),
            SynthesisSettings::default(),
        );
        let connection = Arc::new(ChannelConnection::with_client(chat.clone()));
        let pipeline = Arc::new(Pipeline::new(
            synthesizer,
            ImageEngine::new(Arc::new(FakeImageModel::new(2))),
            Some(Arc::new(DeliveryEngine::new(connection, "-100123"))),
            PipelineSettings::default(),
        ));

        let (queue, jobs) = job_queue(8);
        let shutdown = CancellationToken::new();
        let worker = tokio::spawn(run_worker(
            pipeline,
            jobs,
            WorkerSettings::default(),
            shutdown.clone(),
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();
        let state = AppState {
            queue,
            env: "test".into(),
            tz: "UTC".into(),
        };
        let gateway = tokio::spawn(run_gateway_with_listener(
            "127.0.0.1",
            listener,
            state,
            shutdown.clone(),
        ));

        Self {
            base: format!("http://127.0.0.1:{port}"),
            chat,
            shutdown,
            gateway,
            worker,
        }
    }

    async fn wait_for_texts(&self, expected: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while self.chat.texts().len() < expected {
            assert!(
                tokio::time::Instant::now() < deadline,
                "job was not delivered in time"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    async fn stop(self) {
        self.shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), self.gateway)
            .await
            .expect("gateway should stop")
            .expect("gateway task should not panic")
            .expect("gateway should exit cleanly");
        tokio::time::timeout(Duration::from_secs(5), self.worker)
            .await
            .expect("worker should stop")
            .expect("worker task should not panic");
    }
}

#[tokio::test]
async fn run_now_job_is_generated_and_delivered() {
    let service = Service::start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/run-now", service.base))
        .header(REQUEST_ID_HEADER, "itest-1")
        .send()
        .await
        .expect("run-now request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()[REQUEST_ID_HEADER]
            .to_str()
            .expect("header should be ascii"),
        "itest-1"
    );
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["queued"], true);
    assert!(body["job_id"].as_str().is_some_and(|id| !id.is_empty()));

    service.wait_for_texts(1).await;
    let sent = service.chat.sent();
    assert!(sent.contains(&Sent::Album(2)));
    assert!(service.chat.texts()[0].contains(PROMPT));

    let health: Value = client
        .get(format!("{}/health", service.base))
        .send()
        .await
        .expect("health request should succeed")
        .json()
        .await
        .expect("json body");
    assert_eq!(health["status"], "ok");
    assert_eq!(health["queue_size"], 0);

    service.stop().await;
}

#[tokio::test]
async fn jobs_run_one_after_another() {
    let service = Service::start().await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let response = client
            .post(format!("{}/run-now", service.base))
            .send()
            .await
            .expect("run-now request should succeed");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    service.wait_for_texts(3).await;
    let albums = service
        .chat
        .sent()
        .iter()
        .filter(|s| matches!(s, Sent::Album(2)))
        .count();
    assert_eq!(albums, 3);

    service.stop().await;
}
