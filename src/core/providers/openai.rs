//! OpenAI Assistants client used for prompt synthesis.
//!
//! One assistant is created lazily per client and reused for every run. Each
//! run gets a fresh thread seeded with the composed instruction.

use super::http_client::{build_provider_client, send_json};
use super::openai_types::{
    AssistantObject, CreateAssistantRequest, CreateThreadAndRunRequest, MessageContent,
    MessageList, RunObject, ThreadMessageSeed, ThreadSeed,
};
use crate::core::prompt::{GeneratorFuture, RunHandle, RunMessage, RunState, TextGenerator};
use crate::error::ServiceError;
use reqwest::Client;
use tokio::sync::OnceCell;

const SERVICE: &str = "openai";
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4o-mini";
const ASSISTANT_NAME: &str = "nanobanana-leatherwear-prompts";
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");
const MESSAGE_PAGE_LIMIT: &str = "5";

pub struct OpenAiAssistantsClient {
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    client: Client,
    api_base: String,
    model: String,
    assistant_id: OnceCell<String>,
}

impl OpenAiAssistantsClient {
    pub fn new(api_key: Option<&str>, model: &str) -> Self {
        Self::with_base_url(api_key, model, OPENAI_API_BASE)
    }

    pub fn with_base_url(api_key: Option<&str>, model: &str, api_base: &str) -> Self {
        Self {
            cached_auth_header: api_key
                .filter(|k| !k.trim().is_empty())
                .map(|k| format!("Bearer {k}")),
            client: build_provider_client(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            assistant_id: OnceCell::new(),
        }
    }

    fn auth(&self) -> Result<&str, ServiceError> {
        self.cached_auth_header
            .as_deref()
            .ok_or(ServiceError::MissingCredentials { service: SERVICE })
    }

    fn post(&self, path: &str) -> Result<reqwest::RequestBuilder, ServiceError> {
        Ok(self
            .client
            .post(format!("{}{path}", self.api_base))
            .header("Authorization", self.auth()?)
            .header(BETA_HEADER.0, BETA_HEADER.1))
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, ServiceError> {
        Ok(self
            .client
            .get(format!("{}{path}", self.api_base))
            .header("Authorization", self.auth()?)
            .header(BETA_HEADER.0, BETA_HEADER.1))
    }

    async fn assistant_id(&self, instructions: &str) -> Result<&str, ServiceError> {
        let id = self
            .assistant_id
            .get_or_try_init(|| async {
                let request = CreateAssistantRequest {
                    model: &self.model,
                    name: ASSISTANT_NAME,
                    instructions,
                };
                let assistant: AssistantObject =
                    send_json(SERVICE, self.post("/assistants")?.json(&request)).await?;
                tracing::info!(assistant_id = %assistant.id, model = %self.model, "assistant created");
                Ok::<_, ServiceError>(assistant.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

impl TextGenerator for OpenAiAssistantsClient {
    fn start_run<'a>(
        &'a self,
        system: &'a str,
        instruction: &'a str,
    ) -> GeneratorFuture<'a, RunHandle> {
        Box::pin(async move {
            let assistant_id = self.assistant_id(system).await?;
            let request = CreateThreadAndRunRequest {
                assistant_id,
                thread: ThreadSeed {
                    messages: vec![ThreadMessageSeed {
                        role: "user",
                        content: instruction,
                    }],
                },
            };
            let run: RunObject =
                send_json(SERVICE, self.post("/threads/runs")?.json(&request)).await?;
            tracing::debug!(thread_id = %run.thread_id, run_id = %run.id, status = %run.status, "run started");
            Ok(RunHandle {
                thread_id: run.thread_id,
                run_id: run.id,
            })
        })
    }

    fn poll_run<'a>(&'a self, run: &'a RunHandle) -> GeneratorFuture<'a, RunState> {
        Box::pin(async move {
            let path = format!("/threads/{}/runs/{}", run.thread_id, run.run_id);
            let object: RunObject = send_json(SERVICE, self.get(&path)?).await?;
            let last_error = object.last_error.map(|err| {
                format!(
                    "{}: {}",
                    err.code.unwrap_or_else(|| "error".to_string()),
                    err.message.unwrap_or_default()
                )
            });
            Ok(RunState {
                status: object.status,
                last_error,
            })
        })
    }

    fn run_messages<'a>(&'a self, run: &'a RunHandle) -> GeneratorFuture<'a, Vec<RunMessage>> {
        Box::pin(async move {
            let path = format!("/threads/{}/messages", run.thread_id);
            let request = self
                .get(&path)?
                .query(&[("order", "desc"), ("limit", MESSAGE_PAGE_LIMIT)]);
            let list: MessageList = send_json(SERVICE, request).await?;
            Ok(list
                .data
                .into_iter()
                .map(|message| RunMessage {
                    role: message.role,
                    created_at: message.created_at,
                    text: message
                        .content
                        .into_iter()
                        .filter_map(|part| match part {
                            MessageContent::Text { text } => Some(text.value),
                            MessageContent::Other => None,
                        })
                        .collect::<Vec<_>>()
                        .join("\n"),
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prompt::RunStatus;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_assistant(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/assistants"))
            .and(header("OpenAI-Beta", "assistants=v2"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini", "instructions": "be tasteful"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "asst_1"})))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_run(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/threads/runs"))
            .and(body_partial_json(json!({
                "assistant_id": "asst_1",
                "thread": {"messages": [{"role": "user", "content": "compose"}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1", "thread_id": "thread_1", "status": "queued"
            })))
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> OpenAiAssistantsClient {
        OpenAiAssistantsClient::with_base_url(Some("sk-test"), DEFAULT_ASSISTANT_MODEL, &server.uri())
    }

    #[tokio::test]
    async fn assistant_is_created_once_and_reused() {
        let server = MockServer::start().await;
        mount_assistant(&server).await;
        mount_run(&server).await;

        let client = client(&server);
        for _ in 0..2 {
            let run = client.start_run("be tasteful", "compose").await.unwrap();
            assert_eq!(
                run,
                RunHandle {
                    thread_id: "thread_1".into(),
                    run_id: "run_1".into()
                }
            );
        }
    }

    #[tokio::test]
    async fn poll_maps_status_and_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "thread_id": "thread_1",
                "status": "failed",
                "last_error": {"code": "server_error", "message": "boom"}
            })))
            .mount(&server)
            .await;

        let run = RunHandle {
            thread_id: "thread_1".into(),
            run_id: "run_1".into(),
        };
        let state = client(&server).poll_run(&run).await.unwrap();
        assert_eq!(state.status, RunStatus::Failed);
        assert_eq!(state.last_error.as_deref(), Some("server_error: boom"));
    }

    #[tokio::test]
    async fn messages_are_flattened_to_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .and(query_param("order", "desc"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"role": "assistant", "created_at": 20, "content": [
                        {"type": "text", "text": {"value": "An oxblood trench", "annotations": []}},
                        {"type": "image_file", "image_file": {"file_id": "f"}}
                    ]},
                    {"role": "user", "created_at": 10, "content": [
                        {"type": "text", "text": {"value": "compose"}}
                    ]}
                ]
            })))
            .mount(&server)
            .await;

        let run = RunHandle {
            thread_id: "thread_1".into(),
            run_id: "run_1".into(),
        };
        let messages = client(&server).run_messages(&run).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "assistant");
        assert_eq!(messages[0].text, "An oxblood trench");
        assert_eq!(messages[0].created_at, 20);
    }

    #[tokio::test]
    async fn server_error_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistants"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"message": "internal", "type": "server_error"}
            })))
            .mount(&server)
            .await;

        let err = client(&server).start_run("be tasteful", "compose").await.unwrap_err();
        assert!(matches!(err, ServiceError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = OpenAiAssistantsClient::new(None, DEFAULT_ASSISTANT_MODEL);
        let err = client.start_run("sys", "compose").await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingCredentials { service: "openai" }));

        let blank = OpenAiAssistantsClient::new(Some("  "), DEFAULT_ASSISTANT_MODEL);
        assert!(blank.cached_auth_header.is_none());
    }
}
