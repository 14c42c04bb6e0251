use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct CreateAssistantRequest<'a> {
    pub(super) model: &'a str,
    pub(super) name: &'a str,
    pub(super) instructions: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct AssistantObject {
    pub(super) id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateThreadAndRunRequest<'a> {
    pub(super) assistant_id: &'a str,
    pub(super) thread: ThreadSeed<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct ThreadSeed<'a> {
    pub(super) messages: Vec<ThreadMessageSeed<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct ThreadMessageSeed<'a> {
    pub(super) role: &'static str,
    pub(super) content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct RunObject {
    pub(super) id: String,
    pub(super) thread_id: String,
    pub(super) status: crate::core::prompt::RunStatus,
    #[serde(default)]
    pub(super) last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RunError {
    #[serde(default)]
    pub(super) code: Option<String>,
    #[serde(default)]
    pub(super) message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MessageList {
    #[serde(default)]
    pub(super) data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ThreadMessage {
    pub(super) role: String,
    #[serde(default)]
    pub(super) created_at: i64,
    #[serde(default)]
    pub(super) content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum MessageContent {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub(super) struct TextValue {
    pub(super) value: String,
}
