//! Telegram Bot API channel client.
//!
//! Uploads are staged in memory and sent with `sendPhoto` (one image) or
//! `sendMediaGroup` (an album referencing `attach://` parts). Staged files
//! are dropped only after a successful send so a flood-wait retry can resend
//! them.

pub mod session;


use self::session::{StoredSession, load_session, save_session};
use super::traits::{ChannelClient, ChannelFuture, UploadHandle};
use crate::core::providers::build_provider_client;
use crate::core::providers::scrub::sanitize_api_error;
use crate::error::ChannelError;
use crate::media::ImagePayload;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<u16>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

struct StagedFile {
    file_name: String,
    mime_type: &'static str,
    bytes: Vec<u8>,
}

pub struct TelegramBotClient {
    client: Client,
    api_base: String,
    session_path: PathBuf,
    token_override: Option<String>,
    token: RwLock<Option<String>>,
    connected: AtomicBool,
    staged: Mutex<HashMap<String, StagedFile>>,
}

impl TelegramBotClient {
    /// `token_override` (from config or environment) wins over the saved session.
    pub fn new(session_path: impl Into<PathBuf>, token_override: Option<String>) -> Self {
        Self::with_api_base(session_path, token_override, TELEGRAM_API_BASE)
    }

    pub fn with_api_base(
        session_path: impl Into<PathBuf>,
        token_override: Option<String>,
        api_base: &str,
    ) -> Self {
        Self {
            client: build_provider_client(),
            api_base: api_base.trim_end_matches('/').to_string(),
            session_path: session_path.into(),
            token_override: token_override.filter(|t| !t.trim().is_empty()),
            token: RwLock::new(None),
            connected: AtomicBool::new(false),
            staged: Mutex::new(HashMap::new()),
        }
    }

    fn api_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{token}/{method}", self.api_base)
    }

    async fn current_token(&self) -> Result<String, ChannelError> {
        self.token.read().await.clone().ok_or_else(|| {
            ChannelError::Unauthorized(
                "no bot token; run `nanobanana channel login` first".to_string(),
            )
        })
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ChannelError> {
        let response = request
            .send()
            .await
            .map_err(|err| ChannelError::Transport(err.without_url().to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| ChannelError::Transport(err.without_url().to_string()))?;

        let Ok(envelope) = serde_json::from_str::<ApiResponse<T>>(&body) else {
            return Err(ChannelError::Api {
                status,
                description: sanitize_api_error(&body),
            });
        };
        if envelope.ok
            && let Some(result) = envelope.result
        {
            return Ok(result);
        }
        Err(classify_failure(
            envelope.error_code.unwrap_or(status),
            envelope.description.as_deref().unwrap_or("unknown error"),
            envelope.parameters.and_then(|p| p.retry_after),
        ))
    }

    async fn get_me(&self, token: &str) -> Result<BotUser, ChannelError> {
        self.call(self.client.get(self.api_url(token, "getMe"))).await
    }

    async fn staged_parts(&self, files: &[UploadHandle]) -> Result<Vec<Part>, ChannelError> {
        let staged = self.staged.lock().await;
        files
            .iter()
            .map(|handle| {
                let file = staged.get(&handle.id).ok_or_else(|| {
                    ChannelError::Session(format!("upload {} is not staged", handle.id))
                })?;
                Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(file.mime_type)
                    .map_err(|err| ChannelError::Transport(err.to_string()))
            })
            .collect()
    }

    async fn send_staged(&self, target: &str, files: &[UploadHandle]) -> Result<(), ChannelError> {
        let token = self.current_token().await?;
        let mut parts = self.staged_parts(files).await?;

        let request = if parts.len() == 1 {
            let Some(photo) = parts.pop() else {
                return Ok(());
            };
            let form = Form::new().text("chat_id", target.to_string()).part("photo", photo);
            self.client.post(self.api_url(&token, "sendPhoto")).multipart(form)
        } else {
            let media: Vec<Value> = (0..parts.len())
                .map(|idx| json!({"type": "photo", "media": format!("attach://photo{idx}")}))
                .collect();
            let mut form = Form::new()
                .text("chat_id", target.to_string())
                .text("media", Value::Array(media).to_string());
            for (idx, part) in parts.into_iter().enumerate() {
                form = form.part(format!("photo{idx}"), part);
            }
            self.client.post(self.api_url(&token, "sendMediaGroup")).multipart(form)
        };

        let result = self.call::<Value>(request).await;
        // A rate-limited album is resent with the same handles.
        if !matches!(result, Err(ChannelError::RateLimited { .. })) {
            self.unstage(files).await;
        }
        result.map(|_| ())
    }

    async fn unstage(&self, files: &[UploadHandle]) {
        let mut staged = self.staged.lock().await;
        for handle in files {
            staged.remove(&handle.id);
        }
    }

    /// Identity of the bot behind the active token.
    pub async fn whoami(&self) -> Result<BotUser, ChannelError> {
        let token = self.current_token().await?;
        self.get_me(&token).await
    }
}

fn classify_failure(status: u16, description: &str, retry_after: Option<u64>) -> ChannelError {
    let description = sanitize_api_error(description);
    if status == 429 {
        return ChannelError::RateLimited {
            retry_after_secs: retry_after,
        };
    }
    if description.to_ascii_lowercase().contains("message is too long") {
        return ChannelError::MessageTooLong;
    }
    match status {
        403 => ChannelError::WriteForbidden(description),
        401 => ChannelError::Unauthorized(description),
        _ => ChannelError::Api {
            status,
            description,
        },
    }
}

impl ChannelClient for TelegramBotClient {
    fn name(&self) -> &str {
        "telegram"
    }

    fn connect(&self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            let token = match &self.token_override {
                Some(token) => Some(token.clone()),
                None => load_session(&self.session_path)
                    .await?
                    .map(|session| session.bot_token),
            };
            *self.token.write().await = token;
            self.connected.store(true, Ordering::Release);
            Ok(())
        })
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn is_authorized(&self) -> ChannelFuture<'_, bool> {
        Box::pin(async move {
            let Some(token) = self.token.read().await.clone() else {
                return Ok(false);
            };
            match self.get_me(&token).await {
                Ok(user) => {
                    tracing::debug!(bot_id = user.id, username = ?user.username, "telegram bot authorized");
                    Ok(true)
                }
                Err(ChannelError::Unauthorized(_) | ChannelError::Api { status: 404, .. }) => Ok(false),
                Err(err) => Err(err),
            }
        })
    }

    fn sign_in<'a>(&'a self, credentials: &'a str) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            let token = credentials.trim();
            if token.is_empty() {
                return Err(ChannelError::Unauthorized("bot token is empty".to_string()));
            }
            let user = self.get_me(token).await?;
            if !user.is_bot {
                return Err(ChannelError::Unauthorized(
                    "token does not belong to a bot account".to_string(),
                ));
            }

            let session = StoredSession {
                bot_token: token.to_string(),
                bot_username: user.username.clone(),
                saved_at: chrono::Utc::now(),
            };
            save_session(&self.session_path, &session).await?;
            *self.token.write().await = Some(session.bot_token);
            tracing::info!(
                username = ?user.username,
                session = %self.session_path.display(),
                "telegram session saved"
            );
            Ok(())
        })
    }

    fn upload_file<'a>(
        &'a self,
        file_name: &'a str,
        payload: &'a ImagePayload,
    ) -> ChannelFuture<'a, UploadHandle> {
        Box::pin(async move {
            let id = uuid::Uuid::new_v4().to_string();
            self.staged.lock().await.insert(
                id.clone(),
                StagedFile {
                    file_name: file_name.to_string(),
                    mime_type: payload.format.mime_type(),
                    bytes: payload.bytes.clone(),
                },
            );
            Ok(UploadHandle {
                id,
                file_name: file_name.to_string(),
                size: payload.len(),
            })
        })
    }

    fn send_file<'a>(&'a self, target: &'a str, files: &'a [UploadHandle]) -> ChannelFuture<'a, ()> {
        Box::pin(self.send_staged(target, files))
    }

    fn discard_uploads<'a>(&'a self, files: &'a [UploadHandle]) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            self.unstage(files).await;
            Ok(())
        })
    }

    fn send_message<'a>(&'a self, target: &'a str, text: &'a str) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            let token = self.current_token().await?;
            let body = json!({
                "chat_id": target,
                "text": text,
                "link_preview_options": {"is_disabled": true}
            });
            let _: Value = self
                .call(self.client.post(self.api_url(&token, "sendMessage")).json(&body))
                .await?;
            Ok(())
        })
    }

    fn disconnect(&self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            self.connected.store(false, Ordering::Release);
            *self.token.write().await = None;
            self.staged.lock().await.clear();
            Ok(())
        })
    }
}
