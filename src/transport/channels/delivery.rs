//! Delivery of generated images and prompt text to the target chat.
//!
//! Every channel call goes through [`with_flood_wait`]: a rate-limit signal
//! is honoured once (capped at 30 s), a second one is fatal. Calls are issued
//! strictly in order: uploads, album, then text chunks.

use super::chunker::chunk_message;
use super::connection::ChannelConnection;
use super::traits::{ChannelClient, UploadHandle};
use crate::error::{ChannelError, DeliveryError};
use crate::media::{ImagePayload, sniff_png};
use crate::utils::text::{CAPTION_LIMIT, fingerprint, sanitize_caption};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Most images a single album may carry.
pub const ALBUM_LIMIT: usize = 10;
pub const FLOOD_WAIT_CAP: Duration = Duration::from_secs(30);
const FLOOD_WAIT_FALLBACK: Duration = Duration::from_secs(1);
pub const PROMPT_LABEL: &str = "Prompt:";
pub const NO_IMAGES_MARKER: &str = "(no images)";
const ERROR_PREFIX: &str = "❌ Error:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub image_count: usize,
    pub chunk_count: usize,
    pub text_len: usize,
    pub fingerprint: String,
}

/// Wait suggested by a rate-limit signal: the hint capped at 30 s, or one
/// second when the hint is zero or absent.
pub fn flood_wait_delay(retry_after_secs: Option<u64>) -> Duration {
    match retry_after_secs {
        Some(secs) if secs > 0 => Duration::from_secs(secs).min(FLOOD_WAIT_CAP),
        _ => FLOOD_WAIT_FALLBACK,
    }
}

/// Run `operation`, retrying exactly once after a rate-limit signal.
pub async fn with_flood_wait<T, F, Fut>(action: &'static str, mut operation: F) -> Result<T, DeliveryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ChannelError>>,
{
    let first = match operation().await {
        Err(ChannelError::RateLimited { retry_after_secs }) => retry_after_secs,
        other => return other.map_err(|source| failed(action, source)),
    };

    let wait = flood_wait_delay(first);
    tracing::warn!(action, wait_secs = wait.as_secs(), "flood wait; retrying once");
    tokio::time::sleep(wait).await;

    operation().await.map_err(|source| failed(action, source))
}

fn failed(action: &'static str, source: ChannelError) -> DeliveryError {
    tracing::error!(action, error = %source, "channel call failed");
    DeliveryError::Failed { action, source }
}

/// Outgoing text: optional trimmed header, blank line, label, prompt.
pub fn compose_text(prompt_text: &str, header: Option<&str>) -> String {
    let mut lines = Vec::with_capacity(4);
    if let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) {
        lines.push(header);
        lines.push("");
    }
    lines.push(PROMPT_LABEL);
    lines.push(prompt_text);
    lines.join("\n")
}

/// `❌ Error: [request_id=…] message`, the request id part only when known.
pub fn format_error_message(request_id: Option<&str>, message: &str) -> String {
    match request_id.filter(|id| !id.is_empty()) {
        Some(id) => format!("{ERROR_PREFIX} [request_id={id}] {message}"),
        None => format!("{ERROR_PREFIX} {message}"),
    }
}

pub struct DeliveryEngine {
    connection: Arc<ChannelConnection>,
    target: String,
}

impl DeliveryEngine {
    pub fn new(connection: Arc<ChannelConnection>, target: impl Into<String>) -> Self {
        Self {
            connection,
            target: target.into(),
        }
    }

    async fn client(&self) -> Result<Arc<dyn ChannelClient>, DeliveryError> {
        self.connection
            .acquire()
            .await
            .map_err(|source| failed("connect", source))
    }

    pub async fn deliver(
        &self,
        images: &[ImagePayload],
        prompt_text: &str,
        header: Option<&str>,
    ) -> Result<DeliveryReport, DeliveryError> {
        let text = compose_text(prompt_text, header);
        let fingerprint = fingerprint(prompt_text);

        if images.is_empty() {
            let caption = format!("{}\n{NO_IMAGES_MARKER}", sanitize_caption(&text, CAPTION_LIMIT));
            let client = self.client().await?;
            with_flood_wait("send_message", || client.send_message(&self.target, &caption)).await?;
            tracing::info!(
                image_count = 0,
                chunk_count = 1,
                text_len = prompt_text.chars().count(),
                fingerprint = %fingerprint,
                "delivered text-only message"
            );
            return Ok(DeliveryReport {
                image_count: 0,
                chunk_count: 1,
                text_len: prompt_text.chars().count(),
                fingerprint,
            });
        }

        if images.len() > ALBUM_LIMIT {
            return Err(DeliveryError::TooManyImages {
                count: images.len(),
                limit: ALBUM_LIMIT,
            });
        }
        let client = self.client().await?;

        let mut uploaded: Vec<UploadHandle> = Vec::with_capacity(images.len());
        if let Err(err) = self.send_album(client.as_ref(), images, &mut uploaded).await {
            if !uploaded.is_empty()
                && let Err(discard_err) = client.discard_uploads(&uploaded).await
            {
                tracing::warn!(error = %discard_err, "failed to discard staged uploads");
            }
            return Err(err);
        }

        let chunks = chunk_message(&text, client.max_message_length());
        for chunk in &chunks {
            with_flood_wait("send_message", || client.send_message(&self.target, chunk)).await?;
        }

        let report = DeliveryReport {
            image_count: uploaded.len(),
            chunk_count: chunks.len(),
            text_len: prompt_text.chars().count(),
            fingerprint,
        };
        tracing::info!(
            image_count = report.image_count,
            chunk_count = report.chunk_count,
            text_len = report.text_len,
            fingerprint = %report.fingerprint,
            "delivered album and prompt"
        );
        Ok(report)
    }

    async fn send_album(
        &self,
        client: &dyn ChannelClient,
        images: &[ImagePayload],
        uploaded: &mut Vec<UploadHandle>,
    ) -> Result<(), DeliveryError> {
        for (idx, image) in images.iter().enumerate() {
            sniff_png(&image.bytes, "delivery");
            let file_name = format!("image_{}.{}", idx + 1, image.format.extension());
            let handle =
                with_flood_wait("upload_file", || client.upload_file(&file_name, image)).await?;
            uploaded.push(handle);
        }
        with_flood_wait("send_file", || client.send_file(&self.target, uploaded)).await
    }

    /// Send free-form text, chunked to the channel limit. Returns the number
    /// of messages sent.
    pub async fn send_text(&self, text: &str) -> Result<usize, DeliveryError> {
        let client = self.client().await?;
        let chunks = chunk_message(text, client.max_message_length());
        for chunk in &chunks {
            with_flood_wait("send_message", || client.send_message(&self.target, chunk)).await?;
        }
        Ok(chunks.len())
    }

    pub async fn send_error_message(
        &self,
        request_id: Option<&str>,
        message: &str,
    ) -> Result<(), DeliveryError> {
        self.send_text(&format_error_message(request_id, message))
            .await
            .map(|_| ())
    }
}
