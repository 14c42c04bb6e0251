//! In-memory stand-ins for the language model, the image model and the chat.
#![allow(dead_code)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use nanobanana::core::images::{BackendFuture, BatchError, CallShape, ImageBackend};
use nanobanana::core::prompt::{
    GeneratorFuture, RunHandle, RunMessage, RunState, RunStatus, TextGenerator,
};
use nanobanana::error::{ChannelError, ServiceError};
use nanobanana::media::{ImagePayload, PNG_SIGNATURE};
use nanobanana::transport::channels::{ChannelClient, ChannelFuture, UploadHandle};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn png_bytes(tag: usize) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(format!("png-{tag}").as_bytes());
    bytes
}

pub fn png_images(n: usize) -> Vec<ImagePayload> {
    (0..n).map(|i| ImagePayload::png(png_bytes(i))).collect()
}

/// `generateContent`-style response carrying `n` PNG parts.
pub fn png_response(n: usize, offset: usize) -> Value {
    let parts: Vec<Value> = (0..n)
        .map(|i| json!({"inlineData": {"mimeType": "image/png", "data": BASE64.encode(png_bytes(offset + i))}}))
        .collect();
    json!({"candidates": [{"content": {"parts": parts}}]})
}

/// Completes each run at once; replies come from `texts` in order and the
/// last one repeats.
pub struct ScriptedGenerator {
    texts: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    pub runs: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            texts: Mutex::new(texts.iter().map(|t| (*t).to_string()).collect()),
            last: Mutex::new(String::new()),
            runs: AtomicUsize::new(0),
        }
    }
}

impl TextGenerator for ScriptedGenerator {
    fn start_run<'a>(
        &'a self,
        _system: &'a str,
        _instruction: &'a str,
    ) -> GeneratorFuture<'a, RunHandle> {
        Box::pin(async move {
            let n = self.runs.fetch_add(1, Ordering::SeqCst);
            if let Some(next) = self.texts.lock().unwrap().pop_front() {
                *self.last.lock().unwrap() = next;
            }
            Ok(RunHandle {
                thread_id: format!("thread_{n}"),
                run_id: format!("run_{n}"),
            })
        })
    }

    fn poll_run<'a>(&'a self, _run: &'a RunHandle) -> GeneratorFuture<'a, RunState> {
        Box::pin(async {
            Ok(RunState {
                status: RunStatus::Completed,
                last_error: None,
            })
        })
    }

    fn run_messages<'a>(&'a self, _run: &'a RunHandle) -> GeneratorFuture<'a, Vec<RunMessage>> {
        Box::pin(async move {
            Ok(vec![
                RunMessage {
                    role: "user".into(),
                    created_at: 1,
                    text: "instruction".into(),
                },
                RunMessage {
                    role: "assistant".into(),
                    created_at: 2,
                    text: self.last.lock().unwrap().clone(),
                },
            ])
        })
    }
}

/// Batch calls return `batch_images` PNGs (or report the interface missing
/// when zero); single calls return one PNG each.
pub struct FakeImageModel {
    batch_images: usize,
    pub batch_calls: AtomicUsize,
    pub single_calls: AtomicUsize,
}

impl FakeImageModel {
    pub fn new(batch_images: usize) -> Self {
        Self {
            batch_images,
            batch_calls: AtomicUsize::new(0),
            single_calls: AtomicUsize::new(0),
        }
    }
}

impl ImageBackend for FakeImageModel {
    fn name(&self) -> &str {
        "fake-image-model"
    }

    fn generate_batch<'a>(
        &'a self,
        _prompt: &'a str,
        _count: usize,
        _shape: CallShape,
    ) -> BackendFuture<'a, Value, BatchError> {
        Box::pin(async move {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            if self.batch_images == 0 {
                return Err(BatchError::Unavailable("404 model not found".into()));
            }
            Ok(png_response(self.batch_images, 0))
        })
    }

    fn generate_single<'a>(&'a self, _prompt: &'a str) -> BackendFuture<'a, Value, ServiceError> {
        Box::pin(async move {
            let n = self.single_calls.fetch_add(1, Ordering::SeqCst);
            Ok(png_response(1, 100 + n))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Upload(String),
    Album(usize),
    Text(String),
}

/// Authorized chat that records what reaches it. `rate_limit_first_text`
/// answers the first text with a flood-wait signal.
pub struct MemoryChat {
    connected: AtomicBool,
    pub connects: AtomicUsize,
    rate_limit_first_text: Mutex<Option<u64>>,
    sent: Mutex<Vec<Sent>>,
}

impl MemoryChat {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
            rate_limit_first_text: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn rate_limited_once(retry_after_secs: u64) -> Self {
        let chat = Self::new();
        *chat.rate_limit_first_text.lock().unwrap() = Some(retry_after_secs);
        chat
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl ChannelClient for MemoryChat {
    fn name(&self) -> &str {
        "memory"
    }

    fn connect(&self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            self.connects.fetch_add(1, Ordering::SeqCst);
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_authorized(&self) -> ChannelFuture<'_, bool> {
        Box::pin(async { Ok(true) })
    }

    fn sign_in<'a>(&'a self, _credentials: &'a str) -> ChannelFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }

    fn upload_file<'a>(
        &'a self,
        file_name: &'a str,
        payload: &'a ImagePayload,
    ) -> ChannelFuture<'a, UploadHandle> {
        Box::pin(async move {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Upload(file_name.to_string()));
            Ok(UploadHandle {
                id: file_name.to_string(),
                file_name: file_name.to_string(),
                size: payload.len(),
            })
        })
    }

    fn send_file<'a>(&'a self, _target: &'a str, files: &'a [UploadHandle]) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(Sent::Album(files.len()));
            Ok(())
        })
    }

    fn send_message<'a>(&'a self, _target: &'a str, text: &'a str) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            if let Some(secs) = self.rate_limit_first_text.lock().unwrap().take() {
                return Err(ChannelError::RateLimited {
                    retry_after_secs: Some(secs),
                });
            }
            self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
            Ok(())
        })
    }

    fn disconnect(&self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        })
    }
}
