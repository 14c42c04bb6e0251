//! In-memory channel client for unit tests.

use super::traits::{ChannelClient, ChannelFuture, UploadHandle};
use crate::error::ChannelError;
use crate::media::ImagePayload;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Upload(String),
    SendFile(usize),
    SendMessage(String),
    Discard(usize),
}

pub(crate) struct RecordingClient {
    connected: AtomicBool,
    authorized: AtomicBool,
    connects: AtomicUsize,
    signed_in_with: Mutex<Option<String>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, VecDeque<Option<ChannelError>>>>,
}

impl RecordingClient {
    pub(crate) fn new(authorized: bool) -> Self {
        Self {
            connected: AtomicBool::new(false),
            authorized: AtomicBool::new(authorized),
            connects: AtomicUsize::new(0),
            signed_in_with: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Queue an error for the next call of `action`
    /// (`upload_file`, `send_file` or `send_message`).
    pub(crate) fn fail_next(&self, action: &'static str, err: ChannelError) {
        self.failures
            .lock()
            .unwrap()
            .entry(action)
            .or_default()
            .push_back(Some(err));
    }

    /// Let the next call of `action` through ahead of queued failures.
    pub(crate) fn succeed_next(&self, action: &'static str) {
        self.failures
            .lock()
            .unwrap()
            .entry(action)
            .or_default()
            .push_back(None);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendMessage(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn signed_in_with(&self) -> Option<String> {
        self.signed_in_with.lock().unwrap().clone()
    }

    fn take_failure(&self, action: &'static str) -> Option<ChannelError> {
        self.failures
            .lock()
            .unwrap()
            .get_mut(action)
            .and_then(VecDeque::pop_front)
            .flatten()
    }

    fn record(&self, action: &'static str, call: Call) -> Result<(), ChannelError> {
        if let Some(err) = self.take_failure(action) {
            return Err(err);
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl ChannelClient for RecordingClient {
    fn name(&self) -> &str {
        "recording"
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
        Box::pin(async move { Ok(self.authorized.load(Ordering::SeqCst)) })
    }

    fn sign_in<'a>(&'a self, credentials: &'a str) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            *self.signed_in_with.lock().unwrap() = Some(credentials.to_string());
            self.authorized.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn upload_file<'a>(
        &'a self,
        file_name: &'a str,
        payload: &'a ImagePayload,
    ) -> ChannelFuture<'a, UploadHandle> {
        Box::pin(async move {
            self.record("upload_file", Call::Upload(file_name.to_string()))?;
            Ok(UploadHandle {
                id: format!("up-{file_name}"),
                file_name: file_name.to_string(),
                size: payload.len(),
            })
        })
    }

    fn send_file<'a>(&'a self, _target: &'a str, files: &'a [UploadHandle]) -> ChannelFuture<'a, ()> {
        Box::pin(async move { self.record("send_file", Call::SendFile(files.len())) })
    }

    fn send_message<'a>(&'a self, _target: &'a str, text: &'a str) -> ChannelFuture<'a, ()> {
        Box::pin(async move { self.record("send_message", Call::SendMessage(text.to_string())) })
    }

    fn discard_uploads<'a>(&'a self, files: &'a [UploadHandle]) -> ChannelFuture<'a, ()> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(Call::Discard(files.len()));
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
