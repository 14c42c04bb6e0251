use crate::error::ChannelError;
use crate::media::ImagePayload;
use std::future::Future;
use std::pin::Pin;

pub type ChannelFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ChannelError>> + Send + 'a>>;

/// A file staged on the channel side, ready to be referenced by `send_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHandle {
    pub id: String,
    pub file_name: String,
    pub size: usize,
}

/// Messaging platform session used by the delivery engine.
///
/// Implementations keep their own connection state; the connection manager
/// decides when to connect, authorize and tear them down.
pub trait ChannelClient: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    fn connect(&self) -> ChannelFuture<'_, ()>;

    fn is_connected(&self) -> bool;

    fn is_authorized(&self) -> ChannelFuture<'_, bool>;

    /// Authorize the session with operator-supplied credentials and persist it.
    fn sign_in<'a>(&'a self, credentials: &'a str) -> ChannelFuture<'a, ()>;

    fn upload_file<'a>(
        &'a self,
        file_name: &'a str,
        payload: &'a ImagePayload,
    ) -> ChannelFuture<'a, UploadHandle>;

    /// Send previously uploaded files to `target`; more than one becomes an album.
    fn send_file<'a>(&'a self, target: &'a str, files: &'a [UploadHandle]) -> ChannelFuture<'a, ()>;

    fn send_message<'a>(&'a self, target: &'a str, text: &'a str) -> ChannelFuture<'a, ()>;

    /// Drop uploads that will never be sent.
    fn discard_uploads<'a>(&'a self, _files: &'a [UploadHandle]) -> ChannelFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }

    fn disconnect(&self) -> ChannelFuture<'_, ()>;

    fn max_message_length(&self) -> usize {
        4096
    }
}
