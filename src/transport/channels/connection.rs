//! Shared, lazily established channel session.
//!
//! The first caller connects and authorizes the client under the lock; later
//! callers reuse it while it stays connected. `release` tears the session down
//! so the next caller starts from a fresh client.

use super::traits::ChannelClient;
use crate::error::ChannelError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::Mutex;

pub type ClientFactory = Arc<dyn Fn() -> Arc<dyn ChannelClient> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Ready,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Ready,
            _ => Self::Disconnected,
        }
    }
}

pub struct ChannelConnection {
    factory: ClientFactory,
    client: Mutex<Option<Arc<dyn ChannelClient>>>,
    state: AtomicU8,
}

impl ChannelConnection {
    pub fn new(factory: ClientFactory) -> Self {
        Self {
            factory,
            client: Mutex::new(None),
            state: AtomicU8::new(ConnectionState::Disconnected as u8),
        }
    }

    /// Wrap an already constructed client; `release` followed by `acquire`
    /// reconnects the same instance.
    pub fn with_client(client: Arc<dyn ChannelClient>) -> Self {
        Self::new(Arc::new(move || Arc::clone(&client)))
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Live, authorized client. Never prompts for credentials.
    pub async fn acquire(&self) -> Result<Arc<dyn ChannelClient>, ChannelError> {
        self.acquire_with(None).await
    }

    /// Connect and sign in with `credentials`, replacing any stored session.
    pub async fn login(&self, credentials: &str) -> Result<Arc<dyn ChannelClient>, ChannelError> {
        self.acquire_with(Some(credentials)).await
    }

    async fn acquire_with(
        &self,
        credentials: Option<&str>,
    ) -> Result<Arc<dyn ChannelClient>, ChannelError> {
        let mut slot = self.client.lock().await;

        if credentials.is_none()
            && let Some(client) = slot.as_ref()
            && client.is_connected()
        {
            return Ok(Arc::clone(client));
        }

        self.set_state(ConnectionState::Connecting);
        let client = match slot.take() {
            Some(existing) if existing.is_connected() => existing,
            _ => (self.factory)(),
        };

        match establish(client.as_ref(), credentials).await {
            Ok(()) => {
                *slot = Some(Arc::clone(&client));
                self.set_state(ConnectionState::Ready);
                tracing::info!(channel = client.name(), "channel session ready");
                Ok(client)
            }
            Err(err) => {
                if let Err(disconnect_err) = client.disconnect().await {
                    tracing::debug!(error = %disconnect_err, "disconnect after failed connect");
                }
                self.set_state(ConnectionState::Disconnected);
                Err(err)
            }
        }
    }

    /// Disconnect the shared client, if any, and reset the handle.
    pub async fn release(&self) {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.take()
            && let Err(err) = client.disconnect().await
        {
            tracing::warn!(channel = client.name(), error = %err, "channel disconnect failed");
        }
        self.set_state(ConnectionState::Disconnected);
    }
}

async fn establish(client: &dyn ChannelClient, credentials: Option<&str>) -> Result<(), ChannelError> {
    if !client.is_connected() {
        client.connect().await?;
    }

    if let Some(credentials) = credentials {
        return client.sign_in(credentials).await;
    }

    if client.is_authorized().await? {
        Ok(())
    } else {
        Err(ChannelError::Unauthorized(format!(
            "{} session is not authorized; run `nanobanana channel login` first",
            client.name()
        )))
    }
}
