//! On-disk bot session: the token and bot identity saved by `channel login`.

use crate::error::ChannelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub bot_token: String,
    #[serde(default)]
    pub bot_username: Option<String>,
    pub saved_at: DateTime<Utc>,
}

fn session_error(action: &str, path: &Path, err: impl std::fmt::Display) -> ChannelError {
    ChannelError::Session(format!("{action} {}: {err}", path.display()))
}

/// `Ok(None)` when no session has been saved yet.
pub async fn load_session(path: &Path) -> Result<Option<StoredSession>, ChannelError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(session_error("read", path, err)),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| session_error("parse", path, err))
}

/// Write the session file, readable by the owner only.
pub async fn save_session(path: &Path, session: &StoredSession) -> Result<(), ChannelError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| session_error("create directory for", path, err))?;
    }

    let body = serde_json::to_string_pretty(session).map_err(|err| session_error("encode", path, err))?;
    tokio::fs::write(path, body)
        .await
        .map_err(|err| session_error("write", path, err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|err| session_error("restrict permissions on", path, err))?;
    }
    Ok(())
}

/// Returns whether a file was removed.
pub async fn remove_session(path: &Path) -> Result<bool, ChannelError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(session_error("remove", path, err)),
    }
}
