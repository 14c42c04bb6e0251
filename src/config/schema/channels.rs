use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_SESSION_FILE: &str = "telegram_session.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramConfig {
    /// Bot token. When unset, the token saved by `channel login` is used.
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Chat that receives albums and prompts (numeric id or `@channel`).
    #[serde(default)]
    pub target_chat_id: Option<String>,
    /// Session file; relative paths resolve against the data directory.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
    /// Send an error message to the target chat when a job gives up.
    #[serde(default)]
    pub notify_failures: bool,
}

impl TelegramConfig {
    pub fn session_path(&self, data_dir: &Path) -> PathBuf {
        match &self.session_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => data_dir.join(path),
            None => data_dir.join(DEFAULT_SESSION_FILE),
        }
    }
}
