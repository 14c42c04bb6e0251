use super::super::{
    AppConfig, GatewayConfig, GeminiConfig, GenerationConfig, GuardConfig, OpenAiConfig,
    TelegramConfig,
};
use crate::core::images::MAX_IMAGES_PER_REQUEST;
use crate::error::ConfigError;
use crate::media::ImageFormat;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(super) const DATA_DIR_NAME: &str = ".nanobanana";
pub(super) const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let data_dir = home.join(DATA_DIR_NAME);

        Self {
            config_path: data_dir.join(CONFIG_FILE_NAME),
            data_dir,
            app: AppConfig::default(),
            openai: OpenAiConfig::default(),
            gemini: GeminiConfig::default(),
            telegram: TelegramConfig::default(),
            generation: GenerationConfig::default(),
            guard: GuardConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl Config {
    pub fn telegram_session_path(&self) -> PathBuf {
        self.telegram.session_path(&self.data_dir)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if !(1..=MAX_IMAGES_PER_REQUEST).contains(&generation.images_per_job) {
            return Err(ConfigError::Validation(format!(
                "generation.images_per_job must be between 1 and {MAX_IMAGES_PER_REQUEST}, got {}",
                generation.images_per_job
            )));
        }
        generation
            .image_format
            .parse::<ImageFormat>()
            .map_err(|err| ConfigError::Validation(format!("generation.image_format: {err}")))?;
        if generation.max_total_failure_cycles == 0 {
            return Err(ConfigError::Validation(
                "generation.max_total_failure_cycles must be at least 1".into(),
            ));
        }
        if generation.prompt_poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "generation.prompt_poll_interval_ms must be positive".into(),
            ));
        }
        if let (Some(min), Some(max)) = (self.guard.min_chars, self.guard.max_chars)
            && min > max
        {
            return Err(ConfigError::Validation(format!(
                "guard.min_chars ({min}) exceeds guard.max_chars ({max})"
            )));
        }
        if self.gateway.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "gateway.queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
