use crate::core::images::Aspect;
use crate::core::prompt::{GuardPolicy, GuardPreset, SynthesisSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_images_per_job")]
    pub images_per_job: usize,
    #[serde(default)]
    pub image_aspect: Aspect,
    #[serde(default = "default_image_format")]
    pub image_format: String,
    /// Extra prompt attempts after a guard rejection.
    #[serde(default = "default_max_prompt_regens")]
    pub max_prompt_regens: u32,
    /// Full pipeline runs per job before giving up.
    #[serde(default = "default_max_total_failure_cycles")]
    pub max_total_failure_cycles: u32,
    /// Pause between failed pipeline runs of the same job.
    #[serde(default = "default_retry_backoff_minutes")]
    pub retry_backoff_minutes: u64,
    #[serde(default = "default_prompt_poll_interval_ms")]
    pub prompt_poll_interval_ms: u64,
    #[serde(default = "default_prompt_deadline_secs")]
    pub prompt_deadline_secs: u64,
    /// Pause between prompt synthesis and image generation.
    #[serde(default)]
    pub image_delay_secs: u64,
}

fn default_images_per_job() -> usize {
    2
}

fn default_image_format() -> String {
    "png".into()
}

fn default_max_prompt_regens() -> u32 {
    1
}

fn default_max_total_failure_cycles() -> u32 {
    2
}

fn default_retry_backoff_minutes() -> u64 {
    5
}

fn default_prompt_poll_interval_ms() -> u64 {
    500
}

fn default_prompt_deadline_secs() -> u64 {
    90
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            images_per_job: default_images_per_job(),
            image_aspect: Aspect::default(),
            image_format: default_image_format(),
            max_prompt_regens: default_max_prompt_regens(),
            max_total_failure_cycles: default_max_total_failure_cycles(),
            retry_backoff_minutes: default_retry_backoff_minutes(),
            prompt_poll_interval_ms: default_prompt_poll_interval_ms(),
            prompt_deadline_secs: default_prompt_deadline_secs(),
            image_delay_secs: 0,
        }
    }
}

impl GenerationConfig {
    pub fn synthesis_settings(&self) -> SynthesisSettings {
        SynthesisSettings {
            max_attempts: self.max_prompt_regens.saturating_add(1),
            poll_interval: Duration::from_millis(self.prompt_poll_interval_ms),
            deadline: Duration::from_secs(self.prompt_deadline_secs),
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_minutes.saturating_mul(60))
    }

    pub fn image_delay(&self) -> Duration {
        Duration::from_secs(self.image_delay_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GuardConfig {
    #[serde(default)]
    pub preset: GuardPreset,
    #[serde(default)]
    pub extra_forbidden: Vec<String>,
    #[serde(default)]
    pub extra_required: Vec<String>,
    #[serde(default)]
    pub min_chars: Option<usize>,
    #[serde(default)]
    pub max_chars: Option<usize>,
}

impl GuardConfig {
    pub fn policy(&self) -> GuardPolicy {
        GuardPolicy::from_preset(self.preset).extended(
            &self.extra_forbidden,
            &self.extra_required,
            self.min_chars,
            self.max_chars,
        )
    }
}
