//! Prompt → images → delivery, run once per job.

pub mod queue;

pub use queue::{Job, JobQueue, JobReceiver, WorkerSettings, job_queue, run_worker};

use crate::config::Config;
use crate::core::images::{Aspect, ImageEngine};
use crate::core::prompt::PromptSynthesizer;
use crate::error::PipelineError;
use crate::media::ImagePayload;
use crate::transport::channels::{DeliveryEngine, DeliveryReport};
use crate::utils::fingerprint;
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;

/// Generation parameters fixed for the lifetime of a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub images_per_job: usize,
    pub aspect: Aspect,
    pub format: String,
    pub image_delay: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        let generation = &config.generation;
        Self {
            images_per_job: generation.images_per_job,
            aspect: generation.image_aspect,
            format: generation.image_format.clone(),
            image_delay: generation.image_delay(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            images_per_job: 2,
            aspect: Aspect::default(),
            format: "png".into(),
            image_delay: Duration::ZERO,
        }
    }
}

/// Per-run overrides. `None` falls back to [`PipelineSettings`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub count: Option<usize>,
    pub aspect: Option<Aspect>,
    pub delay: Option<Duration>,
    pub header: Option<String>,
    /// Stop after image generation.
    pub no_send: bool,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub prompt: String,
    pub images: Vec<ImagePayload>,
    pub delivery: Option<DeliveryReport>,
}

pub struct Pipeline {
    synthesizer: PromptSynthesizer,
    images: ImageEngine,
    delivery: Option<Arc<DeliveryEngine>>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        synthesizer: PromptSynthesizer,
        images: ImageEngine,
        delivery: Option<Arc<DeliveryEngine>>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            synthesizer,
            images,
            delivery,
            settings,
        }
    }

    pub fn delivery(&self) -> Option<&Arc<DeliveryEngine>> {
        self.delivery.as_ref()
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn run(&self, options: &RunOptions) -> Result<RunOutcome, PipelineError> {
        let delivery = match (&self.delivery, options.no_send) {
            (_, true) => None,
            (Some(engine), false) => Some(engine),
            (None, false) => {
                return Err(PipelineError::Other(anyhow!(
                    "no delivery target configured; set telegram.target_chat_id or pass --no-send"
                )));
            }
        };

        let prompt = self.synthesizer.synthesize().await?;
        tracing::info!(
            len = prompt.chars().count(),
            fingerprint = %fingerprint(&prompt),
            "prompt accepted"
        );

        let delay = options.delay.unwrap_or(self.settings.image_delay);
        if !delay.is_zero() {
            tracing::debug!(delay_secs = delay.as_secs(), "waiting before image generation");
            tokio::time::sleep(delay).await;
        }

        let count = options.count.unwrap_or(self.settings.images_per_job);
        let aspect = options.aspect.unwrap_or(self.settings.aspect);
        let images = self
            .images
            .generate(&prompt, count, aspect, &self.settings.format)
            .await?;

        let report = match delivery {
            Some(engine) => Some(
                engine
                    .deliver(&images, &prompt, options.header.as_deref())
                    .await?,
            ),
            None => None,
        };

        Ok(RunOutcome {
            prompt,
            images,
            delivery: report,
        })
    }
}
