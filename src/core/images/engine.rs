use super::backend::{BatchError, CALL_SHAPES, ImageBackend};
use super::extract::extract_png_payloads;
use super::retry::run_with_retry;
use crate::error::{ImageError, ServiceError};
use crate::media::{ImageFormat, ImagePayload};
use crate::utils::fingerprint;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Upper bound on images per request.
pub const MAX_IMAGES_PER_REQUEST: usize = 4;
const MAX_PASSES: usize = 2;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Aspect {
    #[default]
    Vertical,
    Square,
}

impl Aspect {
    /// Parse a user-supplied aspect, falling back to vertical.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectProfile {
    pub size: &'static str,
    pub framing_hint: &'static str,
}

const ASPECT_TABLE: [(Aspect, AspectProfile); 2] = [
    (
        Aspect::Vertical,
        AspectProfile {
            size: "1024x1536",
            framing_hint: "Vertical portrait framing, full outfit visible",
        },
    ),
    (
        Aspect::Square,
        AspectProfile {
            size: "1024x1024",
            framing_hint: "Square framing, full outfit visible",
        },
    ),
];

pub fn aspect_profile(aspect: Aspect) -> AspectProfile {
    ASPECT_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == aspect)
        .map_or(ASPECT_TABLE[0].1, |(_, profile)| *profile)
}

/// Append the framing hint and target size to the prompt.
pub fn hinted_prompt(prompt: &str, profile: AspectProfile) -> String {
    format!(
        "{prompt}\n\n{}; target feel ~{}.",
        profile.framing_hint, profile.size
    )
}

/// Turns an accepted prompt into 1..=count PNG payloads.
#[derive(Clone)]
pub struct ImageEngine {
    backend: Arc<dyn ImageBackend>,
}

impl ImageEngine {
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self { backend }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        count: usize,
        aspect: Aspect,
        format: &str,
    ) -> Result<Vec<ImagePayload>, ImageError> {
        if prompt.trim().is_empty() {
            return Err(ImageError::InvalidInput("prompt must not be blank".into()));
        }
        if !(1..=MAX_IMAGES_PER_REQUEST).contains(&count) {
            return Err(ImageError::InvalidInput(format!(
                "count must be between 1 and {MAX_IMAGES_PER_REQUEST}, got {count}"
            )));
        }
        let _format: ImageFormat = format.parse().map_err(ImageError::InvalidInput)?;

        let profile = aspect_profile(aspect);
        let hinted = hinted_prompt(prompt, profile);

        let result = self.collect(&hinted, count).await;
        match result {
            Ok(mut images) => {
                if images.is_empty() {
                    tracing::error!(
                        backend = self.backend.name(),
                        requested = count,
                        "image generation produced nothing"
                    );
                    return Err(ImageError::NoImagesGenerated);
                }
                if images.len() > count {
                    images.truncate(count);
                }
                if images.len() < count {
                    tracing::warn!(
                        backend = self.backend.name(),
                        requested = count,
                        produced = images.len(),
                        "fewer images than requested"
                    );
                }
                tracing::info!(
                    backend = self.backend.name(),
                    size = profile.size,
                    n = count,
                    produced = images.len(),
                    prompt_fingerprint = %fingerprint(prompt),
                    "images generated"
                );
                Ok(images)
            }
            Err(err) => {
                tracing::error!(
                    backend = self.backend.name(),
                    error = %err,
                    "image generation failed"
                );
                Err(err.into())
            }
        }
    }

    async fn collect(&self, prompt: &str, count: usize) -> Result<Vec<ImagePayload>, ServiceError> {
        let mut images = Vec::with_capacity(count);
        let mut preferred_available = true;

        for pass in 1..=MAX_PASSES {
            if images.len() >= count {
                break;
            }

            if preferred_available {
                let remaining = count - images.len();
                match self.generate_preferred(prompt, remaining).await? {
                    Some(batch) => {
                        tracing::debug!(pass, received = batch.len(), "preferred interface returned");
                        images.extend(batch);
                    }
                    None => preferred_available = false,
                }
            }

            let missing = count.saturating_sub(images.len());
            for _ in 0..missing {
                let response =
                    run_with_retry("generate_single", || self.backend.generate_single(prompt))
                        .await?;
                let batch = extract_png_payloads(&response, self.backend.name()).into_images();
                tracing::debug!(pass, received = batch.len(), "stable interface returned");
                images.extend(batch);
            }
        }

        Ok(images)
    }

    /// `Ok(None)` when the batch interface is unavailable for this call.
    async fn generate_preferred(
        &self,
        prompt: &str,
        count: usize,
    ) -> Result<Option<Vec<ImagePayload>>, ServiceError> {
        match run_with_retry("generate_batch", || self.try_call_shapes(prompt, count)).await {
            Ok(response) => Ok(Some(
                extract_png_payloads(&response, self.backend.name()).into_images(),
            )),
            Err(BatchError::Unavailable(reason) | BatchError::MalformedShape(reason)) => {
                tracing::info!(
                    backend = self.backend.name(),
                    reason = %reason,
                    "preferred interface unavailable, using stable interface"
                );
                Ok(None)
            }
            Err(BatchError::Service(err)) => Err(err),
        }
    }

    async fn try_call_shapes(
        &self,
        prompt: &str,
        count: usize,
    ) -> Result<serde_json::Value, BatchError> {
        let mut last_rejection = None;
        for shape in CALL_SHAPES {
            match self.backend.generate_batch(prompt, count, shape).await {
                Ok(response) => return Ok(response),
                Err(BatchError::MalformedShape(reason)) => {
                    tracing::debug!(?shape, reason = %reason, "call shape rejected");
                    last_rejection = Some(reason);
                }
                Err(other) => return Err(other),
            }
        }
        Err(BatchError::Unavailable(
            last_rejection.unwrap_or_else(|| "no call shape accepted".to_string()),
        ))
    }
}
