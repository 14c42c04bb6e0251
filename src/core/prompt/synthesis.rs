use super::composer::PromptComposer;
use super::guard::{self, GuardPolicy};
use super::templates::ASSISTANT_SYSTEM;
use crate::error::{PromptError, ServiceError};
use crate::utils::fingerprint;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

pub type GeneratorFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send + 'a>>;

/// Identifies one asynchronous generation run on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub thread_id: String,
    pub run_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Cancelling,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Incomplete,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Queued | Self::InProgress | Self::Cancelling)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub status: RunStatus,
    pub last_error: Option<String>,
}

/// One message on the run's thread, flattened to its text parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMessage {
    pub role: String,
    pub created_at: i64,
    pub text: String,
}

/// Remote language-generation service driven as start / poll / read.
pub trait TextGenerator: Send + Sync {
    fn start_run<'a>(
        &'a self,
        system: &'a str,
        instruction: &'a str,
    ) -> GeneratorFuture<'a, RunHandle>;

    fn poll_run<'a>(&'a self, run: &'a RunHandle) -> GeneratorFuture<'a, RunState>;

    /// Most recent messages on the run's thread, in any order.
    fn run_messages<'a>(&'a self, run: &'a RunHandle) -> GeneratorFuture<'a, Vec<RunMessage>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
enum SynthesisState {
    Composing,
    Requesting,
    Sanitizing,
    Validating,
    Accepted,
    Regenerating,
    Failed,
}

#[derive(Debug, Clone, Copy)]
pub struct SynthesisSettings {
    pub max_attempts: u32,
    pub poll_interval: Duration,
    pub deadline: Duration,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            poll_interval: Duration::from_millis(500),
            deadline: Duration::from_secs(90),
        }
    }
}

/// Produces one guard-approved image prompt per call.
pub struct PromptSynthesizer {
    generator: Arc<dyn TextGenerator>,
    composer: PromptComposer,
    guard: GuardPolicy,
    settings: SynthesisSettings,
}

impl PromptSynthesizer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        composer: PromptComposer,
        guard: GuardPolicy,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            generator,
            composer,
            guard,
            settings,
        }
    }

    pub async fn synthesize(&self) -> Result<String, PromptError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_reason = String::new();

        for attempt in 1..=max_attempts {
            transition(attempt, SynthesisState::Composing);
            let instruction = self.composer.compose_random();

            transition(attempt, SynthesisState::Requesting);
            let raw = match self.request(&instruction).await {
                Ok(raw) => raw,
                Err(err) => {
                    transition(attempt, SynthesisState::Failed);
                    tracing::error!(
                        attempt,
                        instruction_len = instruction.chars().count(),
                        fingerprint = %fingerprint(&instruction),
                        error = %err,
                        "prompt generation failed"
                    );
                    return Err(err);
                }
            };

            transition(attempt, SynthesisState::Sanitizing);
            let cleaned = guard::sanitize(&raw);
            if cleaned.is_empty() {
                transition(attempt, SynthesisState::Failed);
                tracing::error!(
                    attempt,
                    len = raw.chars().count(),
                    fingerprint = %fingerprint(&raw),
                    "generated prompt is empty after sanitizing"
                );
                return Err(PromptError::EmptyPrompt);
            }

            transition(attempt, SynthesisState::Validating);
            let verdict = self.guard.validate(&cleaned);
            if verdict.accepted {
                transition(attempt, SynthesisState::Accepted);
                tracing::info!(
                    attempt,
                    len = cleaned.chars().count(),
                    fingerprint = %fingerprint(&cleaned),
                    "prompt accepted"
                );
                return Ok(cleaned);
            }

            transition(attempt, SynthesisState::Regenerating);
            tracing::warn!(
                attempt,
                reason = %verdict.reason,
                len = cleaned.chars().count(),
                fingerprint = %fingerprint(&cleaned),
                "prompt rejected by guard"
            );
            last_reason = verdict.reason;
        }

        transition(max_attempts, SynthesisState::Failed);
        tracing::error!(
            attempts = max_attempts,
            reason = %last_reason,
            "prompt regeneration budget exhausted"
        );
        Err(PromptError::GenerationFailed(last_reason))
    }

    async fn request(&self, instruction: &str) -> Result<String, PromptError> {
        let run = self
            .generator
            .start_run(ASSISTANT_SYSTEM, instruction)
            .await?;

        let deadline = self.settings.deadline;
        let state = tokio::time::timeout(deadline, self.await_terminal(&run))
            .await
            .map_err(|_| PromptError::GenerationTimeout {
                waited_secs: deadline.as_secs(),
            })??;

        if state.status != RunStatus::Completed {
            if let Some(detail) = state.last_error.as_deref() {
                tracing::warn!(run_id = %run.run_id, status = %state.status, detail, "run ended without completing");
            }
            return Err(PromptError::GenerationFailed(format!("run_{}", state.status)));
        }

        let messages = self.generator.run_messages(&run).await?;
        newest_assistant_text(&messages).ok_or(PromptError::NoTextResponse)
    }

    async fn await_terminal(&self, run: &RunHandle) -> Result<RunState, ServiceError> {
        loop {
            let state = self.generator.poll_run(run).await?;
            if state.status.is_terminal() {
                return Ok(state);
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }
}

fn transition(attempt: u32, state: SynthesisState) {
    tracing::debug!(attempt, state = %state, "prompt synthesis");
}

/// Text of the newest assistant message with any non-blank content.
/// Messages arrive newest first; on equal timestamps the earlier entry wins.
fn newest_assistant_text(messages: &[RunMessage]) -> Option<String> {
    messages
        .iter()
        .filter(|m| m.role == "assistant" && !m.text.trim().is_empty())
        .rev()
        .max_by_key(|m| m.created_at)
        .map(|m| m.text.clone())
}
