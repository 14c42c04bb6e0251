//! Builds pipeline components from [`Config`].

use nanobanana::Config;
use nanobanana::core::images::ImageEngine;
use nanobanana::core::prompt::{PromptComposer, PromptSynthesizer};
use nanobanana::core::providers::{GeminiImageBackend, OpenAiAssistantsClient};
use nanobanana::pipeline::{Pipeline, PipelineSettings};
use nanobanana::transport::channels::{
    ChannelClient, ChannelConnection, ClientFactory, DeliveryEngine, TelegramBotClient,
};
use std::sync::Arc;

pub(crate) fn synthesizer(config: &Config) -> PromptSynthesizer {
    let generator = OpenAiAssistantsClient::with_base_url(
        config.openai.api_key.as_deref(),
        &config.openai.model,
        &config.openai.api_base,
    );
    PromptSynthesizer::new(
        Arc::new(generator),
        PromptComposer::default(),
        config.guard.policy(),
        config.generation.synthesis_settings(),
    )
}

pub(crate) fn image_engine(config: &Config) -> ImageEngine {
    let backend = GeminiImageBackend::with_base_url(
        config.gemini.api_key.as_deref(),
        &config.gemini.model,
        config.gemini.imagen_model.as_deref(),
        &config.gemini.api_base,
    );
    ImageEngine::new(Arc::new(backend))
}

pub(crate) fn telegram_client(config: &Config) -> TelegramBotClient {
    TelegramBotClient::new(
        config.telegram_session_path(),
        config.telegram.bot_token.clone(),
    )
}

/// Lazily connecting Telegram session shared by every delivery.
pub(crate) fn telegram_connection(config: &Config) -> Arc<ChannelConnection> {
    let session_path = config.telegram_session_path();
    let token = config.telegram.bot_token.clone();
    let factory: ClientFactory = Arc::new(move || {
        Arc::new(TelegramBotClient::new(session_path.clone(), token.clone()))
            as Arc<dyn ChannelClient>
    });
    Arc::new(ChannelConnection::new(factory))
}

/// `None` when no target chat is configured.
pub(crate) fn delivery(
    config: &Config,
    connection: &Arc<ChannelConnection>,
) -> Option<Arc<DeliveryEngine>> {
    let target = config
        .telegram
        .target_chat_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())?;
    Some(Arc::new(DeliveryEngine::new(Arc::clone(connection), target)))
}

pub(crate) fn pipeline(config: &Config, connection: &Arc<ChannelConnection>) -> Pipeline {
    Pipeline::new(
        synthesizer(config),
        image_engine(config),
        delivery(config, connection),
        PipelineSettings::from_config(config),
    )
}
