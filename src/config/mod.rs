pub mod schema;

pub use schema::{
    AppConfig, Config, GatewayConfig, GeminiConfig, GenerationConfig, GuardConfig, LogFormat,
    OpenAiConfig, TelegramConfig,
};
