mod channels;
mod core;
mod gateway;
mod generation;
mod observability;
mod providers;

pub use channels::TelegramConfig;
pub use self::core::Config;
pub use gateway::GatewayConfig;
pub use generation::{GenerationConfig, GuardConfig};
pub use observability::{AppConfig, LogFormat};
pub use providers::{GeminiConfig, OpenAiConfig};
