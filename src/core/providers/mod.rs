pub mod gemini;
mod gemini_types;
pub mod http_client;
pub mod openai;
mod openai_types;
pub mod scrub;

pub use gemini::GeminiImageBackend;
pub use http_client::{build_provider_client, build_provider_client_with_timeout};
pub use openai::OpenAiAssistantsClient;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
