use crate::core::providers::gemini::{DEFAULT_IMAGE_MODEL, GEMINI_API_BASE};
use crate::core::providers::openai::{DEFAULT_ASSISTANT_MODEL, OPENAI_API_BASE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_assistant_model")]
    pub model: String,
    #[serde(default = "default_openai_base")]
    pub api_base: String,
}

fn default_assistant_model() -> String {
    DEFAULT_ASSISTANT_MODEL.into()
}

fn default_openai_base() -> String {
    OPENAI_API_BASE.into()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_assistant_model(),
            api_base: default_openai_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model used for one-image `generateContent` calls.
    #[serde(default = "default_image_model")]
    pub model: String,
    /// Imagen model for batch `:predict` calls; unset disables the batch path.
    #[serde(default = "default_imagen_model")]
    pub imagen_model: Option<String>,
    #[serde(default = "default_gemini_base")]
    pub api_base: String,
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.into()
}

#[allow(clippy::unnecessary_wraps)]
fn default_imagen_model() -> Option<String> {
    Some("imagen-4.0-generate-001".into())
}

fn default_gemini_base() -> String {
    GEMINI_API_BASE.into()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_image_model(),
            imagen_model: default_imagen_model(),
            api_base: default_gemini_base(),
        }
    }
}
