//! Google generative-language image backend.
//!
//! - Preferred batch interface: Imagen `models/{imagen}:predict`
//! - Stable interface: `models/{model}:generateContent` with image output

use super::gemini_types::{
    Content, GenerateContentRequest, GenerationConfig, PredictInstance, PredictRequest, TextPart,
};
use super::http_client::{build_provider_client, send_json, transport_error};
use super::scrub::{api_error, sanitize_api_error};
use crate::core::images::{BackendFuture, BatchError, CallShape, FormatHint, ImageBackend};
use crate::error::ServiceError;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value, json};

const SERVICE: &str = "gemini";
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "models/gemini-2.5-flash-image-preview";
const PNG_MIME: &str = "image/png";

pub struct GeminiImageBackend {
    api_key: Option<String>,
    client: Client,
    api_base: String,
    model: String,
    imagen_model: Option<String>,
}

impl GeminiImageBackend {
    pub fn new(api_key: Option<&str>, model: &str, imagen_model: Option<&str>) -> Self {
        Self::with_base_url(api_key, model, imagen_model, GEMINI_API_BASE)
    }

    pub fn with_base_url(
        api_key: Option<&str>,
        model: &str,
        imagen_model: Option<&str>,
        api_base: &str,
    ) -> Self {
        Self {
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from),
            client: build_provider_client(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model_name(model),
            imagen_model: imagen_model
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(model_name),
        }
    }

    fn api_key(&self) -> Result<&str, ServiceError> {
        self.api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredentials { service: SERVICE })
    }

    fn predict_parameters(count: usize, shape: CallShape) -> Map<String, Value> {
        let mut parameters = Map::new();
        parameters.insert(shape.count_field.key().to_string(), json!(count));
        match shape.format_hint {
            FormatHint::OutputOptionsMimeType => {
                parameters.insert("outputOptions".to_string(), json!({"mimeType": PNG_MIME}));
            }
            FormatHint::OutputMimeType => {
                parameters.insert("outputMimeType".to_string(), json!(PNG_MIME));
            }
            FormatHint::Omitted => {}
        }
        parameters
    }

    async fn predict(&self, prompt: &str, count: usize, shape: CallShape) -> Result<Value, BatchError> {
        let Some(imagen_model) = self.imagen_model.as_deref() else {
            return Err(BatchError::Unavailable("imagen model not configured".into()));
        };
        let api_key = self.api_key()?;
        let url = format!("{}/{imagen_model}:predict", self.api_base);
        let body = PredictRequest {
            instances: vec![PredictInstance { prompt }],
            parameters: Self::predict_parameters(count, shape),
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| BatchError::Service(transport_error(SERVICE, &err)))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NOT_IMPLEMENTED => {
                let text = response.text().await.unwrap_or_default();
                Err(BatchError::Unavailable(sanitize_api_error(&text)))
            }
            StatusCode::BAD_REQUEST => {
                let text = response.text().await.unwrap_or_default();
                Err(BatchError::MalformedShape(sanitize_api_error(&text)))
            }
            status if !status.is_success() => Err(BatchError::Service(api_error(SERVICE, response).await)),
            _ => response.json::<Value>().await.map_err(|err| {
                BatchError::Service(ServiceError::Decode {
                    service: SERVICE,
                    message: err.to_string(),
                })
            }),
        }
    }

    async fn generate_content(&self, prompt: &str) -> Result<Value, ServiceError> {
        let api_key = self.api_key()?;
        let url = format!("{}/{}:generateContent", self.api_base, self.model);
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE"],
            },
        };
        let response: Value = send_json(
            SERVICE,
            self.client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body),
        )
        .await?;

        // Errors can also arrive inside a 200 body.
        if let Some(error) = response.get("error") {
            return Err(ServiceError::Other {
                service: SERVICE,
                code: error.get("code").and_then(Value::as_i64),
                message: sanitize_api_error(
                    error.get("message").and_then(Value::as_str).unwrap_or("unknown error"),
                ),
            });
        }
        Ok(response)
    }
}

fn model_name(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

impl ImageBackend for GeminiImageBackend {
    fn name(&self) -> &str {
        SERVICE
    }

    fn generate_batch<'a>(
        &'a self,
        prompt: &'a str,
        count: usize,
        shape: CallShape,
    ) -> BackendFuture<'a, Value, BatchError> {
        Box::pin(self.predict(prompt, count, shape))
    }

    fn generate_single<'a>(&'a self, prompt: &'a str) -> BackendFuture<'a, Value, ServiceError> {
        Box::pin(self.generate_content(prompt))
    }
}
