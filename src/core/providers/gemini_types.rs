use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub(super) struct GenerateContentRequest<'a> {
    pub(super) contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    pub(super) generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(super) struct Content<'a> {
    pub(super) role: &'static str,
    pub(super) parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct TextPart<'a> {
    pub(super) text: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    pub(super) response_modalities: Vec<&'static str>,
}

/// `:predict` body. `parameters` is a free-form map because its layout
/// depends on the call shape being tried.
#[derive(Debug, Serialize)]
pub(super) struct PredictRequest<'a> {
    pub(super) instances: Vec<PredictInstance<'a>>,
    pub(super) parameters: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(super) struct PredictInstance<'a> {
    pub(super) prompt: &'a str,
}
