//! Tolerant extraction of PNG payloads from image-model responses.

use crate::media::{ImagePayload, is_png_mime, sniff_png};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::Value;

/// Response layouts the image models are known to return.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageResponse {
    Candidates {
        candidates: Vec<Candidate>,
    },
    Predictions {
        predictions: Vec<Prediction>,
    },
    Generated {
        #[serde(rename = "generatedImages", alias = "generated_images")]
        generated_images: Vec<GeneratedImage>,
    },
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default, rename = "inlineData", alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default, rename = "bytesBase64Encoded", alias = "bytes_base64_encoded")]
    bytes_base64: Option<String>,
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    image: Option<GeneratedImageBytes>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImageBytes {
    #[serde(default, rename = "imageBytes", alias = "image_bytes")]
    image_bytes: Option<String>,
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
}

/// Result of inspecting one response body.
#[derive(Debug, PartialEq, Eq)]
pub enum Extraction {
    Images(Vec<ImagePayload>),
    /// The body matched none of the known layouts.
    UnrecognizedShape,
}

impl Extraction {
    /// Payloads found, treating an unrecognized body as zero images.
    pub fn into_images(self) -> Vec<ImagePayload> {
        match self {
            Self::Images(images) => images,
            Self::UnrecognizedShape => Vec::new(),
        }
    }
}

/// Pull every PNG payload out of `response`.
///
/// Parts with a non-PNG MIME type are skipped, parts whose base64 does not
/// decode are skipped with a warning, and payloads missing the PNG signature
/// are kept with a warning.
pub fn extract_png_payloads(response: &Value, source: &str) -> Extraction {
    let parsed = match ImageResponse::deserialize(response) {
        Ok(parsed) => parsed,
        Err(_) => {
            let keys = response
                .as_object()
                .map(|obj| obj.keys().cloned().collect::<Vec<_>>().join(","))
                .unwrap_or_default();
            tracing::warn!(source, keys = %keys, "unrecognized image response shape");
            return Extraction::UnrecognizedShape;
        }
    };

    let encoded: Vec<(Option<String>, String)> = match parsed {
        ImageResponse::Candidates { candidates } => candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.inline_data)
            .filter_map(|inline| inline.data.map(|data| (inline.mime_type, data)))
            .collect(),
        ImageResponse::Predictions { predictions } => predictions
            .into_iter()
            .filter_map(|p| p.bytes_base64.map(|data| (p.mime_type, data)))
            .collect(),
        ImageResponse::Generated { generated_images } => generated_images
            .into_iter()
            .filter_map(|g| g.image)
            .filter_map(|img| img.image_bytes.map(|data| (img.mime_type, data)))
            .collect(),
    };

    let mut images = Vec::with_capacity(encoded.len());
    for (mime_type, data) in encoded {
        if let Some(mime) = mime_type.as_deref()
            && !is_png_mime(mime)
        {
            tracing::debug!(source, mime, "skipping non-PNG part");
            continue;
        }
        if data.is_empty() {
            continue;
        }
        let bytes = match BASE64.decode(data.as_bytes()) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(source, error = %err, "skipping part with invalid base64");
                continue;
            }
        };
        sniff_png(&bytes, source);
        images.push(ImagePayload::png(bytes));
    }

    Extraction::Images(images)
}
