use super::detection::has_png_signature;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output formats the generation pipeline can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
}

impl ImageFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            other => Err(format!("unsupported image format: {other}")),
        }
    }
}

/// One generated image, consumed once by delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl ImagePayload {
    #[must_use]
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            format: ImageFormat::Png,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the payload starts with the signature its format tag promises.
    #[must_use]
    pub fn signature_matches(&self) -> bool {
        match self.format {
            ImageFormat::Png => has_png_signature(&self.bytes),
        }
    }
}
