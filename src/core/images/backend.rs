use crate::error::ServiceError;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Field used to ask the batch interface for several images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountField {
    SampleCount,
    NumberOfImages,
}

impl CountField {
    pub fn key(self) -> &'static str {
        match self {
            Self::SampleCount => "sampleCount",
            Self::NumberOfImages => "numberOfImages",
        }
    }
}

/// How the requested output format is expressed to the batch interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    OutputOptionsMimeType,
    OutputMimeType,
    Omitted,
}

/// One known parameter layout for the batch interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallShape {
    pub count_field: CountField,
    pub format_hint: FormatHint,
}

/// Shapes tried in order until one is accepted.
pub const CALL_SHAPES: [CallShape; 6] = [
    CallShape {
        count_field: CountField::SampleCount,
        format_hint: FormatHint::OutputOptionsMimeType,
    },
    CallShape {
        count_field: CountField::SampleCount,
        format_hint: FormatHint::OutputMimeType,
    },
    CallShape {
        count_field: CountField::SampleCount,
        format_hint: FormatHint::Omitted,
    },
    CallShape {
        count_field: CountField::NumberOfImages,
        format_hint: FormatHint::OutputOptionsMimeType,
    },
    CallShape {
        count_field: CountField::NumberOfImages,
        format_hint: FormatHint::OutputMimeType,
    },
    CallShape {
        count_field: CountField::NumberOfImages,
        format_hint: FormatHint::Omitted,
    },
];

/// Failure of a batch call.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The batch interface does not exist for this deployment.
    #[error("batch interface unavailable: {0}")]
    Unavailable(String),

    /// The interface exists but rejected this parameter layout.
    #[error("call shape rejected: {0}")]
    MalformedShape(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Remote image model with a preferred batch call and a stable single-image call.
///
/// Both return the raw JSON response; payload extraction is shared.
pub trait ImageBackend: Send + Sync {
    fn name(&self) -> &str;

    fn generate_batch<'a>(
        &'a self,
        prompt: &'a str,
        count: usize,
        shape: CallShape,
    ) -> BackendFuture<'a, Value, BatchError>;

    fn generate_single<'a>(&'a self, prompt: &'a str) -> BackendFuture<'a, Value, ServiceError>;
}
