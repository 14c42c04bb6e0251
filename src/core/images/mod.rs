pub mod backend;
pub mod engine;
pub mod extract;
pub mod retry;

pub use backend::{BackendFuture, BatchError, CALL_SHAPES, CallShape, CountField, FormatHint, ImageBackend};
pub use engine::{Aspect, AspectProfile, ImageEngine, MAX_IMAGES_PER_REQUEST, aspect_profile};
pub use extract::{Extraction, extract_png_payloads};
pub use retry::{TransientFailure, is_transient, run_with_retry};
